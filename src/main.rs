use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tabled::Table;
use tracing_subscriber::EnvFilter;

use spendsmart::catalog::CardCatalog;
use spendsmart::config::{CatalogArgs, ServerConfig};
use spendsmart::db;
use spendsmart::merchant::MerchantClassifier;
use spendsmart::models::{BreakdownRow, CardSummary, HOME_CURRENCY};
use spendsmart::recommend::{self, RecommendationRequest};
use spendsmart::server::{self, AppState};

/// SpendSmart — which credit card should I use for this purchase?
#[derive(Parser)]
#[command(name = "spendsmart", version, about)]
struct Cli {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[command(flatten)]
        server: ServerConfig,
    },

    /// Recommend a card for a purchase
    Recommend {
        /// Merchant checkout URL (e.g. "https://shopee.sg/cart")
        #[arg(long)]
        url: String,
        /// Purchase amount
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = HOME_CURRENCY)]
        currency: String,
        /// "miles" or "cashback"
        #[arg(long, default_value = "miles")]
        mode: String,
        /// Only consider these cards (omit for all cards)
        #[arg(long = "card", num_args = 1..)]
        cards: Vec<String>,
        /// Print the full recommendation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a merchant URL is classified
    Classify {
        url: String,
    },

    /// List cards in the active catalog
    ListCards,

    /// Import a JSON catalog into the SQLite card store
    ImportCards {
        /// JSON file with card definitions
        file: PathBuf,
    },

    /// Remove a card from the SQLite card store by name
    RemoveCard {
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spendsmart=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { server } => {
            let catalog = cli.catalog.load().context("failed to load card catalog")?;
            let state = AppState::new(catalog, MerchantClassifier::default());
            server::serve(&server, state).await?;
        }

        Commands::Recommend {
            url,
            amount,
            currency,
            mode,
            cards,
            json,
        } => {
            let catalog = cli.catalog.load().context("failed to load card catalog")?;
            let request = RecommendationRequest {
                url,
                amount,
                currency,
                mode,
                enabled_cards: Some(cards),
            };
            let rec = recommend::recommend(&catalog, &MerchantClassifier::default(), &request);

            if json {
                println!("{}", serde_json::to_string_pretty(&rec)?);
                return Ok(());
            }

            match &rec.best_card {
                Some(name) => println!(
                    "Best card: {} ({} miles, S${} cashback)",
                    name, rec.estimated_miles, rec.estimated_cashback
                ),
                None => println!("No card recommended."),
            }
            println!("{}", rec.reason);
            if let Some(warning) = &rec.annual_fee_warning {
                println!("{warning}");
            }
            if !rec.breakdown.is_empty() {
                let rows: Vec<BreakdownRow> = rec
                    .breakdown
                    .iter()
                    .enumerate()
                    .map(|(i, result)| BreakdownRow::new(i + 1, result))
                    .collect();
                println!("{}", Table::new(&rows));
            }
        }

        Commands::Classify { url } => {
            let info = MerchantClassifier::default().resolve(&url);
            println!(
                "category={} online={} mcc={}",
                info.category, info.is_online, info.mcc
            );
        }

        Commands::ListCards => {
            let catalog = cli.catalog.load().context("failed to load card catalog")?;
            if catalog.is_empty() {
                println!("No cards found. Import some with: spendsmart --db cards.db import-cards cards.json");
            } else {
                let rows: Vec<CardSummary> = catalog.cards().iter().map(CardSummary::from).collect();
                println!("{}", Table::new(&rows));
            }
        }

        Commands::ImportCards { file } => {
            let Some(db_path) = &cli.catalog.db else {
                bail!("import-cards needs --db <path>");
            };
            let catalog = CardCatalog::load_json(&file)
                .with_context(|| format!("failed to read catalog {}", file.display()))?;
            let mut conn = db::open_db(db_path).context("failed to open card store")?;
            let written = db::import_catalog(&mut conn, &catalog)?;
            println!("Imported {} cards into {}", written, db_path.display());
        }

        Commands::RemoveCard { name } => {
            let Some(db_path) = &cli.catalog.db else {
                bail!("remove-card needs --db <path>");
            };
            let conn = db::open_db(db_path).context("failed to open card store")?;
            if db::remove_card(&conn, &name)? {
                println!("Removed card '{}'", name);
            } else {
                println!("No card named '{}'", name);
            }
        }
    }

    Ok(())
}
