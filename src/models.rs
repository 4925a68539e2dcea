use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Cardholder's home currency. Anything else counts as foreign currency.
pub const HOME_CURRENCY: &str = "SGD";

/// Which reward a purchase is being optimised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardMode {
    #[default]
    Miles,
    Cashback,
}

impl RewardMode {
    /// Lenient parse used at the request boundary: unknown modes become miles.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for RewardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "miles" => Ok(Self::Miles),
            "cashback" => Ok(Self::Cashback),
            other => Err(format!("unknown reward mode '{other}'")),
        }
    }
}

impl fmt::Display for RewardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Miles => f.write_str("miles"),
            Self::Cashback => f.write_str("cashback"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    #[default]
    Miles,
    Cashback,
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Miles => f.write_str("miles"),
            Self::Cashback => f.write_str("cashback"),
        }
    }
}

/// Static reward rules for one card. Loaded once, never mutated.
///
/// Every field except `name` may be omitted from the catalog; a missing
/// field means the feature is not present on the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Baseline miles per dollar
    pub base_mpd: f64,
    /// Cashback in percent of the amount
    pub cashback_rate: Option<f64>,
    /// Category name -> miles per dollar, overrides everything but FCY rules
    pub category_mpd: BTreeMap<String, f64>,
    pub online_mpd: Option<f64>,
    pub fcy_mpd: Option<f64>,
    /// Bonus rates only apply in the home currency
    pub no_fcy_bonus: bool,
    pub blocked_categories: BTreeSet<String>,
    pub blocked_mccs: BTreeSet<String>,
    /// Monthly spend past which bonus rates usually stop (advisory only)
    pub bonus_cap_amount: Option<f64>,
    pub annual_fee: Option<f64>,
    pub annual_fee_waivable: bool,
    pub notes: String,
}

impl Default for CardDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            card_type: CardType::default(),
            base_mpd: 0.0,
            cashback_rate: None,
            category_mpd: BTreeMap::new(),
            online_mpd: None,
            fcy_mpd: None,
            no_fcy_bonus: false,
            blocked_categories: BTreeSet::new(),
            blocked_mccs: BTreeSet::new(),
            bonus_cap_amount: None,
            annual_fee: None,
            annual_fee_waivable: true,
            notes: String::new(),
        }
    }
}

/// One purchase being scored against every card.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionContext {
    pub amount: f64,
    pub category: String,
    /// "0000" or empty when unknown
    pub mcc: String,
    pub is_online: bool,
    pub currency: String,
    pub mode: RewardMode,
}

impl TransactionContext {
    pub fn is_foreign_currency(&self) -> bool {
        !self.currency.trim().eq_ignore_ascii_case(HOME_CURRENCY)
    }
}

/// Explainable outcome of evaluating one card against one transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardResult {
    pub card_name: String,
    pub card_type: CardType,
    pub miles: f64,
    pub cashback: f64,
    pub blocked: bool,
    pub blocked_reason: Option<String>,
    pub capped: bool,
    pub cap_note: Option<String>,
    pub is_fcy: bool,
    /// `None` when the card is blocked
    pub effective_mpd: Option<f64>,
    pub annual_fee: Option<f64>,
    pub annual_fee_waivable: bool,
    pub notes: String,
}

/// Table row for the CLI breakdown
#[derive(Debug, Clone, Tabled)]
pub struct BreakdownRow {
    pub rank: usize,
    pub card_name: String,
    pub card_type: CardType,
    pub miles: f64,
    pub cashback: f64,
    pub mpd: String,
    pub status: String,
}

impl BreakdownRow {
    pub fn new(rank: usize, result: &RewardResult) -> Self {
        let status = if result.blocked {
            "blocked".to_string()
        } else if result.capped {
            "over cap".to_string()
        } else {
            "ok".to_string()
        };
        Self {
            rank,
            card_name: result.card_name.clone(),
            card_type: result.card_type,
            miles: result.miles,
            cashback: result.cashback,
            mpd: result
                .effective_mpd
                .map(|mpd| mpd.to_string())
                .unwrap_or_else(|| "-".to_string()),
            status,
        }
    }
}

/// Used for `list-cards` and `GET /cards`
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct CardSummary {
    pub name: String,
    #[serde(rename = "type")]
    #[tabled(rename = "type")]
    pub card_type: CardType,
    pub notes: String,
}

impl From<&CardDefinition> for CardSummary {
    fn from(card: &CardDefinition) -> Self {
        Self {
            name: card.name.clone(),
            card_type: card.card_type,
            notes: card.notes.clone(),
        }
    }
}
