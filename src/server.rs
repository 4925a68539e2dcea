//! HTTP surface for browser clients.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::catalog::CardCatalog;
use crate::config::ServerConfig;
use crate::merchant::MerchantClassifier;
use crate::models::CardSummary;
use crate::recommend::{self, Recommendation, RecommendationRequest};

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CardCatalog>,
    pub classifier: Arc<MerchantClassifier>,
}

impl AppState {
    pub fn new(catalog: CardCatalog, classifier: MerchantClassifier) -> Self {
        Self {
            catalog: Arc::new(catalog),
            classifier: Arc::new(classifier),
        }
    }
}

pub fn router(state: AppState, origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/cards", get(list_cards))
        .route("/recommend-card", post(recommend_card))
        .layer(cors_layer(origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub async fn serve(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = router(state, &config.origins());
    let addr = config.addr();

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// GET / — liveness message.
async fn root() -> Json<Value> {
    Json(json!({ "message": "SpendSmart backend running" }))
}

/// GET /cards — cards a client can enable or disable.
async fn list_cards(State(state): State<AppState>) -> Json<Vec<CardSummary>> {
    Json(state.catalog.cards().iter().map(CardSummary::from).collect())
}

/// POST /recommend-card — best card for a purchase plus the full breakdown.
async fn recommend_card(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Json<Recommendation> {
    Json(recommend::recommend(&state.catalog, &state.classifier, &request))
}
