//! Best-card selection and the full recommendation for one purchase.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::CardCatalog;
use crate::engine;
use crate::merchant::MerchantClassifier;
use crate::models::{HOME_CURRENCY, RewardMode, RewardResult, TransactionContext};

pub const NO_SUITABLE_CARD: &str = "No suitable card found with current rules.";

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub url: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub enabled_cards: Option<Vec<String>>,
}

fn default_currency() -> String {
    HOME_CURRENCY.to_string()
}

fn default_mode() -> String {
    RewardMode::Miles.to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub best_card: Option<String>,
    pub estimated_miles: f64,
    pub estimated_cashback: f64,
    pub category: String,
    pub is_online: bool,
    pub mcc: String,
    pub mode: RewardMode,
    pub reason: String,
    pub annual_fee_warning: Option<String>,
    pub breakdown: Vec<RewardResult>,
}

/// The value a result is ranked by under `mode`.
pub fn score(result: &RewardResult, mode: RewardMode) -> f64 {
    match mode {
        RewardMode::Miles => result.miles,
        RewardMode::Cashback => result.cashback,
    }
}

/// Strictly highest score; the first one seen wins ties.
pub fn select_best(results: &[RewardResult], mode: RewardMode) -> Option<&RewardResult> {
    results.iter().fold(None, |best, candidate| match best {
        Some(current) if score(candidate, mode) <= score(current, mode) => Some(current),
        _ => Some(candidate),
    })
}

/// Sorts by score, highest first. Ties (including `0.0` vs `-0.0`) keep
/// their input order.
pub fn rank(mut results: Vec<RewardResult>, mode: RewardMode) -> Vec<RewardResult> {
    results.sort_by(|a, b| {
        score(b, mode)
            .partial_cmp(&score(a, mode))
            .unwrap_or(Ordering::Equal)
    });
    results
}

pub fn recommend(
    catalog: &CardCatalog,
    classifier: &MerchantClassifier,
    request: &RecommendationRequest,
) -> Recommendation {
    let merchant = classifier.resolve(&request.url);
    let mode = RewardMode::parse_or_default(&request.mode);

    let txn = TransactionContext {
        amount: request.amount,
        category: merchant.category,
        mcc: merchant.mcc,
        is_online: merchant.is_online,
        currency: request.currency.clone(),
        mode,
    };

    let selection = request.enabled_cards.as_deref().unwrap_or_default();
    let results: Vec<RewardResult> = catalog
        .enabled(selection)
        .into_iter()
        .map(|card| {
            let result = engine::evaluate(card, &txn);
            debug!(
                card = %result.card_name,
                miles = result.miles,
                cashback = result.cashback,
                blocked = result.blocked,
                "Card evaluated"
            );
            result
        })
        .collect();

    let best = select_best(&results, mode).cloned();

    info!(
        category = %txn.category,
        mcc = %txn.mcc,
        mode = %mode,
        candidates = results.len(),
        best = best.as_ref().map(|b| b.card_name.as_str()).unwrap_or("none"),
        "Recommendation computed"
    );

    let breakdown = rank(results, mode);

    let Some(best) = best else {
        return Recommendation {
            best_card: None,
            estimated_miles: 0.0,
            estimated_cashback: 0.0,
            category: txn.category,
            is_online: txn.is_online,
            mcc: txn.mcc,
            mode,
            reason: NO_SUITABLE_CARD.to_string(),
            annual_fee_warning: None,
            breakdown,
        };
    };

    Recommendation {
        best_card: Some(best.card_name.clone()),
        estimated_miles: best.miles,
        estimated_cashback: best.cashback,
        reason: explain(&best, &txn),
        annual_fee_warning: annual_fee_warning(&best),
        category: txn.category,
        is_online: txn.is_online,
        mcc: txn.mcc,
        mode,
        breakdown,
    }
}

fn explain(best: &RewardResult, txn: &TransactionContext) -> String {
    let mut parts = vec![format!(
        "Picked {} based on category '{}', online={}, MCC={}.",
        best.card_name, txn.category, txn.is_online, txn.mcc
    )];
    if best.blocked {
        parts.push("Note: this card is blocked for this category/MCC.".to_string());
    }
    if let Some(note) = &best.cap_note {
        parts.push(note.clone());
    }
    if !best.notes.is_empty() {
        parts.push(best.notes.clone());
    }
    parts.join(" ")
}

fn annual_fee_warning(best: &RewardResult) -> Option<String> {
    let fee = best.annual_fee.filter(|fee| *fee != 0.0)?;
    let warning = if best.annual_fee_waivable {
        format!(
            "{} has around S${} annual fee. Usually waivable.",
            best.card_name, fee
        )
    } else {
        format!(
            "{} has around S${} annual fee and may NOT be waivable.",
            best.card_name, fee
        )
    };
    Some(warning)
}
