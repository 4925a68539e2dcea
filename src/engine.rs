//! Reward rule evaluator.
//!
//! Pure function over (card, transaction). Computes miles and cashback,
//! applies blocking rules and annotates bonus caps. Never fails.

use crate::models::{CardDefinition, RewardResult, TransactionContext};

/// One rate-resolution step: takes the rate resolved so far, returns the next.
type RateStep = fn(&CardDefinition, &TransactionContext, f64) -> f64;

/// Applied in order on top of `base_mpd`. Later steps win.
const RATE_PIPELINE: [RateStep; 3] = [online_rate, category_rate, foreign_currency_rate];

/// Evaluates one card against one transaction.
pub fn evaluate(card: &CardDefinition, txn: &TransactionContext) -> RewardResult {
    if let Some(reason) = blocked_reason(card, txn) {
        return blocked_result(card, reason);
    }

    let mpd = resolve_rate(card, txn);
    let (capped, cap_note) = cap_annotation(card, txn.amount);

    RewardResult {
        card_name: card.name.clone(),
        card_type: card.card_type,
        miles: round2(txn.amount * mpd),
        cashback: cashback(card, txn.amount),
        blocked: false,
        blocked_reason: None,
        capped,
        cap_note,
        is_fcy: txn.is_foreign_currency(),
        effective_mpd: Some(mpd),
        annual_fee: card.annual_fee,
        annual_fee_waivable: card.annual_fee_waivable,
        notes: card.notes.clone(),
    }
}

/// Both checks run so the reason can name the category and the MCC.
fn blocked_reason(card: &CardDefinition, txn: &TransactionContext) -> Option<String> {
    let mut reasons = Vec::new();

    if card.blocked_categories.contains(&txn.category) {
        reasons.push(format!(
            "Category '{}' is blocked for {}.",
            txn.category, card.name
        ));
    }
    if !txn.mcc.is_empty() && card.blocked_mccs.contains(&txn.mcc) {
        reasons.push(format!("MCC {} is blocked for {}.", txn.mcc, card.name));
    }

    if reasons.is_empty() {
        None
    } else {
        Some(reasons.join(" "))
    }
}

fn blocked_result(card: &CardDefinition, reason: String) -> RewardResult {
    RewardResult {
        card_name: card.name.clone(),
        card_type: card.card_type,
        miles: 0.0,
        cashback: 0.0,
        blocked: true,
        blocked_reason: Some(reason),
        capped: false,
        cap_note: None,
        is_fcy: false,
        effective_mpd: None,
        annual_fee: card.annual_fee,
        annual_fee_waivable: card.annual_fee_waivable,
        notes: card.notes.clone(),
    }
}

/// Final miles-per-dollar after every pipeline step.
pub fn resolve_rate(card: &CardDefinition, txn: &TransactionContext) -> f64 {
    RATE_PIPELINE
        .iter()
        .fold(card.base_mpd, |rate, step| step(card, txn, rate))
}

fn online_rate(card: &CardDefinition, txn: &TransactionContext, rate: f64) -> f64 {
    match present(card.online_mpd) {
        Some(online) if txn.is_online => online,
        _ => rate,
    }
}

fn category_rate(card: &CardDefinition, txn: &TransactionContext, rate: f64) -> f64 {
    card.category_mpd
        .get(&txn.category)
        .copied()
        .unwrap_or(rate)
}

fn foreign_currency_rate(card: &CardDefinition, txn: &TransactionContext, rate: f64) -> f64 {
    if !txn.is_foreign_currency() {
        return rate;
    }
    if card.no_fcy_bonus {
        // home-currency-only bonuses: drop them entirely
        return card.fcy_mpd.unwrap_or(card.base_mpd);
    }
    match card.fcy_mpd {
        Some(fcy) if fcy > rate => fcy,
        _ => rate,
    }
}

fn cashback(card: &CardDefinition, amount: f64) -> f64 {
    present(card.cashback_rate)
        .map(|rate| round2(amount * rate / 100.0))
        .unwrap_or(0.0)
}

/// Advisory only: never changes the computed rewards.
fn cap_annotation(card: &CardDefinition, amount: f64) -> (bool, Option<String>) {
    let Some(cap) = present(card.bonus_cap_amount) else {
        return (false, None);
    };

    if amount > cap {
        let note = format!(
            "Bonus rate for {} usually capped at about S${:.0}/month; this txn exceeds that.",
            card.name, cap
        );
        (true, Some(note))
    } else {
        let note = format!(
            "Bonus earn for {} usually capped at about S${:.0}/month. \
             Usage across transactions is not tracked.",
            card.name, cap
        );
        (false, Some(note))
    }
}

/// Zero counts as "not configured" for optional rates and caps.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Rounds the exact binary value to two decimal places, exact ties to even.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}
