use spendsmart::{
    CardCatalog, CardDefinition, MerchantClassifier, RecommendationRequest, RewardMode,
    TransactionContext, evaluate, recommend,
};

fn txn(amount: f64, category: &str, mcc: &str, is_online: bool, currency: &str) -> TransactionContext {
    TransactionContext {
        amount,
        category: category.to_string(),
        mcc: mcc.to_string(),
        is_online,
        currency: currency.to_string(),
        mode: RewardMode::Miles,
    }
}

#[test]
fn test_shopping_category_bonus() {
    let mut card = CardDefinition {
        name: "Shopper".into(),
        base_mpd: 1.2,
        ..Default::default()
    };
    card.category_mpd.insert("shopping".into(), 4.0);

    let result = evaluate(&card, &txn(100.0, "shopping", "5311", true, "SGD"));
    assert_eq!(result.miles, 400.0);
    assert_eq!(result.effective_mpd, Some(4.0));
    assert!(!result.blocked);
}

#[test]
fn test_grocery_mcc_blocked() {
    let mut card = CardDefinition {
        name: "No Groceries".into(),
        base_mpd: 1.2,
        cashback_rate: Some(2.0),
        ..Default::default()
    };
    card.blocked_mccs.insert("5411".into());

    let result = evaluate(&card, &txn(60.0, "groceries", "5411", false, "SGD"));
    assert!(result.blocked);
    assert_eq!(result.miles, 0.0);
    assert_eq!(result.cashback, 0.0);
    assert!(result.blocked_reason.unwrap().contains("5411"));
}

#[test]
fn test_foreign_currency_drops_home_only_bonus() {
    let mut card = CardDefinition {
        name: "Home Only".into(),
        base_mpd: 1.2,
        fcy_mpd: Some(2.0),
        no_fcy_bonus: true,
        ..Default::default()
    };
    card.category_mpd.insert("dining".into(), 4.0);

    let result = evaluate(&card, &txn(50.0, "dining", "5812", false, "USD"));
    assert_eq!(result.effective_mpd, Some(2.0));
    assert_eq!(result.miles, 100.0);
    assert!(result.is_fcy);
}

#[test]
fn test_empty_enabled_intersection_has_no_best_card() {
    let catalog = CardCatalog::bundled().unwrap();
    let request = RecommendationRequest {
        url: "https://www.lazada.sg".into(),
        amount: 42.0,
        currency: "SGD".into(),
        mode: "miles".into(),
        enabled_cards: Some(vec!["Imaginary Card".into()]),
    };

    let rec = recommend(&catalog, &MerchantClassifier::default(), &request);
    assert!(rec.best_card.is_none());
    assert_eq!(rec.estimated_miles, 0.0);
    assert!(rec.reason.contains("No suitable card"));
}

#[test]
fn test_bundled_catalog_rewards_are_never_negative() {
    let catalog = CardCatalog::bundled().unwrap();
    let categories = ["general", "shopping", "groceries", "travel_agency", "quasi_cash", "govt"];
    let mccs = ["0000", "", "5311", "5411", "6051", "4722"];

    for card in catalog.cards() {
        for category in categories {
            for mcc in mccs {
                for currency in ["SGD", "usd"] {
                    for is_online in [true, false] {
                        let result = evaluate(card, &txn(87.65, category, mcc, is_online, currency));
                        assert!(result.miles >= 0.0 && result.cashback >= 0.0);
                        if result.blocked {
                            assert_eq!(result.miles, 0.0);
                            assert_eq!(result.cashback, 0.0);
                            assert!(result.effective_mpd.is_none());
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_breakdown_is_sorted_and_led_by_best_card() {
    let catalog = CardCatalog::bundled().unwrap();
    for mode in ["miles", "cashback"] {
        let request = RecommendationRequest {
            url: "https://www.expedia.com/trip".into(),
            amount: 300.0,
            currency: "USD".into(),
            mode: mode.into(),
            enabled_cards: None,
        };
        let rec = recommend(&catalog, &MerchantClassifier::default(), &request);

        let scores: Vec<f64> = rec
            .breakdown
            .iter()
            .map(|r| spendsmart::recommend::score(r, rec.mode))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(rec.best_card.as_deref(), Some(rec.breakdown[0].card_name.as_str()));
    }
}

#[test]
fn test_travel_agency_in_foreign_currency_prefers_prvi() {
    let catalog = CardCatalog::bundled().unwrap();
    let request = RecommendationRequest {
        url: "https://www.agoda.com/booking".into(),
        amount: 200.0,
        currency: "USD".into(),
        mode: "miles".into(),
        enabled_cards: None,
    };

    let rec = recommend(&catalog, &MerchantClassifier::default(), &request);
    // travel_agency keeps PRVI's 3.0 over its 2.4 FCY rate
    assert_eq!(rec.best_card.as_deref(), Some("UOB PRVI Miles Visa"));
    assert_eq!(rec.estimated_miles, 600.0);
    assert_eq!(
        rec.annual_fee_warning.as_deref(),
        Some("UOB PRVI Miles Visa has around S$261.6 annual fee and may NOT be waivable.")
    );
}
