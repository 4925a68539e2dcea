//! Merchant classification from a checkout URL.

use std::collections::HashMap;

use serde::Serialize;
use url::Url;

pub const FALLBACK_CATEGORY: &str = "general";
pub const UNKNOWN_MCC: &str = "0000";

/// Hostname substring -> (category, is_online, mcc). First match wins.
const MERCHANTS: &[(&str, &str, bool, &str)] = &[
    ("shopee", "shopping", true, "5311"),
    ("lazada", "shopping", true, "5311"),
    ("qoo10", "shopping", true, "5311"),
    ("amazon", "shopping", true, "5311"),
    ("agoda", "travel", true, "4722"),
    ("booking", "travel", true, "4722"),
    ("expedia", "travel", true, "4722"),
    ("ntuc", "groceries", false, "5411"),
    ("fairprice", "groceries", false, "5411"),
    ("coldstorage", "groceries", false, "5411"),
];

const MCC_CATEGORIES: &[(&str, &str)] = &[
    // groceries
    ("5411", "groceries"),
    ("5422", "groceries"),
    ("5441", "groceries"),
    ("5451", "groceries"),
    ("5499", "groceries"),
    // dining
    ("5812", "dining"),
    ("5813", "dining"),
    ("5814", "fast_food"),
    // retail and marketplaces
    ("5310", "shopping"),
    ("5311", "shopping"),
    ("5331", "shopping"),
    ("5399", "shopping"),
    ("5611", "shopping"),
    ("5621", "shopping"),
    ("5631", "shopping"),
    ("5651", "shopping"),
    ("5661", "shopping"),
    ("5691", "shopping"),
    ("5732", "shopping"),
    ("5734", "shopping"),
    ("5941", "shopping"),
    ("5944", "shopping"),
    ("5947", "shopping"),
    ("5999", "shopping"),
    ("5262", "online_shopping"),
    // airlines
    ("3000", "travel_air"),
    ("3001", "travel_air"),
    ("3002", "travel_air"),
    ("3020", "travel_air"),
    ("3058", "travel_air"),
    ("3066", "travel_air"),
    ("3075", "travel_air"),
    ("3299", "travel_air"),
    ("4511", "travel_air"),
    // hotels and car rental
    ("7011", "travel_hotel"),
    ("7012", "travel_hotel"),
    ("5811", "travel_hotel"),
    ("7512", "travel_hotel"),
    ("7513", "travel_hotel"),
    // agencies
    ("4722", "travel_agency"),
    ("5962", "travel_agency"),
    // transport
    ("4111", "transport"),
    ("4112", "transport"),
    ("4121", "ride_hailing"),
    ("4131", "transport"),
    ("4789", "transport"),
    ("7523", "transport"),
    // entertainment
    ("7832", "entertainment"),
    ("7922", "entertainment"),
    ("7929", "entertainment"),
    ("7932", "entertainment"),
    ("7991", "entertainment"),
    ("7996", "entertainment"),
    ("7997", "entertainment"),
    ("7998", "entertainment"),
    ("7999", "entertainment"),
    // utilities and telecom
    ("4900", "utilities"),
    ("4812", "telecom"),
    ("4814", "telecom"),
    ("4899", "telecom"),
    // education
    ("8211", "education"),
    ("8220", "education"),
    ("8241", "education"),
    ("8249", "education"),
    ("8299", "education"),
    // healthcare
    ("8011", "healthcare"),
    ("8021", "healthcare"),
    ("8043", "healthcare"),
    ("8050", "healthcare"),
    ("8062", "healthcare"),
    ("8099", "healthcare"),
    ("5912", "healthcare"),
    // government, charity, religious
    ("8398", "charity"),
    ("8661", "religious"),
    ("9211", "govt"),
    ("9222", "govt"),
    ("9223", "govt"),
    ("9311", "govt"),
    ("9399", "govt"),
    // insurance and quasi-cash
    ("5960", "quasi_cash"),
    ("6010", "quasi_cash"),
    ("6011", "quasi_cash"),
    ("6012", "quasi_cash"),
    ("6050", "quasi_cash"),
    ("6051", "quasi_cash"),
    ("6211", "quasi_cash"),
    ("6513", "quasi_cash"),
    ("6300", "insurance"),
];

/// What we know about a merchant before scoring cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerchantInfo {
    pub category: String,
    pub is_online: bool,
    pub mcc: String,
}

impl MerchantInfo {
    fn fallback() -> Self {
        Self {
            category: FALLBACK_CATEGORY.to_string(),
            is_online: true,
            mcc: UNKNOWN_MCC.to_string(),
        }
    }
}

/// Read-only lookup tables, built once and shared.
#[derive(Debug, Clone)]
pub struct MerchantClassifier {
    merchants: Vec<(String, MerchantInfo)>,
    mcc_categories: HashMap<String, String>,
}

impl Default for MerchantClassifier {
    fn default() -> Self {
        let merchants = MERCHANTS
            .iter()
            .map(|(key, category, is_online, mcc)| {
                (
                    key.to_string(),
                    MerchantInfo {
                        category: category.to_string(),
                        is_online: *is_online,
                        mcc: mcc.to_string(),
                    },
                )
            })
            .collect();
        let mcc_categories = MCC_CATEGORIES
            .iter()
            .map(|(mcc, category)| (mcc.to_string(), category.to_string()))
            .collect();
        Self {
            merchants,
            mcc_categories,
        }
    }
}

impl MerchantClassifier {
    /// Matches the URL's host against the merchant table.
    pub fn classify_url(&self, raw_url: &str) -> MerchantInfo {
        let host = Url::parse(raw_url.trim())
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
            .unwrap_or_default();
        if host.is_empty() {
            return MerchantInfo::fallback();
        }

        self.merchants
            .iter()
            .find(|(key, _)| host.contains(key.as_str()))
            .map(|(_, info)| info.clone())
            .unwrap_or_else(MerchantInfo::fallback)
    }

    /// MCC -> category, or `fallback` when the MCC is empty or unknown.
    pub fn category_for_mcc<'a>(&'a self, mcc: &str, fallback: &'a str) -> &'a str {
        if mcc.is_empty() {
            return fallback;
        }
        self.mcc_categories
            .get(mcc)
            .map(String::as_str)
            .unwrap_or(fallback)
    }

    /// URL classification with the MCC table taking precedence for the category.
    pub fn resolve(&self, raw_url: &str) -> MerchantInfo {
        let info = self.classify_url(raw_url);
        let category = self.category_for_mcc(&info.mcc, &info.category).to_string();
        MerchantInfo { category, ..info }
    }
}
