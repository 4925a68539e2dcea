//! SpendSmart: pick the best credit card for a purchase.
//!
//! A merchant URL is classified into a spend category and MCC, every card in
//! the catalog is scored by the reward rule engine, and the highest earner
//! under the requested reward mode wins.

pub mod catalog;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod merchant;
pub mod models;
pub mod recommend;
pub mod server;

pub use catalog::CardCatalog;
pub use engine::evaluate;
pub use error::{Error, Result};
pub use merchant::{MerchantClassifier, MerchantInfo};
pub use models::{CardDefinition, CardType, RewardMode, RewardResult, TransactionContext};
pub use recommend::{Recommendation, RecommendationRequest, recommend};
