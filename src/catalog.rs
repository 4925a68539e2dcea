//! Immutable card catalog, loaded once at startup.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::CardDefinition;

const BUNDLED_CARDS: &str = include_str!("../data/cards.json");

#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: Vec<CardDefinition>,
}

impl CardCatalog {
    /// Validates names: non-empty and unique.
    pub fn new(cards: Vec<CardDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for card in &cards {
            if card.name.trim().is_empty() {
                return Err(Error::InvalidCatalog("card with empty name".to_string()));
            }
            if !seen.insert(card.name.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate card name '{}'",
                    card.name
                )));
            }
        }
        Ok(Self { cards })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cards: Vec<CardDefinition> = serde_json::from_str(json)?;
        Self::new(cards)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_CARDS)
    }

    pub fn cards(&self) -> &[CardDefinition] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.iter().find(|card| card.name == name)
    }

    /// Cards the user has enabled, in catalog order. An empty selection
    /// means every card.
    pub fn enabled<'a>(&'a self, selection: &[String]) -> Vec<&'a CardDefinition> {
        if selection.is_empty() {
            return self.cards.iter().collect();
        }
        let wanted: HashSet<&str> = selection.iter().map(String::as_str).collect();
        self.cards
            .iter()
            .filter(|card| wanted.contains(card.name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> CardDefinition {
        CardDefinition {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = CardCatalog::bundled().unwrap();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.get("Citi PremierMiles").is_some());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = CardCatalog::new(vec![named("A"), named("A")]).unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog(_)));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(CardCatalog::new(vec![named("  ")]).is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = CardCatalog::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_enabled_empty_selection_is_everything() {
        let catalog = CardCatalog::new(vec![named("A"), named("B")]).unwrap();
        assert_eq!(catalog.enabled(&[]).len(), 2);
    }

    #[test]
    fn test_enabled_keeps_catalog_order() {
        let catalog = CardCatalog::new(vec![named("A"), named("B"), named("C")]).unwrap();
        let picked = catalog.enabled(&["C".to_string(), "A".to_string()]);
        let names: Vec<_> = picked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_enabled_no_match_is_empty() {
        let catalog = CardCatalog::new(vec![named("A")]).unwrap();
        assert!(catalog.enabled(&["Missing".to_string()]).is_empty());
    }
}
