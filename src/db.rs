use std::path::Path;

use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use serde::de::DeserializeOwned;

use crate::catalog::CardCatalog;
use crate::error::Result;
use crate::models::{CardDefinition, CardType};

/// Creates tables on the given connection.
pub fn init_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS cards (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            name                TEXT NOT NULL UNIQUE,
            card_type           TEXT NOT NULL DEFAULT 'miles',
            base_mpd            REAL NOT NULL DEFAULT 0.0,
            cashback_rate       REAL,
            category_mpd        TEXT NOT NULL DEFAULT '{}',
            online_mpd          REAL,
            fcy_mpd             REAL,
            no_fcy_bonus        INTEGER NOT NULL DEFAULT 0,
            blocked_categories  TEXT NOT NULL DEFAULT '[]',
            blocked_mccs        TEXT NOT NULL DEFAULT '[]',
            bonus_cap_amount    REAL,
            annual_fee          REAL,
            annual_fee_waivable INTEGER NOT NULL DEFAULT 1,
            notes               TEXT NOT NULL DEFAULT ''
        );",
    )?;
    Ok(())
}

/// Opens (or creates) the SQLite card store and ensures tables exist.
pub fn open_db(path: impl AsRef<Path>) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_tables(&conn)?;
    Ok(conn)
}

/// Inserts a card, replacing any existing card with the same name.
pub fn add_card(conn: &Connection, card: &CardDefinition) -> Result<i64> {
    let card_type = match card.card_type {
        CardType::Miles => "miles",
        CardType::Cashback => "cashback",
    };
    conn.execute(
        "INSERT INTO cards (name, card_type, base_mpd, cashback_rate, category_mpd, online_mpd,
                            fcy_mpd, no_fcy_bonus, blocked_categories, blocked_mccs,
                            bonus_cap_amount, annual_fee, annual_fee_waivable, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
         ON CONFLICT(name) DO UPDATE SET
            card_type = excluded.card_type,
            base_mpd = excluded.base_mpd,
            cashback_rate = excluded.cashback_rate,
            category_mpd = excluded.category_mpd,
            online_mpd = excluded.online_mpd,
            fcy_mpd = excluded.fcy_mpd,
            no_fcy_bonus = excluded.no_fcy_bonus,
            blocked_categories = excluded.blocked_categories,
            blocked_mccs = excluded.blocked_mccs,
            bonus_cap_amount = excluded.bonus_cap_amount,
            annual_fee = excluded.annual_fee,
            annual_fee_waivable = excluded.annual_fee_waivable,
            notes = excluded.notes",
        params![
            card.name,
            card_type,
            card.base_mpd,
            card.cashback_rate,
            serde_json::to_string(&card.category_mpd)?,
            card.online_mpd,
            card.fcy_mpd,
            card.no_fcy_bonus,
            serde_json::to_string(&card.blocked_categories)?,
            serde_json::to_string(&card.blocked_mccs)?,
            card.bonus_cap_amount,
            card.annual_fee,
            card.annual_fee_waivable,
            card.notes,
        ],
    )?;
    let id = conn.query_row(
        "SELECT id FROM cards WHERE name = ?1",
        params![card.name],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// All stored cards, in insertion order.
pub fn list_cards(conn: &Connection) -> Result<Vec<CardDefinition>> {
    let mut stmt = conn.prepare(
        "SELECT name, card_type, base_mpd, cashback_rate, category_mpd, online_mpd, fcy_mpd,
                no_fcy_bonus, blocked_categories, blocked_mccs, bonus_cap_amount,
                annual_fee, annual_fee_waivable, notes
         FROM cards ORDER BY id",
    )?;
    let rows = stmt.query_map([], card_from_row)?;

    let mut cards = Vec::new();
    for card in rows {
        cards.push(card?);
    }
    Ok(cards)
}

pub fn remove_card(conn: &Connection, name: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM cards WHERE name = ?1", params![name])?;
    Ok(changed > 0)
}

/// Upserts every catalog card in one transaction. Returns how many were written.
pub fn import_catalog(conn: &mut Connection, catalog: &CardCatalog) -> Result<usize> {
    let tx = conn.transaction()?;
    for card in catalog.cards() {
        add_card(&tx, card)?;
    }
    tx.commit()?;
    Ok(catalog.len())
}

/// Builds a validated catalog from the store.
pub fn load_catalog(conn: &Connection) -> Result<CardCatalog> {
    CardCatalog::new(list_cards(conn)?)
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<CardDefinition> {
    let card_type = match row.get::<_, String>(1)?.as_str() {
        "cashback" => CardType::Cashback,
        _ => CardType::Miles,
    };
    Ok(CardDefinition {
        name: row.get(0)?,
        card_type,
        base_mpd: row.get(2)?,
        cashback_rate: row.get(3)?,
        category_mpd: json_column(row, 4)?,
        online_mpd: row.get(5)?,
        fcy_mpd: row.get(6)?,
        no_fcy_bonus: row.get(7)?,
        blocked_categories: json_column(row, 8)?,
        blocked_mccs: json_column(row, 9)?,
        bonus_cap_amount: row.get(10)?,
        annual_fee: row.get(11)?,
        annual_fee_waivable: row.get(12)?,
        notes: row.get(13)?,
    })
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: creates an in-memory DB with tables ready to go.
    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_tables(&conn).unwrap();
        conn
    }

    fn rich_card() -> CardDefinition {
        let mut card = CardDefinition {
            name: "Citi Rewards".to_string(),
            base_mpd: 0.4,
            online_mpd: Some(4.0),
            bonus_cap_amount: Some(1000.0),
            annual_fee: Some(196.2),
            annual_fee_waivable: false,
            notes: "Online shopping".to_string(),
            ..Default::default()
        };
        card.category_mpd.insert("shopping".into(), 4.0);
        card.blocked_mccs.insert("6051".into());
        card.blocked_categories.insert("govt".into());
        card
    }

    #[test]
    fn test_add_card() {
        let conn = test_db();

        let id = add_card(&conn, &rich_card()).unwrap();
        assert_eq!(id, 1);

        let cards = list_cards(&conn).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0], rich_card());
    }

    #[test]
    fn test_add_card_upserts_by_name() {
        let conn = test_db();

        add_card(&conn, &rich_card()).unwrap();
        let mut updated = rich_card();
        updated.base_mpd = 1.0;
        updated.card_type = CardType::Cashback;
        updated.cashback_rate = Some(1.5);
        let id = add_card(&conn, &updated).unwrap();
        assert_eq!(id, 1);

        let cards = list_cards(&conn).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].base_mpd, 1.0);
        assert_eq!(cards[0].card_type, CardType::Cashback);
        assert_eq!(cards[0].cashback_rate, Some(1.5));
    }

    #[test]
    fn test_list_cards_empty() {
        let conn = test_db();
        let cards = list_cards(&conn).unwrap();
        assert!(cards.is_empty());
    }

    #[test]
    fn test_list_cards_multiple() {
        let conn = test_db();

        for name in ["Card A", "Card B", "Card C"] {
            let card = CardDefinition {
                name: name.to_string(),
                ..Default::default()
            };
            add_card(&conn, &card).unwrap();
        }

        let cards = list_cards(&conn).unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].name, "Card A");
        assert_eq!(cards[1].name, "Card B");
        assert_eq!(cards[2].name, "Card C");
    }

    #[test]
    fn test_remove_card() {
        let conn = test_db();

        add_card(&conn, &rich_card()).unwrap();
        assert!(remove_card(&conn, "Citi Rewards").unwrap());

        let cards = list_cards(&conn).unwrap();
        assert!(cards.is_empty());
    }

    #[test]
    fn test_remove_card_nonexistent() {
        let conn = test_db();
        assert!(!remove_card(&conn, "Nobody").unwrap());
    }

    #[test]
    fn test_import_bundled_catalog_roundtrip() {
        let mut conn = test_db();
        let bundled = CardCatalog::bundled().unwrap();

        let written = import_catalog(&mut conn, &bundled).unwrap();
        assert_eq!(written, bundled.len());

        let loaded = load_catalog(&conn).unwrap();
        assert_eq!(loaded.cards(), bundled.cards());
    }

    #[test]
    fn test_corrupt_json_column_is_an_error() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO cards (name, category_mpd) VALUES ('Broken', 'not json')",
            [],
        )
        .unwrap();
        assert!(list_cards(&conn).is_err());
    }
}
