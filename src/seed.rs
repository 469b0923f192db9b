//! Seeding the structured store from a TOML file (`guide seed <file>`).
//!
//! ```toml
//! [[attractions]]
//! name = "Louvre"
//!
//! [[attractions.hours]]
//! context = "Mon-Sun"
//! open = "09:00"
//! close = "18:00"
//!
//! [[attractions.hours]]
//! context = "Tuesday"      # no open/close: closed
//!
//! [[attractions.tickets]]
//! ticket_type = "Adult"
//! price = 22
//! currency = "EUR"
//! ```
//!
//! Seeding is idempotent: an existing attraction has its hours and tickets
//! replaced.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::Attraction;
use crate::store::{AttractionStore, SqliteStore};

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub attractions: Vec<Attraction>,
}

pub fn parse_seed(content: &str) -> Result<SeedFile> {
    let mut seed: SeedFile = toml::from_str(content).context("Failed to parse seed file")?;
    normalize_seed(&mut seed);
    validate_seed(&seed)?;
    Ok(seed)
}

pub fn load_seed(path: &Path) -> Result<SeedFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    parse_seed(&content)
}

/// Names are matched against questions verbatim, so surrounding
/// whitespace is stripped before anything is stored.
fn normalize_seed(seed: &mut SeedFile) {
    for attraction in &mut seed.attractions {
        attraction.name = attraction.name.trim().to_string();
        for hours in &mut attraction.hours {
            hours.context = hours.context.trim().to_string();
        }
        for ticket in &mut attraction.tickets {
            ticket.ticket_type = ticket.ticket_type.trim().to_string();
        }
    }
}

fn validate_seed(seed: &SeedFile) -> Result<()> {
    if seed.attractions.is_empty() {
        bail!("seed file contains no [[attractions]]");
    }

    let mut names = HashSet::new();
    for attraction in &seed.attractions {
        let name = attraction.name.as_str();
        if name.is_empty() {
            bail!("attraction name must not be empty");
        }
        if !names.insert(name.to_string()) {
            bail!("duplicate attraction name: {}", name);
        }
        for ticket in &attraction.tickets {
            if !ticket.price.is_finite() || ticket.price < 0.0 {
                bail!(
                    "{} / {}: price must be a non-negative number",
                    name,
                    ticket.ticket_type
                );
            }
        }
        for hours in &attraction.hours {
            if hours.open.is_some() != hours.close.is_some() {
                bail!(
                    "{} / {}: open and close must be given together",
                    name,
                    hours.context
                );
            }
        }
    }
    Ok(())
}

/// Upserts every attraction of the seed file, returning how many were written.
pub async fn seed_store(store: &dyn AttractionStore, seed: &SeedFile) -> Result<usize> {
    for attraction in &seed.attractions {
        store.upsert_attraction(attraction).await?;
        tracing::debug!(name = %attraction.name, "seeded attraction");
    }
    Ok(seed.attractions.len())
}

pub async fn run_seed(config: &Config, path: &Path) -> Result<()> {
    let seed = load_seed(path)?;

    let pool = db::connect(config).await?;
    migrate::apply(&pool).await?;
    let store = SqliteStore::new(pool.clone());

    let count = seed_store(&store, &seed).await?;
    pool.close().await;

    println!("Seeded {} attractions into {}", count, config.db.path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    const SEED: &str = r#"
[[attractions]]
name = "Louvre"

[[attractions.hours]]
context = "Mon-Sun"
open = "09:00"
close = "18:00"

[[attractions.tickets]]
ticket_type = "Adult"
price = 22.0

[[attractions]]
name = "Eiffel Tower"
"#;

    #[test]
    fn test_parse_seed() {
        let seed = parse_seed(SEED).unwrap();
        assert_eq!(seed.attractions.len(), 2);
        let louvre = &seed.attractions[0];
        assert_eq!(louvre.tickets[0].currency, "EUR");
        assert_eq!(louvre.hours[0].open.as_deref(), Some("09:00"));
        assert!(seed.attractions[1].tickets.is_empty());
    }

    #[test]
    fn test_rejects_empty_seed() {
        assert!(parse_seed("").is_err());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let toml = "[[attractions]]\nname = \"A\"\n[[attractions]]\nname = \"A\"\n";
        let err = parse_seed(toml).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_names_are_trimmed() {
        let toml = "[[attractions]]\nname = \"  Louvre Museum \"\n[[attractions.tickets]]\nticket_type = \" Adult\"\nprice = 22.0\n";
        let seed = parse_seed(toml).unwrap();
        assert_eq!(seed.attractions[0].name, "Louvre Museum");
        assert_eq!(seed.attractions[0].tickets[0].ticket_type, "Adult");
    }

    #[test]
    fn test_duplicates_detected_after_trimming() {
        let toml = "[[attractions]]\nname = \"A\"\n[[attractions]]\nname = \" A \"\n";
        assert!(parse_seed(toml).is_err());
    }

    #[tokio::test]
    async fn test_seeded_name_is_stored_trimmed() {
        let store = InMemoryStore::new();
        let seed = parse_seed("[[attractions]]\nname = \" Louvre Museum\"\n").unwrap();
        seed_store(&store, &seed).await.unwrap();
        assert!(store.attraction("Louvre Museum").await.unwrap().is_some());
    }

    #[test]
    fn test_rejects_negative_price() {
        let toml = "[[attractions]]\nname = \"A\"\n[[attractions.tickets]]\nticket_type = \"Adult\"\nprice = -1.0\n";
        assert!(parse_seed(toml).is_err());
    }

    #[test]
    fn test_rejects_half_open_hours() {
        let toml = "[[attractions]]\nname = \"A\"\n[[attractions.hours]]\ncontext = \"Mon\"\nopen = \"09:00\"\n";
        assert!(parse_seed(toml).is_err());
    }

    #[tokio::test]
    async fn test_seed_store_is_idempotent() {
        let store = InMemoryStore::new();
        let seed = parse_seed(SEED).unwrap();
        seed_store(&store, &seed).await.unwrap();
        seed_store(&store, &seed).await.unwrap();

        let names = store.attraction_names().await.unwrap();
        assert_eq!(names, vec!["Louvre", "Eiffel Tower"]);
    }
}
