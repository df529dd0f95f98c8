//! SQLite entity store backend.
//!
//! Persists both entity tables to a single SQLite file. Uses `sqlx` with
//! WAL mode for concurrent read performance; upserts are
//! `INSERT OR REPLACE`, which is exactly the last-write-wins contract the
//! mapping engine expects from `save_*`.
//!
//! # Usage
//! ```rust,no_run
//! use estateindex_storage::sqlite::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // File-backed (persistent)
//! let store = SqliteStore::open("./entities.db").await?;
//!
//! // In-memory (tests / ephemeral)
//! let store = SqliteStore::in_memory().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use alloy_primitives::{Address, Bytes, U256};
use estateindex_core::entity::{Property, Proposal};
use estateindex_core::error::MappingError;
use estateindex_core::store::EntityStore;

/// SQLite-backed entity store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a SQLite database at `path`.
    ///
    /// The path may be a plain file path (`"./entities.db"`) or a full
    /// SQLite URL (`"sqlite:./entities.db?mode=rwc"`).
    pub async fn open(path: &str) -> Result<Self, MappingError> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let pool = SqlitePool::connect(&url)
            .await
            .map_err(|e| MappingError::Storage(e.to_string()))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Open an in-memory SQLite database.
    ///
    /// All data is lost when the pool is dropped. Ideal for tests.
    pub async fn in_memory() -> Result<Self, MappingError> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(|e| MappingError::Storage(e.to_string()))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create tables and enable WAL mode.
    async fn init_schema(&self) -> Result<(), MappingError> {
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&self.pool)
            .await
            .map_err(|e| MappingError::Storage(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS properties (
                id        TEXT PRIMARY KEY,
                info      BLOB NOT NULL,
                owner     TEXT NOT NULL,
                valuation TEXT NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| MappingError::Storage(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS proposals (
                id                  TEXT PRIMARY KEY,
                creator             TEXT    NOT NULL,
                voting_closing_time INTEGER NOT NULL,
                description         TEXT    NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| MappingError::Storage(e.to_string()))?;

        Ok(())
    }

    fn row_to_property(row: &sqlx::sqlite::SqliteRow) -> Result<Property, MappingError> {
        let owner: String = row.get("owner");
        let valuation: String = row.get("valuation");
        Ok(Property {
            id: row.get("id"),
            info: Bytes::from(row.get::<Vec<u8>, _>("info")),
            owner: owner
                .parse::<Address>()
                .map_err(|e| MappingError::Storage(e.to_string()))?,
            valuation: valuation
                .parse::<U256>()
                .map_err(|e| MappingError::Storage(e.to_string()))?,
        })
    }

    fn row_to_proposal(row: &sqlx::sqlite::SqliteRow) -> Result<Proposal, MappingError> {
        let creator: String = row.get("creator");
        Ok(Proposal {
            id: row.get("id"),
            creator: creator
                .parse::<Address>()
                .map_err(|e| MappingError::Storage(e.to_string()))?,
            voting_closing_time: row.get::<i64, _>("voting_closing_time") as u64,
            description: row.get("description"),
        })
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn load_property(&self, id: &str) -> Result<Option<Property>, MappingError> {
        let row = sqlx::query(
            "SELECT id, info, owner, valuation FROM properties WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MappingError::Storage(e.to_string()))?;

        row.as_ref().map(Self::row_to_property).transpose()
    }

    async fn save_property(&self, property: Property) -> Result<(), MappingError> {
        sqlx::query(
            "INSERT OR REPLACE INTO properties (id, info, owner, valuation)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&property.id)
        .bind(property.info.to_vec())
        .bind(property.owner.to_string())
        .bind(property.valuation.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| MappingError::Storage(e.to_string()))?;

        debug!(id = %property.id, "property saved");
        Ok(())
    }

    async fn load_proposal(&self, id: &str) -> Result<Option<Proposal>, MappingError> {
        let row = sqlx::query(
            "SELECT id, creator, voting_closing_time, description
             FROM proposals WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MappingError::Storage(e.to_string()))?;

        row.as_ref().map(Self::row_to_proposal).transpose()
    }

    async fn save_proposal(&self, proposal: Proposal) -> Result<(), MappingError> {
        sqlx::query(
            "INSERT OR REPLACE INTO proposals
             (id, creator, voting_closing_time, description)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&proposal.id)
        .bind(proposal.creator.to_string())
        .bind(proposal.voting_closing_time as i64)
        .bind(&proposal.description)
        .execute(&self.pool)
        .await
        .map_err(|e| MappingError::Storage(e.to_string()))?;

        debug!(id = %proposal.id, "proposal saved");
        Ok(())
    }

    async fn properties(&self) -> Result<Vec<Property>, MappingError> {
        let rows = sqlx::query(
            "SELECT id, info, owner, valuation FROM properties ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MappingError::Storage(e.to_string()))?;

        rows.iter().map(Self::row_to_property).collect()
    }

    async fn proposals(&self) -> Result<Vec<Proposal>, MappingError> {
        let rows = sqlx::query(
            "SELECT id, creator, voting_closing_time, description
             FROM proposals ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MappingError::Storage(e.to_string()))?;

        rows.iter().map(Self::row_to_proposal).collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_property(id: u64) -> Property {
        Property {
            id: format!("{:#x}", U256::from(id)),
            info: Bytes::from_static(b"Lot A"),
            owner: Address::repeat_byte(0xab),
            valuation: U256::from(100u64),
        }
    }

    #[tokio::test]
    async fn property_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.save_property(sample_property(1)).await.unwrap();

        let p = store.load_property("0x1").await.unwrap().unwrap();
        assert_eq!(p, sample_property(1));
    }

    #[tokio::test]
    async fn property_upsert_replaces() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.save_property(sample_property(1)).await.unwrap();

        let mut updated = sample_property(1);
        updated.owner = Address::repeat_byte(0xcd);
        updated.valuation = U256::from(999u64);
        store.save_property(updated.clone()).await.unwrap();

        // Only one row; second save overwrites the first
        let all = store.properties().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], updated);
    }

    #[tokio::test]
    async fn missing_ids_return_none() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(store.load_property("0xdead").await.unwrap().is_none());
        assert!(store.load_proposal("0xdead").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn proposal_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();
        let proposal = Proposal {
            id: "0x9".into(),
            creator: Address::repeat_byte(0xaa),
            voting_closing_time: 1_700_000_000,
            description: "Build a park".into(),
        };
        store.save_proposal(proposal.clone()).await.unwrap();

        let loaded = store.load_proposal("0x9").await.unwrap().unwrap();
        assert_eq!(loaded, proposal);
    }

    #[tokio::test]
    async fn listings_are_id_ordered() {
        let store = SqliteStore::in_memory().await.unwrap();
        for id in [3u64, 1, 2] {
            store.save_property(sample_property(id)).await.unwrap();
        }
        let ids: Vec<_> = store
            .properties()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["0x1", "0x2", "0x3"]);
    }

    #[tokio::test]
    async fn large_valuation_survives_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut p = sample_property(1);
        p.valuation = U256::MAX;
        store.save_property(p.clone()).await.unwrap();

        let loaded = store.load_property("0x1").await.unwrap().unwrap();
        assert_eq!(loaded.valuation, U256::MAX);
    }
}
