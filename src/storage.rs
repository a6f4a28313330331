//! Durable key-value slot holding the record list.
//!
//! All records live under one key as a single JSON document that is read once
//! at startup and overwritten in full after every submission. There is no
//! incremental append at the storage layer.
//!
//! # Format
//!
//! ```json
//! { "version": 1, "records": [ { "id": "...", "operador": "...", ... } ] }
//! ```
//!
//! A bare JSON array of records (the unversioned layout) is read as
//! version 0. Unknown fields are ignored and missing optional fields take
//! their defaults.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;
use crate::model::UserData;

/// Key of the slot holding all records.
pub const RECORDS_KEY: &str = "smiles_registrations";

/// Newest layout written by [`encode_records`].
pub const FORMAT_VERSION: u32 = 1;

/// Persistence for the full record list.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read every stored record, newest first. An empty slot yields no records.
    async fn load(&self) -> Result<Vec<UserData>, StoreError>;

    /// Replace the stored list with `records`.
    async fn save(&self, records: &[UserData]) -> Result<(), StoreError>;
}

#[derive(Serialize)]
struct StoredRecordsRef<'a> {
    version: u32,
    records: &'a [UserData],
}

#[derive(Deserialize)]
struct StoredRecords {
    version: u32,
    #[serde(default)]
    records: Vec<UserData>,
}

/// Serialise records in the current layout.
pub fn encode_records(records: &[UserData]) -> Result<String, StoreError> {
    serde_json::to_string(&StoredRecordsRef {
        version: FORMAT_VERSION,
        records,
    })
    .map_err(StoreError::Encode)
}

/// Parse a stored document in any supported layout.
pub fn decode_records(raw: &str) -> Result<Vec<UserData>, StoreError> {
    let value: Value = serde_json::from_str(raw).map_err(StoreError::Decode)?;

    if value.is_array() {
        return serde_json::from_value(value).map_err(StoreError::Decode);
    }

    let stored: StoredRecords = serde_json::from_value(value).map_err(StoreError::Decode)?;
    if stored.version > FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: stored.version,
            supported: FORMAT_VERSION,
        });
    }

    Ok(stored.records)
}

/// SQLite-backed key-value slot.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    key: String,
}

impl SqliteStore {
    /// Create a new storage instance and initialize the schema.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite connection string (e.g., "sqlite:intake.db?mode=rwc" or "sqlite::memory:")
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        // One long-lived connection: a single writer, and an in-memory
        // database lives only as long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect(database_url)
            .await?;

        let storage = Self {
            pool,
            key: RECORDS_KEY.to_string(),
        };
        storage.initialize_schema().await?;

        Ok(storage)
    }

    async fn initialize_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_slots (
                slot TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Raw contents of the slot, if it has ever been written.
    pub async fn read_raw(&self) -> Result<Option<String>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT value FROM kv_slots WHERE slot = ?
            "#,
        )
        .bind(&self.key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("value")))
    }

    /// Overwrite the slot with a raw document.
    pub async fn write_raw(&self, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv_slots (slot, value)
            VALUES (?, ?)
            ON CONFLICT(slot) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(&self.key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn load(&self) -> Result<Vec<UserData>, StoreError> {
        match self.read_raw().await? {
            Some(raw) => decode_records(&raw),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, records: &[UserData]) -> Result<(), StoreError> {
        let raw = encode_records(records)?;
        self.write_raw(&raw).await
    }
}
