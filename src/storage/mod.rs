use async_trait::async_trait;
use anyhow::Result;
use crate::models::ListingRecord;

mod sqlite;
pub use sqlite::{decode_json_columns, SqliteStorage, JSON_COLUMNS};

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn load_items(&self) -> Result<Vec<ListingRecord>>;
}
