use async_trait::async_trait;
use anyhow::{anyhow, Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::{Map, Number, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::models::ListingRecord;
use crate::storage::ListingStore;

/// Columns that hold JSON-encoded text in the `items` table.
pub const JSON_COLUMNS: [&str; 3] = ["originPhotoUrls", "subPhotoUrls", "businessMiddleCodeName"];

pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open an existing listings database read-only.
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Failed to open SQLite database {}", db_path.display()))?;

        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

#[async_trait]
impl ListingStore for SqliteStorage {
    async fn load_items(&self) -> Result<Vec<ListingRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection lock poisoned"))?;

        let mut stmt = conn
            .prepare("SELECT * FROM items")
            .context("Failed to query items table")?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        let mut row_idx = 0usize;

        while let Some(row) = rows.next()? {
            let mut object = Map::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                object.insert(name.clone(), column_value(row.get_ref(i)?));
            }
            decode_json_columns(&mut object);

            match serde_json::from_value::<ListingRecord>(Value::Object(object)) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping items row {}: {}", row_idx, e),
            }
            row_idx += 1;
        }

        info!("Loaded {} listings from items table", records.len());
        Ok(records)
    }
}

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Replace JSON-encoded text in [`JSON_COLUMNS`] with its decoded value.
/// Text that does not decode is left as it was.
pub fn decode_json_columns(row: &mut Map<String, Value>) {
    for column in JSON_COLUMNS {
        if let Some(Value::String(raw)) = row.get(column) {
            if raw.is_empty() {
                continue;
            }
            if let Ok(decoded) = serde_json::from_str::<Value>(raw) {
                row.insert(column.to_string(), decoded);
            }
        }
    }
}
