use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{DetailMapping, ListingRecord, NormalizedListing};
use crate::normalize::normalize_listings;
use crate::parsers::{extract_json_object, parse_html_details, split_document, ExtractError};

/// Top-level key holding the listing sequence.
pub const ITEMS_KEY: &str = "items";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("payload has no `{}` sequence", ITEMS_KEY)]
    MissingItems,
}

/// Result of one extraction pass over a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub listings: Vec<NormalizedListing>,
    pub details: DetailMapping,
}

/// Split, repair, normalize and parse a hybrid JSON + HTML listing document.
pub fn ingest_document(doc: &str) -> Result<Extraction, IngestError> {
    let split = split_document(doc);
    debug!(
        "Split document: {} bytes of JSON candidate, {} bytes of HTML",
        split.json_candidate.len(),
        split.html_fragment.len()
    );

    let payload = extract_json_object(split.json_candidate)?;
    let records = records_from_payload(payload)?;

    Ok(Extraction {
        listings: normalize_listings(records),
        details: parse_html_details(split.html_fragment),
    })
}

/// Normalize records read from storage. Stored rows carry no HTML details.
pub fn normalize_stored(records: Vec<ListingRecord>) -> Extraction {
    Extraction {
        listings: normalize_listings(records),
        details: DetailMapping::default(),
    }
}

/// Pull the listing records out of a parsed payload. Entries that cannot be
/// read as a listing are skipped.
pub fn records_from_payload(mut payload: Map<String, Value>) -> Result<Vec<ListingRecord>, IngestError> {
    let items = match payload.remove(ITEMS_KEY) {
        Some(Value::Array(items)) => items,
        _ => return Err(IngestError::MissingItems),
    };

    if items.is_empty() {
        warn!("`{}` sequence is empty", ITEMS_KEY);
        return Ok(Vec::new());
    }

    let records = items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            if !item.is_object() {
                warn!("Skipping item {}: not an object", idx);
                return None;
            }
            match serde_json::from_value::<ListingRecord>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping item {}: {}", idx, e);
                    None
                }
            }
        })
        .collect();

    Ok(records)
}
