//! Tolerant extraction and normalization of store rental listings.
//!
//! A listing document is a JSON payload (often truncated) followed by an HTML
//! fragment. [`pipeline::ingest_document`] splits it, repairs the JSON,
//! normalizes amounts into 억/만 display strings and parses the HTML details.

pub mod config;
pub mod models;
pub mod normalize;
pub mod parsers;
pub mod pipeline;
pub mod report;
pub mod storage;
