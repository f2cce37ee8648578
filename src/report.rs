use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::{DetailMapping, NormalizedListing};
use crate::pipeline::Extraction;

/// Hand-off document for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source: String,
    pub fingerprint: String,
    pub listing_count: usize,
    pub listings: Vec<NormalizedListing>,
    pub details: DetailMapping,
}

impl Report {
    pub fn new(source: impl Into<String>, extraction: Extraction) -> Result<Self> {
        let fingerprint = fingerprint(&extraction)?;
        Ok(Self {
            source: source.into(),
            fingerprint,
            listing_count: extraction.listings.len(),
            listings: extraction.listings,
            details: extraction.details,
        })
    }

    /// Write the report as `<dir>/<name>.json`, returning the path written.
    pub fn write_to(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let path = dir.join(format!("{}.json", name));
        let body = serde_json::to_string_pretty(self)?;
        fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Wrote {} listings to {}", self.listing_count, path.display());
        Ok(path)
    }
}

/// MD5 of the compact serialized extraction. Identical input gives an
/// identical fingerprint.
pub fn fingerprint(extraction: &Extraction) -> Result<String> {
    let bytes = serde_json::to_vec(extraction).context("Failed to serialize extraction")?;
    Ok(format!("{:x}", md5::compute(bytes)))
}

/// File stem used to name a document's report.
pub fn report_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "report".to_string())
}

/// Report name reserved for the SQLite source.
pub const DATABASE_REPORT: &str = "database";

/// One distinct report name per input, in input order. A stem shared by
/// several inputs, or clashing with the database report, gets a short hash
/// of the full path appended.
pub fn report_names(inputs: &[PathBuf]) -> Vec<String> {
    let stems: Vec<String> = inputs.iter().map(|path| report_name(path)).collect();

    let mut stem_counts: HashMap<&str, usize> = HashMap::new();
    for stem in &stems {
        *stem_counts.entry(stem.as_str()).or_default() += 1;
    }

    let mut taken: HashSet<String> = HashSet::from([DATABASE_REPORT.to_string()]);
    let mut names = Vec::with_capacity(inputs.len());

    for (idx, (path, stem)) in inputs.iter().zip(&stems).enumerate() {
        let mut name = if stem_counts[stem.as_str()] == 1 && stem != DATABASE_REPORT {
            stem.clone()
        } else {
            let digest = format!("{:x}", md5::compute(format!("{}#{}", path.display(), idx)));
            format!("{}-{}", stem, &digest[..8])
        };

        let mut suffix = idx + 1;
        while taken.contains(&name) {
            name = format!("{}-{}", name, suffix);
            suffix += 1;
        }
        taken.insert(name.clone());
        names.push(name);
    }

    names
}
