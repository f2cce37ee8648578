use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Base name of the optional settings file (`store_listings.toml`, `.json`, ...).
const CONFIG_FILE: &str = "store_listings";
const ENV_PREFIX: &str = "STORE_LISTINGS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Hybrid JSON + HTML documents to ingest.
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    /// SQLite database with an `items` table.
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Where per-input reports are written. Without it only a summary is logged.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_sources(
            ::config::File::with_name(CONFIG_FILE).required(false),
            ::config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("inputs"),
        )
    }

    fn from_sources(
        file: ::config::File<::config::FileSourceFile, ::config::FileFormat>,
        env: ::config::Environment,
    ) -> Result<Self> {
        ::config::Config::builder()
            .set_default("inputs", Vec::<String>::new())?
            .set_default("log_format", "pretty")?
            .add_source(file)
            .add_source(env)
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn has_work(&self) -> bool {
        !self.inputs.is_empty() || self.database.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> ::config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ::config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("inputs")
            .source(Some(source))
    }

    fn no_file() -> ::config::File<::config::FileSourceFile, ::config::FileFormat> {
        ::config::File::with_name("does_not_exist_store_listings").required(false)
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::from_sources(no_file(), env(&[])).unwrap();
        assert_eq!(config.inputs, Vec::<PathBuf>::new());
        assert_eq!(config.database, None);
        assert_eq!(config.output_dir, None);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(!config.has_work());
    }

    #[test]
    fn reads_environment() {
        let config = Config::from_sources(
            no_file(),
            env(&[
                ("STORE_LISTINGS_INPUTS", "a.md,b.md"),
                ("STORE_LISTINGS_DATABASE", "data/stores.db"),
                ("STORE_LISTINGS_LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.inputs, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
        assert_eq!(config.database, Some(PathBuf::from("data/stores.db")));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.has_work());
    }
}
