//! Settings are read from config files, then from the environment.
//!
//! Environment variables prefixed with `HYP_` override the hierarchical
//! structure of the config files, with `_` separating path segments. For
//! example `HYP_TRACING_LEVEL=debug` overrides
//!
//! ```json
//! { "tracing": { "level": "info" } }
//! ```
//!
//! Config files are listed, comma separated, in `CONFIG_FILES`. Later files
//! take precedence over earlier ones and the environment over all files.

use std::{env, path::PathBuf};

use config::{Config, Environment, File};
use eyre::{eyre, Context, Result};
use serde::{de::DeserializeOwned, Deserialize};

use hyperlane_ism::config::IsmConfig;

pub use trace::*;

/// Tracing subscriber management
mod trace;

/// Settings for a process hosting security modules.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Log output
    #[serde(default)]
    pub tracing: TracingConfig,
    /// Module tree to deploy
    #[serde(default)]
    pub ism: Option<IsmConfig>,
}

impl Settings {
    /// Load from the files listed in `CONFIG_FILES` and the environment.
    pub fn load() -> Result<Self> {
        let config_files: Vec<PathBuf> = env::var("CONFIG_FILES")
            .map(|s| s.split(',').map(PathBuf::from).collect())
            .unwrap_or_default();
        load_settings(&config_files)
    }
}

/// Deserialize a settings object from `config_files` and `HYP_` prefixed
/// environment variables.
pub fn load_settings<T>(config_files: &[PathBuf]) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();
    for path in config_files {
        if !path.is_file() {
            return Err(eyre!("Config path {path:?} does not exist or is not a file"));
        }
        builder = builder.add_source(File::from(path.clone()));
    }

    let config = builder
        .add_source(Environment::with_prefix("HYP").separator("_"))
        .build()
        .context("Failed to load config sources")?;

    config.try_deserialize::<T>().with_context(|| {
        format!("Config deserialization error, loaded from {config_files:?}")
    })
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use hyperlane_core::H256;

    use super::*;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_an_ism_tree_from_file() {
        let file = config_file(
            r#"{
                "tracing": { "level": "warn" },
                "ism": {
                    "type": "aggregation",
                    "threshold": 1,
                    "modules": [
                        { "type": "testIsm", "accept": true },
                        { "type": "address", "address": "0x0000000000000000000000000000000000000000000000000000000000000007" }
                    ]
                }
            }"#,
        );
        let settings: Settings = load_settings(&[file.path().to_path_buf()]).unwrap();
        assert_eq!(settings.tracing.level, Level::Warn);
        assert_eq!(
            settings.ism,
            Some(IsmConfig::Aggregation {
                modules: vec![
                    IsmConfig::TestIsm { accept: true },
                    IsmConfig::Address {
                        address: H256::from_low_u64_be(7)
                    },
                ],
                threshold: 1,
            })
        );
    }

    #[test]
    fn environment_overrides_files() {
        let file = config_file(r#"{ "tracing": { "level": "error" } }"#);
        env::set_var("HYP_TRACING_FMT", "json");
        let settings: Settings = load_settings(&[file.path().to_path_buf()]).unwrap();
        env::remove_var("HYP_TRACING_FMT");
        assert_eq!(settings.tracing.fmt, Style::Json);
    }

    #[test]
    fn missing_files_are_reported() {
        let err = load_settings::<Settings>(&[PathBuf::from("/does/not/exist.json")]).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
