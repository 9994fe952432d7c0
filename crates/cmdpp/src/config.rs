// crates/cmdpp/src/config.rs
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parsing error in {path:?}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid define {0:?}: expected NAME or NAME=VALUE")]
    InvalidDefine(String),
}

/// Settings read from `cmdpp.toml` or `[package.metadata.cmdpp]` in `Cargo.toml`.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct FileConfig {
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    // Path handling
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub pathsep: Option<String>,

    // Preprocessing
    #[serde(default)]
    pub define: Option<Vec<String>>,
    #[serde(default)]
    pub true_literal: Option<String>,
    #[serde(default)]
    pub false_literal: Option<String>,
    #[serde(default)]
    pub max_rewrites: Option<usize>,

    #[serde(default)]
    pub dump_tables: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CargoToml {
    #[serde(default)]
    package: CargoPackage,
}

#[derive(Debug, Deserialize, Default)]
struct CargoPackage {
    #[serde(default)]
    metadata: CargoMetadata,
}

#[derive(Debug, Deserialize, Default)]
struct CargoMetadata {
    #[serde(default)]
    cmdpp: FileConfig,
}

impl FileConfig {
    /// Reads a config file; a missing file yields `None`.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        match read_if_exists(path)? {
            Some(content) => Ok(Some(parse(path, &content)?)),
            None => Ok(None),
        }
    }

    /// Merges `Cargo.toml` metadata with `cmdpp.toml` from `dir`; the latter wins.
    pub fn from_nearest(dir: &Path) -> Result<Self, ConfigError> {
        let mut config = FileConfig::default();

        let cargo_path = dir.join("Cargo.toml");
        if let Some(content) = read_if_exists(&cargo_path)? {
            let cargo: CargoToml = parse(&cargo_path, &content)?;
            config.merge(cargo.package.metadata.cmdpp);
        }

        if let Some(cmdpp_config) = Self::from_file(&dir.join("cmdpp.toml"))? {
            config.merge(cmdpp_config);
        }

        Ok(config)
    }

    /// Merge another config into this one, taking values from other if they are Some
    pub fn merge(&mut self, other: Self) {
        macro_rules! merge_field {
            ($field:ident) => {
                if let Some(value) = other.$field {
                    self.$field = Some(value);
                }
            };
        }

        merge_field!(out_dir);
        merge_field!(include);
        merge_field!(pathsep);
        merge_field!(define);
        merge_field!(true_literal);
        merge_field!(false_literal);
        merge_field!(max_rewrites);
        merge_field!(dump_tables);
    }
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn read_if_exists(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
