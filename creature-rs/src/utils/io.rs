//! Loading of structured input files

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Serialization formats accepted for assets and configs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Yaml,
}

#[derive(Error, Debug)]
#[error("Unsupported file extension for {path} (expected .json, .yaml or .yml)")]
pub struct UnsupportedFormat {
    pub path: String,
}

impl DataFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> std::result::Result<Self, UnsupportedFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    /// Parse a document in this format
    pub fn parse<T: DeserializeOwned>(self, data: &str) -> Result<T> {
        Ok(match self {
            Self::Json => serde_json::from_str(data)?,
            Self::Yaml => serde_yaml_ng::from_str(data)?,
        })
    }
}

/// Read and deserialize a JSON or YAML file
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = DataFormat::from_path(path)?;
    let data =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    log::debug!("Parsing {} as {:?}", path.display(), format);
    format
        .parse(&data)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
