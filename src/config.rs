use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Settings for one download → normalize → plot run, read from YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineConfig {
    /// Dataset archive URL.
    pub url: String,
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
    /// Where the archive is unpacked; the download directory when unset.
    #[serde(default)]
    pub extract_dir: Option<String>,
    #[serde(default = "default_ignore_lines")]
    pub ignore_lines: usize,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Rows to keep; every row when empty.
    #[serde(default)]
    pub country_codes: Vec<String>,
}

fn default_download_dir() -> String {
    "data".to_string()
}

// indicator exports open with four lines of metadata
fn default_ignore_lines() -> usize {
    4
}

fn default_delimiter() -> char {
    ','
}

impl PipelineConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing pipeline config")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}
