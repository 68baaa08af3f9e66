use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Datelike;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::extract::ExtractOptions;

pub const DEFAULT_CONFIG_FILE: &str = "volunteer_records.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_path: PathBuf,
    /// Field separator; must be one ASCII character.
    pub delimiter: String,
    pub encodings: Vec<String>,
    pub db_path: PathBuf,
    pub description_budget: usize,
    pub people_needed: u32,
    /// Founding year given to teams without a known college. Current year when unset.
    pub processing_year: Option<i32>,
    pub metrics: MetricSettings,
}

/// Constants behind the synthetic team counters. None of these are measurements.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetricSettings {
    pub volunteer_base: u32,
    pub volunteer_mult: u32,
    pub hours_base: u32,
    pub hours_mult: u32,
    pub students_base: u32,
    pub students_mult: u32,
    pub honors_threshold: usize,
}

impl Default for MetricSettings {
    fn default() -> Self {
        MetricSettings {
            volunteer_base: 50,
            volunteer_mult: 5,
            hours_base: 1000,
            hours_mult: 100,
            students_base: 500,
            students_mult: 50,
            honors_threshold: 5,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_path: PathBuf::from("data/articles.csv"),
            delimiter: ",".to_string(),
            encodings: ["utf-8", "gbk", "gb18030", "utf-16le"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            db_path: PathBuf::from("data/volunteer_records.sqlite"),
            description_budget: 100,
            people_needed: 3,
            processing_year: None,
            metrics: MetricSettings::default(),
        }
    }
}

impl Settings {
    /// Layers an optional TOML file under `VR_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file_source = match file {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("VR")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("encodings")
                    .try_parsing(true),
            )
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize::<Settings>()
            .context("invalid configuration")?;
        Ok(settings)
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter),
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            description_budget: self.description_budget,
            people_needed: self.people_needed,
            processing_year: self
                .processing_year
                .unwrap_or_else(|| chrono::Local::now().year()),
            metrics: self.metrics,
        }
    }
}
