use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{BloodMatchError, Result};
use crate::types::*;

pub mod csv_rows;
pub mod json;

pub use csv_rows::CsvDatasetParser;
pub use json::JsonDatasetParser;

/// Records exported from the donation service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub profiles: Vec<UserProfile>,
    #[serde(default)]
    pub requests: Vec<BloodRequest>,
    #[serde(default)]
    pub locations: Vec<ActiveLocation>,
}

impl Dataset {
    pub fn merge(&mut self, other: Dataset) {
        self.profiles.extend(other.profiles);
        self.requests.extend(other.requests);
        self.locations.extend(other.locations);
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty() && self.requests.is_empty() && self.locations.is_empty()
    }

    pub fn profile(&self, principal: &str) -> Option<&UserProfile> {
        self.profiles.iter().find(|p| p.principal == principal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Json,
    Csv,
    Unknown,
}

impl DatasetFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "json" => DatasetFormat::Json,
            "csv" => DatasetFormat::Csv,
            _ => DatasetFormat::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .map(|ext| Self::from_extension(&ext.to_string_lossy()))
            .unwrap_or(DatasetFormat::Unknown)
    }
}

/// Picks the right parser for a dataset file
pub struct DatasetParser {
    json: JsonDatasetParser,
    csv: CsvDatasetParser,
}

impl DatasetParser {
    pub fn new() -> Self {
        Self {
            json: JsonDatasetParser::new(),
            csv: CsvDatasetParser::new(),
        }
    }

    pub fn parse(&self, path: &Path) -> Result<Dataset> {
        let format = DatasetFormat::from_path(path);
        if format == DatasetFormat::Unknown {
            return Err(BloodMatchError::UnsupportedFormat {
                path: path.display().to_string(),
            });
        }

        let contents = fs::read_to_string(path)?;
        let dataset = self.parse_str(&contents, format, &path.display().to_string())?;

        debug!(
            "Parsed {}: {} profiles, {} requests, {} locations",
            path.display(),
            dataset.profiles.len(),
            dataset.requests.len(),
            dataset.locations.len()
        );

        Ok(dataset)
    }

    /// Parse and merge every file. Files that fail are logged and skipped as
    /// long as at least one parses; otherwise the first failure is returned.
    pub fn parse_all(&self, files: &[PathBuf]) -> Result<Dataset> {
        let results: Vec<(&PathBuf, Result<Dataset>)> = files
            .par_iter()
            .map(|path| (path, self.parse(path)))
            .collect();

        let mut dataset = Dataset::default();
        let mut parsed = 0;
        let mut failures = Vec::new();

        for (path, result) in results {
            match result {
                Ok(data) => {
                    dataset.merge(data);
                    parsed += 1;
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    failures.push((path, e));
                }
            }
        }

        if parsed == 0 {
            if let Some((path, first)) = failures.first() {
                return Err(BloodMatchError::NoDatasetParsed {
                    failed: failures.len(),
                    path: path.display().to_string(),
                    message: first.to_string(),
                });
            }
        }

        Ok(dataset)
    }

    /// Parse already-loaded contents. `source` is only used in error messages.
    pub fn parse_str(&self, contents: &str, format: DatasetFormat, source: &str) -> Result<Dataset> {
        match format {
            DatasetFormat::Json => self.json.parse_str(contents, source),
            DatasetFormat::Csv => self.csv.parse_str(contents, source),
            DatasetFormat::Unknown => Err(BloodMatchError::UnsupportedFormat {
                path: source.to_string(),
            }),
        }
    }
}

impl Default for DatasetParser {
    fn default() -> Self {
        Self::new()
    }
}
