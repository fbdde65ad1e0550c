use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{BloodMatchError, Result};
use crate::output::ReportFormat;

pub const DEFAULT_OUTPUT_DIR: &str = "./reports";

/// Optional TOML settings; command line flags take precedence
///
/// ```toml
/// output_dir = "./reports"
/// format = "json"
/// threads = 4
/// recursive = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub output_dir: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub threads: Option<usize>,
    pub recursive: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| BloodMatchError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config = Self::from_toml(&contents)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Settings after layering command line flags over the config file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub format: ReportFormat,
    /// 0 means one thread per CPU
    pub threads: usize,
    pub recursive: bool,
}

impl Settings {
    pub fn resolve(
        file: FileConfig,
        output_dir: Option<PathBuf>,
        format: Option<ReportFormat>,
        threads: Option<usize>,
        recursive: bool,
    ) -> Self {
        Self {
            output_dir: output_dir
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            format: format.or(file.format).unwrap_or_default(),
            threads: threads.or(file.threads).unwrap_or(0),
            recursive: recursive || file.recursive.unwrap_or(false),
        }
    }

    pub fn thread_count(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}
