use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::parsers::DatasetFormat;

/// Finds dataset exports (JSON or CSV) among the paths given on the command line
pub struct FileDiscovery {
    recursive: bool,
}

impl FileDiscovery {
    pub fn new(recursive: bool) -> Self {
        Self { recursive }
    }

    /// Files are kept as given, directories are scanned. Duplicates are
    /// dropped, first occurrence wins.
    pub fn discover(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                files.push(path.clone());
            } else if path.is_dir() {
                files.extend(self.discover_in_directory(path)?);
            } else {
                debug!("Skipping missing path {}", path.display());
            }
        }

        let mut seen = HashSet::new();
        files.retain(|path| seen.insert(path.clone()));

        Ok(files)
    }

    fn discover_in_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if self.recursive {
            for entry in WalkDir::new(dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_dataset_file(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            let entries = fs::read_dir(dir)
                .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

            for entry in entries {
                let entry = entry.with_context(|| {
                    format!("Failed to read directory entry in: {}", dir.display())
                })?;
                let path = entry.path();

                if path.is_file() && is_dataset_file(&path) {
                    files.push(path);
                }
            }
            files.sort();
        }

        Ok(files)
    }
}

fn is_dataset_file(path: &Path) -> bool {
    DatasetFormat::from_path(path) != DatasetFormat::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_file_discovery() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dir_path = temp_dir.path();

        let json_path = dir_path.join("requests.json");
        writeln!(File::create(&json_path)?, "[]")?;

        let csv_path = dir_path.join("profiles.csv");
        writeln!(File::create(&csv_path)?, "principal,name")?;

        let notes_path = dir_path.join("notes.txt");
        writeln!(File::create(&notes_path)?, "not a dataset")?;

        let nested = dir_path.join("nested");
        fs::create_dir(&nested)?;
        let nested_path = nested.join("locations.json");
        writeln!(File::create(&nested_path)?, "[]")?;

        let flat = FileDiscovery::new(false).discover(&[dir_path.to_path_buf()])?;
        assert_eq!(flat, vec![csv_path.clone(), json_path.clone()]);

        let deep = FileDiscovery::new(true).discover(&[
            dir_path.to_path_buf(),
            json_path.clone(),
        ])?;
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&nested_path));
        assert!(!deep.contains(&notes_path));

        Ok(())
    }
}
