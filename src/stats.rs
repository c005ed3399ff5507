//! Aggregate optimizer counters and their JSON sidecar.
//!
//! The optimizer leaves `optimization-stats.json` in its output root so the
//! markup generator can quote real savings instead of a guessed figure.

use crate::constants::STATS_FILE_NAME;
use crate::error::Result;
use crate::utils::savings_percent;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationStats {
    pub files_processed: usize,
    /// Sum of source sizes for every processed file.
    pub original_bytes: u64,
    /// Sum of the JPEG outputs that were actually written.
    pub optimized_bytes: u64,
    pub webp_files: usize,
    pub failed_files: usize,
}

impl OptimizationStats {
    pub fn saved_bytes(&self) -> u64 {
        self.original_bytes.saturating_sub(self.optimized_bytes)
    }

    pub fn savings_percent(&self) -> f64 {
        savings_percent(self.original_bytes, self.optimized_bytes)
    }
}

/// What gets persisted next to the optimized images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub generated_at: DateTime<Local>,
    #[serde(flatten)]
    pub stats: OptimizationStats,
}

pub fn stats_path(output_root: &Path) -> PathBuf {
    output_root.join(STATS_FILE_NAME)
}

pub fn save_stats(output_root: &Path, stats: &OptimizationStats) -> Result<PathBuf> {
    let record = StatsRecord {
        generated_at: Local::now(),
        stats: stats.clone(),
    };
    let path = stats_path(output_root);
    fs::write(&path, serde_json::to_string_pretty(&record)?)?;
    Ok(path)
}

/// Loads the sidecar if the optimizer has run against this directory.
pub fn load_stats(output_root: &Path) -> Result<Option<StatsRecord>> {
    let path = stats_path(output_root);
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use tempfile::TempDir;

    fn sample() -> OptimizationStats {
        OptimizationStats {
            files_processed: 3,
            original_bytes: 10_000,
            optimized_bytes: 1_220,
            webp_files: 3,
            failed_files: 0,
        }
    }

    #[test]
    fn test_savings() {
        let stats = sample();
        assert_eq!(stats.saved_bytes(), 8_780);
        assert!((stats.savings_percent() - 87.8).abs() < 1e-9);
        assert_eq!(OptimizationStats::default().savings_percent(), 0.0);
    }

    #[test]
    fn test_saved_bytes_never_underflows() {
        let stats = OptimizationStats {
            original_bytes: 100,
            optimized_bytes: 150,
            ..Default::default()
        };
        assert_eq!(stats.saved_bytes(), 0);
        assert!(stats.savings_percent() < 0.0);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_stats(temp_dir.path()).unwrap().is_none());

        let path = save_stats(temp_dir.path(), &sample()).unwrap();
        assert_eq!(path, temp_dir.path().join("optimization-stats.json"));

        let record = load_stats(temp_dir.path()).unwrap().unwrap();
        assert_eq!(record.stats, sample());
    }

    #[test]
    fn test_sidecar_is_flat_json() {
        let temp_dir = TempDir::new().unwrap();
        save_stats(temp_dir.path(), &sample()).unwrap();
        let raw = fs::read_to_string(stats_path(temp_dir.path())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["files_processed"], 3);
        assert_eq!(value["webp_files"], 3);
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_corrupt_sidecar_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(stats_path(temp_dir.path()), "{ not json").unwrap();
        assert!(matches!(
            load_stats(temp_dir.path()),
            Err(ProcessingError::Stats(_))
        ));
    }
}
