/// Pipeline configuration
///
/// Both pipelines take an explicit config struct instead of global paths.
/// Configs are serialized to JSON so a run can be described in a file
/// and overridden from the command line.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PrepError, Result};

/// Tolerance when checking that split ratios add up to 1.0
pub const RATIO_TOLERANCE: f64 = 0.001;

/// Output resolution of the normalizer
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl Default for TargetSize {
    fn default() -> Self {
        Self {
            width: 224,
            height: 224,
        }
    }
}

/// Settings for the image normalizer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Input root: `<dataset_dir>/<class>/<images>`
    pub dataset_dir: PathBuf,
    /// Output root, mirrored class tree
    pub output_dir: PathBuf,
    /// Every image is resized to exactly this size
    pub target_size: TargetSize,
    /// Extensions that make a file part of a class (case-insensitive)
    pub valid_extensions: Vec<String>,
    /// Upper bound on worker threads (None = all CPUs)
    pub max_workers: Option<usize>,
    /// Draw per-class progress bars
    pub show_progress: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from("Images"),
            output_dir: PathBuf::from("dataset_limpio"),
            target_size: TargetSize::default(),
            valid_extensions: default_extensions(),
            max_workers: None,
            show_progress: true,
        }
    }
}

impl NormalizeConfig {
    /// Reject settings that would fail every image
    pub fn validate(&self) -> Result<()> {
        let TargetSize { width, height } = self.target_size;
        if width == 0 || height == 0 {
            return Err(PrepError::InvalidTargetSize { width, height });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
        Self::from_json(&json)
    }
}

/// Settings for the train/val/test splitter
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    /// Input root: `<source_dir>/<class>/<images>`
    pub source_dir: PathBuf,
    /// Output root: `<target_dir>/{train,val,test}/<class>/`
    pub target_dir: PathBuf,
    pub train_ratio: f64,
    pub val_ratio: f64,
    pub test_ratio: f64,
    /// Extensions that make a file part of a class (case-insensitive)
    pub valid_extensions: Vec<String>,
    /// Fixed shuffle seed; None draws a fresh one every run
    pub seed: Option<u64>,
    /// Upper bound on worker threads (None = all CPUs)
    pub max_workers: Option<usize>,
    /// Draw per-class progress bars
    pub show_progress: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("dataset_limpio"),
            target_dir: PathBuf::from("dataset_split"),
            train_ratio: 0.7,
            val_ratio: 0.2,
            test_ratio: 0.1,
            valid_extensions: default_extensions(),
            seed: None,
            max_workers: None,
            show_progress: true,
        }
    }
}

impl SplitConfig {
    /// Check the ratios once, before any class is touched
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("train", self.train_ratio),
            ("val", self.val_ratio),
            ("test", self.test_ratio),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PrepError::NegativeRatio { name, value });
            }
        }

        let sum = self.train_ratio + self.val_ratio + self.test_ratio;
        if (sum - 1.0).abs() >= RATIO_TOLERANCE {
            return Err(PrepError::InvalidRatios {
                train: self.train_ratio,
                val: self.val_ratio,
                test: self.test_ratio,
                sum,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
        Self::from_json(&json)
    }
}

fn default_extensions() -> Vec<String> {
    vec![".png".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratios_are_valid() {
        assert!(SplitConfig::default().validate().is_ok());
    }

    #[test]
    fn test_ratios_must_sum_to_one() {
        let config = SplitConfig {
            train_ratio: 0.7,
            val_ratio: 0.2,
            test_ratio: 0.2,
            ..SplitConfig::default()
        };
        match config.validate() {
            Err(PrepError::InvalidRatios { sum, .. }) => assert!((sum - 1.1).abs() < 1e-9),
            other => panic!("expected InvalidRatios, got {:?}", other),
        }
    }

    #[test]
    fn test_ratio_tolerance() {
        let config = SplitConfig {
            train_ratio: 0.7,
            val_ratio: 0.2,
            test_ratio: 0.1005,
            ..SplitConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_ratio_rejected() {
        let config = SplitConfig {
            train_ratio: 1.2,
            val_ratio: -0.2,
            test_ratio: 0.0,
            ..SplitConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PrepError::NegativeRatio { name: "val", .. })
        ));
    }

    #[test]
    fn test_zero_target_size_rejected() {
        let config = NormalizeConfig {
            target_size: TargetSize { width: 0, height: 224 },
            ..NormalizeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SplitConfig::from_json(r#"{ "seed": 7, "train_ratio": 0.8, "val_ratio": 0.1 }"#)
            .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.train_ratio, 0.8);
        assert_eq!(config.test_ratio, 0.1);
        assert_eq!(config.source_dir, PathBuf::from("dataset_limpio"));
        assert_eq!(config.valid_extensions, vec![".png".to_string()]);
    }

    #[test]
    fn test_normalize_config_serialization() {
        let mut config = NormalizeConfig::default();
        config.target_size = TargetSize { width: 64, height: 32 };
        config.max_workers = Some(2);

        let json = config.to_json().unwrap();
        let restored = NormalizeConfig::from_json(&json).unwrap();

        assert_eq!(config, restored);
    }

    #[test]
    fn test_load_missing_file() {
        let result = NormalizeConfig::load(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(PrepError::Io { .. })));
    }
}
