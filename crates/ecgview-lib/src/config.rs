use crate::detectors::EcgPipelineConfig;
use crate::plot::DEFAULT_DURATION_S;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Viewer settings, read from a TOML file.
///
/// ```toml
/// data_dir = "data"
/// duration_sec = 10.0
///
/// [detector]
/// min_rr_s = 0.25
///
/// [output]
/// width = 1500
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub data_dir: PathBuf,
    pub duration_sec: f64,
    pub detector: EcgPipelineConfig,
    pub output: OutputConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            duration_sec: DEFAULT_DURATION_S,
            detector: EcgPipelineConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Bitmap sizes in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    pub overview_width: u32,
    pub overview_height: u32,
    pub histogram_width: u32,
    pub histogram_height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 500,
            overview_width: 1500,
            overview_height: 1000,
            histogram_width: 1000,
            histogram_height: 400,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid viewer configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(ViewerConfig::from_toml_str("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let cfg = ViewerConfig::from_toml_str(
            "data_dir = \"/srv/ecg\"\nduration_sec = 5.0\n[detector]\nmin_rr_s = 0.25\n[output]\nwidth = 800\n",
        )
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/ecg"));
        assert_eq!(cfg.duration_sec, 5.0);
        assert_eq!(cfg.detector.min_rr_s, 0.25);
        assert_eq!(cfg.detector.lowcut_hz, EcgPipelineConfig::default().lowcut_hz);
        assert_eq!(cfg.output.width, 800);
        assert_eq!(cfg.output.height, 500);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(ViewerConfig::from_toml_str("duration_sec = \"long\"").is_err());
    }
}
