use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MixError, Result};

/// Parameters for building the speaker index and drawing mixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    /// Directory scanned recursively for utterance files.
    #[serde(alias = "wsj0_tr")]
    pub source_dir: PathBuf,
    /// Number of sources summed into each mixture.
    pub num_spks: usize,
    /// Upper bound on the segment length, in samples.
    pub training_signal_len: usize,
    /// Every utterance must be recorded at this rate.
    pub sample_rate: u32,
    /// Width of the filename-stem prefix that names the speaker.
    pub speaker_id_len: usize,
    pub min_gain_db: f32,
    pub max_gain_db: f32,
    /// Peak absolute amplitude after scaling.
    pub peak: f32,
    pub seed: Option<u64>,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            num_spks: 2,
            training_signal_len: 40000,
            sample_rate: 8000,
            speaker_id_len: 3,
            min_gain_db: -2.5,
            max_gain_db: 0.0,
            peak: 0.9,
            seed: None,
        }
    }
}

impl MixConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MixConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_spks == 0 {
            return Err(invalid("num_spks must be at least 1"));
        }
        if self.training_signal_len == 0 {
            return Err(invalid("training_signal_len must be positive"));
        }
        if self.sample_rate == 0 {
            return Err(invalid("sample_rate must be positive"));
        }
        if self.speaker_id_len == 0 {
            return Err(invalid("speaker_id_len must be positive"));
        }
        if !self.peak.is_finite() || self.peak <= 0.0 || self.peak > 1.0 {
            return Err(invalid("peak must be in (0, 1]"));
        }
        if !self.min_gain_db.is_finite() || !self.max_gain_db.is_finite() {
            return Err(invalid("gain range must be finite"));
        }
        if self.min_gain_db > self.max_gain_db {
            return Err(invalid("min_gain_db must not exceed max_gain_db"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> MixError {
    MixError::InvalidConfig(msg.to_string())
}

pub fn load_config(path: &Path) -> Result<MixConfig> {
    let content = std::fs::read_to_string(path)?;
    MixConfig::from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = MixConfig::from_toml_str("").unwrap();
        assert_eq!(config, MixConfig::default());
        assert_eq!(config.num_spks, 2);
        assert_eq!(config.sample_rate, 8000);
        assert!((config.peak - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_override() {
        let config = MixConfig::from_toml_str(
            r#"
            wsj0_tr = "/data/wsj0/si_tr_s"
            training_signal_len = 32000
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.source_dir, PathBuf::from("/data/wsj0/si_tr_s"));
        assert_eq!(config.training_signal_len, 32000);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.num_spks, 2);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            MixConfig::from_toml_str("num_spks = 0"),
            Err(MixError::InvalidConfig(_))
        ));
        assert!(matches!(
            MixConfig::from_toml_str("peak = 1.5"),
            Err(MixError::InvalidConfig(_))
        ));
        assert!(matches!(
            MixConfig::from_toml_str("min_gain_db = 1.0\nmax_gain_db = 0.0"),
            Err(MixError::InvalidConfig(_))
        ));
        assert!(matches!(
            MixConfig::from_toml_str("num_spks = \"two\""),
            Err(MixError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mix.toml");
        std::fs::write(&path, "num_spks = 3\nspeaker_id_len = 4\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.num_spks, 3);
        assert_eq!(config.speaker_id_len, 4);

        assert!(matches!(
            load_config(&dir.path().join("missing.toml")),
            Err(MixError::Io(_))
        ));
    }
}
