use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::core::types::Quality;
use crate::utils::{CompressorError, CompressorResult};

/// Compressor defaults, loadable from a JSON file.
///
/// Every field is optional in the file; missing fields take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompressorConfig {
    /// Quality used until the user picks another
    pub default_quality: Quality,
    /// Buffered progress events per subscriber before old ones are dropped
    pub progress_capacity: usize,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            default_quality: Quality::DEFAULT,
            progress_capacity: 64,
        }
    }
}

impl CompressorConfig {
    pub fn from_json(json: &str) -> CompressorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> CompressorResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CompressorError::io(path, e))?;
        let config = Self::from_json(&json)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// The default quality must be a value the quality slider can show.
    pub fn validate(&self) -> CompressorResult<()> {
        let quality = self.default_quality.value();
        if (Quality::from_slider(quality).value() - quality).abs() > 1e-4 {
            return Err(CompressorError::config(format!(
                "defaultQuality {quality} is not in {}..={} in steps of {}",
                Quality::MIN,
                Quality::MAX,
                Quality::STEP
            )));
        }
        if self.progress_capacity == 0 {
            return Err(CompressorError::config("progressCapacity cannot be 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ErrorKind;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(CompressorConfig::from_json("{}").unwrap(), CompressorConfig::default());
    }

    #[test]
    fn fields_are_camel_case() {
        let config = CompressorConfig::from_json(r#"{"defaultQuality": 0.6, "progressCapacity": 8}"#).unwrap();
        assert_eq!(config.default_quality.value(), 0.6);
        assert_eq!(config.progress_capacity, 8);
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        let err = CompressorConfig::from_json(r#"{"defaultQuality": 0}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn off_grid_quality_is_rejected() {
        for json in [r#"{"defaultQuality": 0.01}"#, r#"{"defaultQuality": 0.83}"#] {
            let err = CompressorConfig::from_json(json).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
        assert!(CompressorConfig::from_json(r#"{"defaultQuality": 0.1}"#).is_ok());
        assert!(CompressorConfig::from_json(r#"{"defaultQuality": 1}"#).is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = CompressorConfig::from_json(r#"{"progressCapacity": 0}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compressor.json");
        std::fs::write(&path, r#"{"defaultQuality": 0.45}"#).unwrap();
        assert_eq!(CompressorConfig::load(&path).unwrap().default_quality.value(), 0.45);

        let missing = CompressorConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::Io);
    }
}
