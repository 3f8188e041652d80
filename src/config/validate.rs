//! Configuration validation.

use crate::config::{Config, OutputFormat};
use crate::constants::{MAX_BATCH_SIZE, confidence};
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_batch_size(config.defaults.batch_size)?;
    if let Some(min_confidence) = config.defaults.min_confidence {
        validate_min_confidence(min_confidence)?;
    }
    validate_formats(&config.defaults.formats)
}

/// Require at least one output format.
pub fn validate_formats(formats: &[OutputFormat]) -> Result<()> {
    if formats.is_empty() {
        return Err(Error::Config {
            message: "at least one output format is required".to_string(),
        });
    }
    Ok(())
}

/// Reject batch sizes the partitioner cannot honor.
pub fn validate_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(Error::Config {
            message: "batch_size must be at least 1".to_string(),
        });
    }

    if batch_size > MAX_BATCH_SIZE {
        return Err(Error::Config {
            message: format!("batch_size must be at most {MAX_BATCH_SIZE}, got {batch_size}"),
        });
    }

    Ok(())
}

/// Reject confidence thresholds outside `[0, 1]`.
pub fn validate_min_confidence(min_confidence: f32) -> Result<()> {
    if !(confidence::MIN..=confidence::MAX).contains(&min_confidence) {
        return Err(Error::Config {
            message: format!(
                "min_confidence must be between {} and {}, got {}",
                confidence::MIN,
                confidence::MAX,
                min_confidence
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_invalid_confidence() {
        let mut config = Config::default();
        config.defaults.min_confidence = Some(1.5);
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let mut config = Config::default();
        config.defaults.batch_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_oversized_batch_size() {
        assert!(validate_batch_size(MAX_BATCH_SIZE).is_ok());
        assert!(validate_batch_size(MAX_BATCH_SIZE + 1).is_err());
    }

    #[test]
    fn test_validate_unset_confidence_is_valid() {
        let config = Config::default();
        assert_eq!(config.defaults.min_confidence, None);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_formats() {
        let mut config = Config::default();
        config.defaults.formats.clear();
        assert!(validate_config(&config).is_err());
    }
}
