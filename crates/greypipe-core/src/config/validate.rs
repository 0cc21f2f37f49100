//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0".into(),
            ));
        }
        if self.resize.max_width == 0 || self.resize.max_height == 0 {
            return Err(ConfigError::ValidationError(
                "resize.max_width and resize.max_height must be > 0".into(),
            ));
        }
        if self.output.jpeg_quality == 0 || self.output.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "output.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.output.input_segment.is_empty() || self.output.output_segment.is_empty() {
            return Err(ConfigError::ValidationError(
                "output.input_segment and output.output_segment must not be empty".into(),
            ));
        }
        // Identical segments would write results over their inputs.
        if self.output.input_segment == self.output.output_segment {
            return Err(ConfigError::ValidationError(
                "output.output_segment must differ from output.input_segment".into(),
            ));
        }
        Ok(())
    }
}
