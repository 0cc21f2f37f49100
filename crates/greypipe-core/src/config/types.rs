//! Sub-configuration structs with defaults matching the reference pipeline.

use serde::{Deserialize, Serialize};

/// Pipeline settings for stage channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max jobs buffered between two pipeline stages.
    ///
    /// 1 is the closest tokio channels get to a rendezvous hand-off, so a
    /// slow stage throttles everything upstream of it.
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { buffer_size: 1 }
    }
}

/// Bounding box for the resize stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Maximum output width in pixels
    pub max_width: u32,

    /// Maximum output height in pixels
    pub max_height: u32,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            max_width: 500,
            max_height: 500,
        }
    }
}

/// Output location and encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path segment replaced (first occurrence only) to derive output paths
    pub input_segment: String,

    /// Replacement for `input_segment`
    pub output_segment: String,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            input_segment: "images/".to_string(),
            output_segment: "images/output/".to_string(),
            jpeg_quality: 90,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
