use serde::Deserialize;
use std::path::PathBuf;

/// Everything the thumbnailer process can be configured with. Every field has a default, so an
/// empty configuration is valid.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ThumbnailerSettings {
    pub rasterizer: RasterizerSettings,
    pub logging: LoggingSettings,
    pub aws: AwsSettings,
}

/// How PDF pages are rendered.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RasterizerSettings {
    /// Ghostscript binary, e.g. `/opt/bin/gs` when shipped in a Lambda layer.
    pub executable: PathBuf,
    /// Ghostscript output device.
    pub device: String,
    /// Render resolution in dpi. Unset means the Ghostscript default.
    pub resolution: Option<u32>,
    /// Treat any stderr output as a failed render, even with a zero exit code.
    pub fail_on_stderr: bool,
}

impl Default for RasterizerSettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("gs"),
            device: "png16m".to_string(),
            resolution: None,
            fail_on_stderr: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AwsSettings {
    /// Custom S3 endpoint, for S3-compatible stores or local testing.
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}
