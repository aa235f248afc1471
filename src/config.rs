//! Codec settings, read from a TOML file or left at their defaults.
//!
//! A process-wide value can be installed once with [`set_config`]; readers and
//! writers built without an explicit config use [`config`].

use std::path::Path;

use once_cell::sync::OnceCell;
use serde::Deserialize;

static CONFIG: OnceCell<CodecConfig> = OnceCell::new();

/// How capture files are compressed on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    Gzip,
    /// Gzip when the file name ends in `.gz`, plain text otherwise.
    #[default]
    Auto,
}

impl Compression {
    /// Whether a capture at `path` is gzip compressed under this setting.
    pub fn is_gzip(&self, path: &Path) -> bool {
        match self {
            Compression::None => false,
            Compression::Gzip => true,
            Compression::Auto => path.extension().is_some_and(|ext| ext == "gz"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Capacity of the read and write buffers wrapped around I/O resources.
    pub buffer_size: usize,

    /// Longest accepted JSONL line in bytes, `0` disables the check.
    pub max_line_size: usize,

    pub skip_blank_lines: bool,
    pub write_timestamps: bool,

    pub compression: Compression,
    pub compression_level: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            max_line_size: 0,

            skip_blank_lines: true,
            write_timestamps: true,

            compression: Compression::Auto,
            compression_level: 6,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl CodecConfig {
    /// Loads a TOML config file, reporting read and parse failures.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str::<CodecConfig>(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads a TOML config file, falling back to the defaults when it cannot be used.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "falling back to default codec config");
                CodecConfig::default()
            }
        }
    }

    /// The flate2 level, clamped to the 0-9 range gzip accepts.
    pub fn gzip_level(&self) -> flate2::Compression {
        flate2::Compression::new(self.compression_level.min(9))
    }
}

/// Installs the process-wide default config. Fails with the rejected value
/// if a config was already installed or read.
pub fn set_config(cfg: CodecConfig) -> Result<(), CodecConfig> {
    CONFIG.set(cfg)
}

/// The process-wide default config, or the built-in defaults if none was set.
pub fn config() -> &'static CodecConfig {
    CONFIG.get_or_init(CodecConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.buffer_size, 8192);
        assert_eq!(config.max_line_size, 0);
        assert!(config.skip_blank_lines);
        assert!(config.write_timestamps);
        assert_eq!(config.compression, Compression::Auto);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CodecConfig = toml::from_str(
            r#"
            max_line_size = 1024
            compression = "gzip"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_line_size, 1024);
        assert_eq!(config.compression, Compression::Gzip);
        assert_eq!(config.buffer_size, 8192);
        assert!(config.write_timestamps);
    }

    #[test]
    fn test_load_and_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "skip_blank_lines = false").unwrap();
        let config = CodecConfig::load(file.path()).unwrap();
        assert!(!config.skip_blank_lines);

        let missing = file.path().with_extension("missing");
        assert!(matches!(CodecConfig::load(&missing), Err(ConfigError::Io { .. })));
        assert_eq!(CodecConfig::from_file(&missing), CodecConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "compression = \"zip\"").unwrap();
        assert!(matches!(
            CodecConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(CodecConfig::from_file(file.path()), CodecConfig::default());
    }

    #[test]
    fn test_auto_compression_follows_extension() {
        assert!(Compression::Auto.is_gzip(Path::new("capture.jsonl.gz")));
        assert!(!Compression::Auto.is_gzip(Path::new("capture.jsonl")));
        assert!(Compression::Gzip.is_gzip(Path::new("capture.jsonl")));
        assert!(!Compression::None.is_gzip(Path::new("capture.jsonl.gz")));
    }

    #[test]
    fn test_gzip_level_is_clamped() {
        let config = CodecConfig {
            compression_level: 42,
            ..CodecConfig::default()
        };
        assert_eq!(config.gzip_level().level(), 9);
    }
}
