//! # Pool Configuration
//!
//! Loaded once at startup. The chunk count is the only knob: the stride is
//! fixed by the element type, so capacity is `chunk_count * stride`.
//!
//! ```toml
//! chunk_count = 4096
//! ```

use crate::error::{PoolError, PoolResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of chunks in a pool unless configured otherwise.
pub const DEFAULT_CHUNK_COUNT: usize = 4096;

/// Pool sizing configuration.
///
/// Copied into every allocator built from it, including rebound and
/// cloned allocators, so all siblings reserve pools of the same chunk count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Number of fixed-stride chunks in the pool.
    pub chunk_count: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            chunk_count: DEFAULT_CHUNK_COUNT,
        }
    }
}

impl PoolConfig {
    /// Creates a configuration with the given chunk count.
    #[inline]
    #[must_use]
    pub const fn with_chunk_count(chunk_count: usize) -> Self {
        Self { chunk_count }
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the text is not valid TOML,
    /// has unknown keys, or describes an empty pool.
    pub fn from_toml_str(text: &str) -> PoolResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| PoolError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the file cannot be read or
    /// its contents are rejected by [`PoolConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> PoolResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PoolError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks that the configuration describes a usable pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `chunk_count` is zero.
    pub fn validate(&self) -> PoolResult<()> {
        if self.chunk_count == 0 {
            return Err(PoolError::InvalidConfig(
                "chunk_count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunk_count() {
        assert_eq!(PoolConfig::default().chunk_count, 4096);
    }

    #[test]
    fn test_from_toml() {
        let config = PoolConfig::from_toml_str("chunk_count = 64").unwrap();
        assert_eq!(config, PoolConfig::with_chunk_count(64));

        // Missing keys fall back to defaults
        let config = PoolConfig::from_toml_str("").unwrap();
        assert_eq!(config, PoolConfig::default());
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(matches!(
            PoolConfig::from_toml_str("chunk_count = 0"),
            Err(PoolError::InvalidConfig(_))
        ));
        assert!(matches!(
            PoolConfig::from_toml_str("chunk_size = 8"),
            Err(PoolError::InvalidConfig(_))
        ));
        assert!(matches!(
            PoolConfig::from_toml_str("chunk_count = \"many\""),
            Err(PoolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let path = std::env::temp_dir().join("poolalloc_missing_config_file.toml");
        assert!(matches!(
            PoolConfig::from_file(&path),
            Err(PoolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("poolalloc_config_{id}.toml"));
        std::fs::write(&path, "chunk_count = 128\n").unwrap();

        let config = PoolConfig::from_file(&path).unwrap();
        assert_eq!(config.chunk_count, 128);

        std::fs::remove_file(&path).ok();
    }
}
