//! Projection configuration.
//!
//! Everything is optional; missing fields fall back to [`ProjectionConfig::default`].
//!
//! ```toml
//! log_profile = "production"
//! codec_cache_capacity = 512
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ExError, ExErrorKind, ProjectionError, Result};
use crate::logging_facility::Profile;

/// Default number of resolved child codecs kept by the reference codec
pub const DEFAULT_CODEC_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Logging profile handed to [`crate::logging_facility::init`]
    pub log_profile: Profile,
    /// Bound of the LRU interning resolved child codecs
    pub codec_cache_capacity: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            log_profile: Profile::Development,
            codec_cache_capacity: DEFAULT_CODEC_CACHE_CAPACITY,
        }
    }
}

impl ProjectionConfig {
    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// `ERR_INVALID_CONFIG` when the text is not valid TOML for this struct or
    /// fails [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ProjectionConfig = toml::from_str(text).map_err(|e| {
            ExError::from(ProjectionError::InvalidConfig {
                reason: e.to_string(),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// `ERR_INVALID_CONFIG` when `codec_cache_capacity` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.codec_cache_capacity == 0 {
            return Err(ExError::new(ExErrorKind::InvalidConfig)
                .with_op("validate_config")
                .with_message("codec_cache_capacity must be greater than zero"));
        }
        Ok(())
    }
}
