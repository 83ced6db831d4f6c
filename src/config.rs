// In: src/config.rs

//! The single source of truth for streaming adapter configuration.
//!
//! This module defines the unified `StreamConfig` struct, which is created
//! once at the application boundary and handed to an adapter constructor.
//! Both adapters allocate their staging buffer from it exactly once; the
//! capacity never changes for the adapter's lifetime.

use serde::{Deserialize, Serialize};

use crate::error::MuaraError;

/// The staging buffer capacity used when none is configured.
///
/// This value is part of the public contract: it is stable per build and both
/// adapters use it for their prefetch / output staging buffers.
pub const DEFAULT_BUFFER_SIZE: usize = 512 * 1024;

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// Defines the trade-off between compression speed and final stream size.
///
/// Each engine maps the profile onto its own native level scale, so the same
/// configuration drives either engine family. An explicit
/// [`StreamConfig::level`] overrides the profile.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompressionProfile {
    /// Prioritizes speed over size.
    Fast,

    /// A balance between speed and size. This is the recommended default.
    #[default]
    Balanced,

    /// Prioritizes the smallest possible stream at the cost of CPU time.
    HighCompression,
}

/// The unified configuration for one streaming adapter.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub struct StreamConfig {
    /// The profile guiding compression/speed trade-offs. Ignored by the
    /// decompression side.
    #[serde(default)]
    pub profile: CompressionProfile,

    /// An explicit engine-native compression level. When set, it takes
    /// precedence over `profile`. Range checking is the engine's business,
    /// performed at construction time.
    #[serde(default)]
    pub level: Option<i32>,

    /// Capacity of the adapter's staging buffer (prefetch buffer on the read
    /// side, output staging buffer on the write side). Must be positive.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            profile: CompressionProfile::default(),
            level: None,
            buffer_size: default_buffer_size(),
        }
    }
}

impl StreamConfig {
    /// A default configuration with an explicit staging buffer capacity.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            ..Self::default()
        }
    }

    /// A default configuration with an explicit engine-native level.
    pub fn with_level(level: i32) -> Self {
        Self {
            level: Some(level),
            ..Self::default()
        }
    }

    /// Checks the invariants an adapter relies on before allocating.
    pub(crate) fn validate(&self) -> Result<(), MuaraError> {
        if self.buffer_size == 0 {
            return Err(MuaraError::Config(
                "buffer_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Helper for `serde` to provide the default staging buffer capacity.
fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}
