// In: src/error.rs

//! This module defines the single, unified error type for the entire muara library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! The enum is `Clone` on purpose: a failed adapter captures its first error
//! and replays it verbatim on every later call, so the stored value must be
//! reproducible. I/O payloads are therefore held behind `Arc`.

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum MuaraError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// The compressed input is malformed or fails its integrity checks.
    #[error("corrupt compressed data: {0}")]
    DataCorrupt(String),

    /// The adapter and the engine disagree about stream state. This is a
    /// programming or integration bug, never a data problem, and the adapter
    /// that raised it is unusable from then on.
    #[error("structural fault (this is a bug): {0}")]
    StructuralFault(String),

    /// The engine could not allocate the memory it needs.
    #[error("engine resources exhausted: {0}")]
    ResourceExhausted(String),

    /// The compressed stream requires an engine version we do not have.
    #[error("unsupported stream: {0}")]
    Unsupported(String),

    /// An engine status code outside the documented set. The raw code is
    /// captured for diagnostics.
    #[error("internal error: unknown engine status code {code}")]
    Internal { code: i32 },

    /// Invalid adapter configuration (e.g. a zero buffer size).
    #[error("invalid configuration: {0}")]
    Config(String),

    // =========================================================================
    // === External Error Wrappers
    // =========================================================================
    /// An error reported by the underlying byte source while prefetching.
    /// The payload sits behind `Arc` purely so the enum stays `Clone`.
    #[error("source I/O error: {0}")]
    SourceIo(Arc<std::io::Error>),

    /// An error reported by the underlying byte sink while flushing.
    #[error("sink I/O error: {0}")]
    SinkIo(Arc<std::io::Error>),

    /// An I/O fault reported by the engine itself, propagated with its
    /// original `ErrorKind`.
    #[error("engine I/O error: {0}")]
    EngineIo(Arc<std::io::Error>),
}

impl MuaraError {
    /// Wraps a source-side pull failure.
    pub(crate) fn source_io(err: std::io::Error) -> Self {
        MuaraError::SourceIo(Arc::new(err))
    }

    /// Wraps a sink-side push failure.
    pub(crate) fn sink_io(err: std::io::Error) -> Self {
        MuaraError::SinkIo(Arc::new(err))
    }

    /// The `std::io::ErrorKind` this error should surface as on the
    /// `Read`/`Write` trait boundary.
    fn io_kind(&self) -> std::io::ErrorKind {
        use std::io::ErrorKind;
        match self {
            MuaraError::DataCorrupt(_) => ErrorKind::InvalidData,
            MuaraError::Unsupported(_) => ErrorKind::Unsupported,
            MuaraError::ResourceExhausted(_) => ErrorKind::OutOfMemory,
            MuaraError::Config(_) => ErrorKind::InvalidInput,
            MuaraError::SourceIo(e) | MuaraError::SinkIo(e) | MuaraError::EngineIo(e) => e.kind(),
            MuaraError::StructuralFault(_) | MuaraError::Internal { .. } => ErrorKind::Other,
        }
    }
}

// The adapters implement `std::io::Read`/`Write`, so the crate error must
// cross that boundary without losing the underlying `ErrorKind`.
impl From<MuaraError> for std::io::Error {
    fn from(err: MuaraError) -> Self {
        std::io::Error::new(err.io_kind(), err)
    }
}
