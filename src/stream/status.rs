// In: src/stream/status.rs

//! The single mapping from engine-native status codes to the library's error
//! taxonomy.
//!
//! This is a pure function over a fixed table: no shared state, trivially
//! testable, thread-safe by construction. Both adapters route every status
//! they see through here; nothing else in the crate interprets an
//! [`EngineStatus`].

use crate::engine::EngineStatus;
use crate::error::MuaraError;
use std::sync::Arc;

/// What a successfully translated step means for the driving loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// The step completed; more work is possible.
    Running,
    /// The logical end of one compressed member. The read loop resets the
    /// engine and carries on; the close loop on the write side terminates.
    Complete,
    /// The engine made no progress because it had no room to make any.
    /// Never surfaced to the end caller: a loop that sees this after it
    /// correctly established that both buffers had room has hit a stuck
    /// engine, which is a [`MuaraError::StructuralFault`].
    Stalled,
}

/// Translates one engine status code.
pub(crate) fn translate(status: EngineStatus) -> Result<StepOutcome, MuaraError> {
    match status {
        EngineStatus::Ok => Ok(StepOutcome::Running),
        EngineStatus::StreamEnd => Ok(StepOutcome::Complete),
        EngineStatus::Buffer => Ok(StepOutcome::Stalled),
        EngineStatus::Io(e) => Err(MuaraError::EngineIo(Arc::new(e))),
        EngineStatus::StreamState(msg) => Err(MuaraError::StructuralFault(msg)),
        EngineStatus::Data(msg) => Err(MuaraError::DataCorrupt(msg)),
        EngineStatus::Memory => Err(MuaraError::ResourceExhausted(
            "engine allocation failure".to_string(),
        )),
        EngineStatus::Version(msg) => Err(MuaraError::Unsupported(msg)),
        EngineStatus::Unknown(code) => Err(MuaraError::Internal { code }),
    }
}
