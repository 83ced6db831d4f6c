// In: src/engine/mod.rs

//! The engine capability seam.
//!
//! A compression engine is a stateful black box that consumes a bounded input
//! buffer and produces a bounded output buffer per invocation, reporting what
//! it did through a small set of status codes. The adapters in
//! [`crate::stream`] drive an engine exclusively through the traits defined
//! here; they initialize it (the constructor), step it, reset it, and release
//! it (`Drop`), but never inspect its internals.
//!
//! The native C-style API overloads one parameter as both "space available"
//! and "bytes produced". Here a step instead returns explicit counts in
//! [`Step`]; the caller's slices are never aliased or mutated in place beyond
//! the bytes actually written.

pub(crate) mod zlib;
pub(crate) mod zstd;

pub use self::zlib::{ZlibDecoder, ZlibEncoder};
pub use self::zstd::{ZstdDecoder, ZstdEncoder};

//==================================================================================
// I. Status Codes
//==================================================================================

/// The engine-native status code reported after a step.
///
/// This mirrors the return-code set of classic block-step engines. The
/// adapters never branch on these directly; they go through
/// `stream::status::translate`, the single mapping into [`crate::MuaraError`].
#[derive(Debug)]
pub enum EngineStatus {
    /// The step completed and more work is possible.
    Ok,
    /// The logical end of one compressed member was reached.
    StreamEnd,
    /// The engine hit an I/O fault of its own (not the adapter's source or
    /// sink). Propagated with its original `ErrorKind`.
    Io(std::io::Error),
    /// Invariant violation inside the engine: it was driven in a way its
    /// state machine does not allow.
    StreamState(String),
    /// The compressed data is malformed or failed an integrity check.
    Data(String),
    /// The engine could not allocate memory.
    Memory,
    /// The step made no progress because neither buffer had room for it.
    Buffer,
    /// The stream was produced by an engine version we do not support.
    Version(String),
    /// A status code outside the documented set.
    Unknown(i32),
}

/// The result of one bounded engine invocation.
#[derive(Debug)]
pub struct Step {
    /// Bytes consumed from the input slice.
    pub consumed: usize,
    /// Bytes written to the output slice, starting at its beginning.
    pub produced: usize,
    /// What the engine reported about this step.
    pub status: EngineStatus,
}

impl Step {
    /// A step that did nothing but report a status.
    pub(crate) fn stalled(status: EngineStatus) -> Self {
        Step {
            consumed: 0,
            produced: 0,
            status,
        }
    }
}

//==================================================================================
// II. Capability Traits
//==================================================================================

/// A decompression engine: one instance decodes one stream of concatenated
/// members for the lifetime of its owning adapter.
pub trait DecodeEngine {
    /// Decodes up to `output.len()` bytes, consuming up to `input.len()`
    /// bytes from `input`.
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step;

    /// Re-arms the engine for the next member after it reported
    /// [`EngineStatus::StreamEnd`]. Bytes beyond the completed member belong
    /// to the next one and stay with the caller; only engine-internal state
    /// is invalidated.
    fn reset(&mut self) -> EngineStatus;

    /// True while a member is partially decoded. Used by the reader to tell
    /// a truncated stream from a cleanly exhausted one.
    fn pending(&self) -> bool;
}

/// A compression engine: one instance encodes one stream for the lifetime of
/// its owning adapter.
pub trait EncodeEngine {
    /// Encodes up to `input.len()` bytes, writing up to `output.len()` bytes.
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step;

    /// Emits trailing output (footer, checksums). Called repeatedly with no
    /// new input until it reports [`EngineStatus::StreamEnd`]; `consumed` is
    /// always zero.
    fn finish_step(&mut self, output: &mut [u8]) -> Step;
}
