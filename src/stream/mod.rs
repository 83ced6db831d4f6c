// In: src/stream/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Stream Layer
// ====================================================================================
//
// The `stream` layer is the public-facing API of the muara library. It turns a
// block-step engine ("call me repeatedly with bounded buffers, and I'll tell
// you how much I consumed and produced") into ordinary blocking byte-stream
// I/O. The hard part lives here: buffering, flow control, end-of-stream
// detection, member restarts, and faithful error propagation. The engines
// themselves stay behind the traits in `crate::engine`.
//
// Data Flow (Decompression):
//
//   1. [StreamReader::read]            -> caller hands in an output buffer
//         |
//         `-> pulls compressed bytes from the underlying source into the
//             prefetch buffer whenever the live window runs empty
//         |
//   2. [DecodeEngine::step]            -> consumes from the live window,
//         |                               produces into the caller's buffer
//         `-> on member end: engine reset, leftover window bytes carry over
//             to the next member
//
// Data Flow (Compression):
//
//   1. [StreamWriter::write]           -> caller hands in an input buffer
//         |
//   2. [EncodeEngine::step]            -> consumes caller bytes, produces
//         |                               into the output staging buffer
//         `-> every produced tranche is pushed to the underlying sink; a
//             completely filled staging buffer forces another step (the
//             drain loop) until the engine falls behind the buffer again
//   3. [StreamWriter::finish]          -> finish-steps the engine until the
//                                         trailing output is fully emitted
//
// Both directions share one rule for engine status codes: they pass through
// `status::translate`, nowhere else.
//
// ====================================================================================
pub(crate) mod status;

mod reader;
mod writer;

pub use reader::StreamReader;
pub use writer::StreamWriter;
