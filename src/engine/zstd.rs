// In: src/engine/zstd.rs

//! The zstd engine family, over `zstd::stream::raw`.
//!
//! The raw operations already speak the step protocol: `run_on_buffers`
//! reports explicit read/written counts plus a `remaining` hint, where zero
//! `remaining` on the decode side marks the exact end of a frame. Frames play
//! the role of members; concatenated frames decode through the same
//! reset-and-continue path as zlib members.
//!
//! The raw layer surfaces every engine fault as an `std::io::Error` built
//! from a zstd error code. On the decode side those are data-level problems
//! (malformed or truncated frames); on the encode side, with sound arguments,
//! they can only mean the engine state machine was misdriven.

use zstd::stream::raw::{Decoder, Encoder, Operation, OutBuffer};

use crate::config::{CompressionProfile, StreamConfig};
use crate::engine::{DecodeEngine, EncodeEngine, EngineStatus, Step};
use crate::error::MuaraError;

//==================================================================================
// I. Decoder
//==================================================================================

/// Decodes concatenated zstd frames.
pub struct ZstdDecoder {
    raw: Decoder<'static>,
    mid_frame: bool,
}

impl ZstdDecoder {
    /// Creation allocates a decompression context; failure there is a
    /// resource problem and surfaces immediately.
    pub fn new() -> Result<Self, MuaraError> {
        let raw = Decoder::new().map_err(|e| MuaraError::ResourceExhausted(e.to_string()))?;
        Ok(ZstdDecoder {
            raw,
            mid_frame: false,
        })
    }
}

impl DecodeEngine for ZstdDecoder {
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step {
        match self.raw.run_on_buffers(input, output) {
            Ok(status) => {
                let engine_status = if status.remaining == 0 {
                    self.mid_frame = false;
                    EngineStatus::StreamEnd
                } else if status.bytes_read == 0 && status.bytes_written == 0 {
                    EngineStatus::Buffer
                } else {
                    self.mid_frame = self.mid_frame || status.bytes_read > 0;
                    EngineStatus::Ok
                };
                Step {
                    consumed: status.bytes_read,
                    produced: status.bytes_written,
                    status: engine_status,
                }
            }
            Err(e) => Step::stalled(EngineStatus::Data(e.to_string())),
        }
    }

    fn reset(&mut self) -> EngineStatus {
        match self.raw.reinit() {
            Ok(()) => {
                self.mid_frame = false;
                EngineStatus::Ok
            }
            Err(e) => EngineStatus::Io(e),
        }
    }

    fn pending(&self) -> bool {
        self.mid_frame
    }
}

//==================================================================================
// II. Encoder
//==================================================================================

/// Encodes one zstd frame.
pub struct ZstdEncoder {
    raw: Encoder<'static>,
}

impl ZstdEncoder {
    /// Builds an encoder for the given configuration. An explicit `level`
    /// overrides the profile; the range check uses the level span the linked
    /// zstd build advertises.
    pub fn new(config: &StreamConfig) -> Result<Self, MuaraError> {
        let level = match config.level {
            Some(level) => {
                let range = zstd::compression_level_range();
                if level != 0 && !range.contains(&level) {
                    return Err(MuaraError::Config(format!(
                        "zstd level {} outside {:?}",
                        level, range
                    )));
                }
                level
            }
            None => match config.profile {
                CompressionProfile::Fast => 1,
                CompressionProfile::Balanced => zstd::DEFAULT_COMPRESSION_LEVEL,
                CompressionProfile::HighCompression => 19,
            },
        };
        let raw = Encoder::new(level).map_err(|e| MuaraError::ResourceExhausted(e.to_string()))?;
        Ok(ZstdEncoder { raw })
    }
}

impl EncodeEngine for ZstdEncoder {
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step {
        match self.raw.run_on_buffers(input, output) {
            Ok(status) => {
                let engine_status = if status.bytes_read == 0 && status.bytes_written == 0 {
                    EngineStatus::Buffer
                } else {
                    EngineStatus::Ok
                };
                Step {
                    consumed: status.bytes_read,
                    produced: status.bytes_written,
                    status: engine_status,
                }
            }
            Err(e) => Step::stalled(EngineStatus::StreamState(e.to_string())),
        }
    }

    fn finish_step(&mut self, output: &mut [u8]) -> Step {
        let mut out = OutBuffer::around(output);
        match self.raw.finish(&mut out, true) {
            Ok(remaining) => Step {
                consumed: 0,
                produced: out.pos(),
                status: if remaining == 0 {
                    EngineStatus::StreamEnd
                } else {
                    EngineStatus::Ok
                },
            },
            Err(e) => Step::stalled(EngineStatus::StreamState(e.to_string())),
        }
    }
}

//==================================================================================
// III. Unit Tests
//==================================================================================
