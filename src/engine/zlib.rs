// In: src/engine/zlib.rs

//! The default engine family: zlib-format members over `flate2`'s low-level
//! stateful codecs.
//!
//! `flate2` reports cumulative totals rather than per-call counts, so each
//! step derives `consumed`/`produced` from the `total_in`/`total_out` deltas.
//! The codecs hold no unconsumed input between steps; whatever a step did not
//! consume stays in the adapter's live window.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::config::{CompressionProfile, StreamConfig};
use crate::engine::{DecodeEngine, EncodeEngine, EngineStatus, Step};
use crate::error::MuaraError;

/// zlib levels are 0..=9; anything else is a configuration error, caught at
/// construction the way the native engine rejects a bad `deflateInit2` level.
const LEVEL_RANGE: std::ops::RangeInclusive<i32> = 0..=9;

fn map_status(status: Status) -> EngineStatus {
    match status {
        Status::Ok => EngineStatus::Ok,
        Status::StreamEnd => EngineStatus::StreamEnd,
        Status::BufError => EngineStatus::Buffer,
    }
}

//==================================================================================
// I. Decoder
//==================================================================================

/// Decodes zlib-format members. Default engine of [`crate::StreamReader`].
pub struct ZlibDecoder {
    raw: Decompress,
    mid_member: bool,
}

impl ZlibDecoder {
    pub fn new() -> Self {
        ZlibDecoder {
            raw: Decompress::new(true),
            mid_member: false,
        }
    }
}

impl Default for ZlibDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeEngine for ZlibDecoder {
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step {
        let in_before = self.raw.total_in();
        let out_before = self.raw.total_out();
        match self.raw.decompress(input, output, FlushDecompress::None) {
            Ok(status) => {
                let consumed = (self.raw.total_in() - in_before) as usize;
                let produced = (self.raw.total_out() - out_before) as usize;
                self.mid_member = match status {
                    Status::StreamEnd => false,
                    _ => self.mid_member || consumed > 0,
                };
                Step {
                    consumed,
                    produced,
                    status: map_status(status),
                }
            }
            Err(e) => Step::stalled(EngineStatus::Data(e.to_string())),
        }
    }

    fn reset(&mut self) -> EngineStatus {
        self.raw.reset(true);
        self.mid_member = false;
        EngineStatus::Ok
    }

    fn pending(&self) -> bool {
        self.mid_member
    }
}

//==================================================================================
// II. Encoder
//==================================================================================

/// Encodes one zlib-format member. Default engine of [`crate::StreamWriter`].
pub struct ZlibEncoder {
    raw: Compress,
}

impl ZlibEncoder {
    /// Builds an encoder for the given configuration. An explicit `level`
    /// overrides the profile; out-of-range levels are rejected here rather
    /// than surfacing later as an engine fault.
    pub fn new(config: &StreamConfig) -> Result<Self, MuaraError> {
        let level = match config.level {
            Some(level) => {
                if !LEVEL_RANGE.contains(&level) {
                    return Err(MuaraError::Config(format!(
                        "zlib level {} outside {:?}",
                        level, LEVEL_RANGE
                    )));
                }
                Compression::new(level as u32)
            }
            None => match config.profile {
                CompressionProfile::Fast => Compression::fast(),
                CompressionProfile::Balanced => Compression::default(),
                CompressionProfile::HighCompression => Compression::best(),
            },
        };
        Ok(ZlibEncoder {
            raw: Compress::new(level, true),
        })
    }
}

impl EncodeEngine for ZlibEncoder {
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step {
        let in_before = self.raw.total_in();
        let out_before = self.raw.total_out();
        match self.raw.compress(input, output, FlushCompress::None) {
            Ok(status) => Step {
                consumed: (self.raw.total_in() - in_before) as usize,
                produced: (self.raw.total_out() - out_before) as usize,
                status: map_status(status),
            },
            Err(e) => Step::stalled(EngineStatus::StreamState(e.to_string())),
        }
    }

    fn finish_step(&mut self, output: &mut [u8]) -> Step {
        let out_before = self.raw.total_out();
        match self.raw.compress(&[], output, FlushCompress::Finish) {
            Ok(status) => Step {
                consumed: 0,
                produced: (self.raw.total_out() - out_before) as usize,
                status: map_status(status),
            },
            Err(e) => Step::stalled(EngineStatus::StreamState(e.to_string())),
        }
    }
}

//==================================================================================
// III. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_member(payload: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(&StreamConfig::default()).unwrap();
        let mut out = vec![0u8; payload.len() + 1024];
        let mut compressed = Vec::new();

        let mut input = payload;
        loop {
            let step = encoder.step(input, &mut out);
            assert!(matches!(step.status, EngineStatus::Ok));
            compressed.extend_from_slice(&out[..step.produced]);
            input = &input[step.consumed..];
            if input.is_empty() {
                break;
            }
        }
        loop {
            let step = encoder.finish_step(&mut out);
            compressed.extend_from_slice(&out[..step.produced]);
            match step.status {
                EngineStatus::StreamEnd => break,
                EngineStatus::Ok => continue,
                other => panic!("unexpected finish status {:?}", other),
            }
        }
        compressed
    }

    #[test]
    fn test_step_reports_explicit_counts() {
        let payload = b"the quick brown fox jumps over the lazy dog";
        let compressed = encode_member(payload);
        assert!(!compressed.is_empty());

        let mut decoder = ZlibDecoder::new();
        let mut out = vec![0u8; 256];
        let step = decoder.step(&compressed, &mut out);
        assert_eq!(step.consumed, compressed.len());
        assert!(matches!(step.status, EngineStatus::StreamEnd));
        assert_eq!(&out[..step.produced], payload.as_slice());
    }

    #[test]
    fn test_pending_tracks_member_progress() {
        let compressed = encode_member(b"partial member tracking");
        let mut decoder = ZlibDecoder::new();
        assert!(!decoder.pending());

        // Feed only half the member: a member is now in flight.
        let mut out = vec![0u8; 256];
        let half = compressed.len() / 2;
        decoder.step(&compressed[..half], &mut out);
        assert!(decoder.pending());

        // Finishing the member clears the flag.
        let step = decoder.step(&compressed[half..], &mut out);
        assert!(matches!(step.status, EngineStatus::StreamEnd));
        assert!(!decoder.pending());
    }

    #[test]
    fn test_reset_rearms_for_a_new_member() {
        let compressed = encode_member(b"first");
        let mut decoder = ZlibDecoder::new();
        let mut out = vec![0u8; 64];
        let step = decoder.step(&compressed, &mut out);
        assert!(matches!(step.status, EngineStatus::StreamEnd));

        assert!(matches!(decoder.reset(), EngineStatus::Ok));
        let second = encode_member(b"second");
        let step = decoder.step(&second, &mut out);
        assert!(matches!(step.status, EngineStatus::StreamEnd));
        assert_eq!(&out[..step.produced], b"second");
    }

    #[test]
    fn test_garbage_input_reports_data_status() {
        let mut decoder = ZlibDecoder::new();
        let mut out = vec![0u8; 64];
        // 0xff 0xff can never open a zlib member.
        let step = decoder.step(&[0xff, 0xff, 0xff, 0xff], &mut out);
        assert!(matches!(step.status, EngineStatus::Data(_)));
    }

    #[test]
    fn test_out_of_range_level_is_rejected() {
        let config = StreamConfig::with_level(42);
        assert!(matches!(
            ZlibEncoder::new(&config),
            Err(MuaraError::Config(_))
        ));
    }
}
