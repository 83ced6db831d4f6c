// In: src/stream/reader.rs

//! The decompression adapter: a pull-based byte stream over a block-step
//! decode engine.
//!
//! On each read the adapter keeps a prefetch buffer of compressed bytes and
//! feeds its live window `buf[pos..len]` to the engine until the caller's
//! buffer is satisfied or the underlying source is exhausted. When the engine
//! reports the end of a member, the adapter resets it in place, so a stream
//! of concatenated members decodes as one contiguous byte sequence without
//! caller intervention. Bytes already pulled but beyond the completed member
//! stay in the window and open the next member.

use std::io::{ErrorKind, Read};

use log::{debug, trace};

use crate::config::StreamConfig;
use crate::engine::{DecodeEngine, ZlibDecoder, ZstdDecoder};
use crate::error::MuaraError;
use crate::stream::status::{self, StepOutcome};

/// A blocking decompressing reader.
///
/// One adapter owns one engine and one prefetch buffer for its entire
/// lifetime. Failures are sticky: the first error is captured and replayed on
/// every later call without touching the engine or the source again.
pub struct StreamReader<R, E = ZlibDecoder> {
    src: R,
    engine: E,
    /// Prefetch buffer, allocated once. `buf[pos..len]` is the live window:
    /// pulled from the source, not yet fed to the engine.
    buf: Box<[u8]>,
    pos: usize,
    len: usize,
    /// The source reported end-of-input.
    src_eof: bool,
    /// End-of-stream was reported to the caller; terminal.
    exhausted: bool,
    /// Completed members, for diagnostics.
    members: u64,
    failed: Option<MuaraError>,
}

impl<R: Read> StreamReader<R, ZlibDecoder> {
    /// Creates a zlib-member reader with the default configuration.
    pub fn new(src: R) -> Result<Self, MuaraError> {
        Self::with_config(src, StreamConfig::default())
    }

    /// Creates a zlib-member reader with an explicit configuration.
    pub fn with_config(src: R, config: StreamConfig) -> Result<Self, MuaraError> {
        Self::with_engine(src, ZlibDecoder::new(), config)
    }
}

impl<R: Read> StreamReader<R, ZstdDecoder> {
    /// Creates a zstd-frame reader with the default configuration.
    pub fn zstd(src: R) -> Result<Self, MuaraError> {
        Self::zstd_with_config(src, StreamConfig::default())
    }

    /// Creates a zstd-frame reader with an explicit configuration.
    pub fn zstd_with_config(src: R, config: StreamConfig) -> Result<Self, MuaraError> {
        Self::with_engine(src, ZstdDecoder::new()?, config)
    }
}

impl<R: Read, E: DecodeEngine> StreamReader<R, E> {
    /// Wraps an already initialized engine. The prefetch buffer is allocated
    /// here, once; its capacity never changes afterwards.
    pub fn with_engine(src: R, engine: E, config: StreamConfig) -> Result<Self, MuaraError> {
        config.validate()?;
        Ok(StreamReader {
            src,
            engine,
            buf: vec![0u8; config.buffer_size].into_boxed_slice(),
            pos: 0,
            len: 0,
            src_eof: false,
            exhausted: false,
            members: 0,
            failed: None,
        })
    }

    /// A shared reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.src
    }

    /// A mutable reference to the underlying source. Reading from it
    /// directly will desynchronize the compressed stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.src
    }

    /// Closes the adapter and hands back the underlying source. A stream
    /// that failed surfaces its captured error; a clean or merely unfinished
    /// stream closes successfully. The engine is released on drop.
    pub fn finish(self) -> Result<R, MuaraError> {
        match self.failed {
            Some(err) => Err(err),
            None => Ok(self.src),
        }
    }

    fn fail(&mut self, err: MuaraError) -> MuaraError {
        debug!("stream reader failed: {}", err);
        self.failed = Some(err.clone());
        err
    }

    /// The read loop. Returns the number of decompressed bytes placed at the
    /// start of `out`; `Ok(0)` for a non-empty `out` means end-of-stream and
    /// nothing else.
    fn read_stream(&mut self, out: &mut [u8]) -> Result<usize, MuaraError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        if out.is_empty() || self.exhausted {
            return Ok(0);
        }

        let mut filled = 0;
        while filled < out.len() {
            // Refill the live window before stepping the engine on it.
            if self.pos == self.len {
                if self.src_eof {
                    if self.engine.pending() {
                        return Err(self.fail(MuaraError::DataCorrupt(
                            "compressed stream ends inside a member".to_string(),
                        )));
                    }
                    self.exhausted = true;
                    break;
                }
                match self.src.read(&mut self.buf) {
                    Ok(0) => {
                        self.src_eof = true;
                        continue;
                    }
                    Ok(n) => {
                        trace!("pulled {} compressed bytes", n);
                        self.pos = 0;
                        self.len = n;
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(self.fail(MuaraError::source_io(e))),
                }
            }

            let step = self.engine.step(&self.buf[self.pos..self.len], &mut out[filled..]);
            debug_assert!(step.consumed <= self.len - self.pos);
            debug_assert!(step.produced <= out.len() - filled);
            self.pos += step.consumed;
            filled += step.produced;

            match status::translate(step.status) {
                Ok(StepOutcome::Running) => {
                    if step.consumed == 0 && step.produced == 0 {
                        return Err(self.fail(MuaraError::StructuralFault(
                            "decode step made no progress with room in both buffers".to_string(),
                        )));
                    }
                }
                Ok(StepOutcome::Complete) => {
                    self.members += 1;
                    stream_metric!("event" = "member_reset", "members" = &self.members);
                    if let Err(err) = status::translate(self.engine.reset()) {
                        return Err(self.fail(err));
                    }
                    // Report what this member yielded; the next call opens
                    // the next member from the preserved window. With
                    // nothing yielded yet, keep going instead: a bare
                    // `Ok(0)` would read as end-of-stream.
                    if filled > 0 {
                        break;
                    }
                }
                Ok(StepOutcome::Stalled) => {
                    return Err(self.fail(MuaraError::StructuralFault(
                        "decode step stalled with room in both buffers".to_string(),
                    )));
                }
                Err(err) => return Err(self.fail(err)),
            }
        }
        Ok(filled)
    }
}

impl<R: Read, E: DecodeEngine> Read for StreamReader<R, E> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.read_stream(buf).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineStatus, Step};
    use std::io::Cursor;

    /// Compresses `payload` into one zlib member using the crate's own writer.
    fn compress(payload: &[u8]) -> Vec<u8> {
        use std::io::Write;
        let mut writer = crate::stream::StreamWriter::new(Vec::new()).unwrap();
        writer.write_all(payload).unwrap();
        writer.finish().unwrap()
    }

    /// A source that yields its data in fixed-size slivers, then errors once
    /// primed to do so.
    struct ChunkedSource {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
        reads: usize,
        fail_after: Option<usize>,
    }

    impl ChunkedSource {
        fn new(data: Vec<u8>, chunk: usize) -> Self {
            ChunkedSource {
                data,
                pos: 0,
                chunk,
                reads: 0,
                fail_after: None,
            }
        }
    }

    impl Read for ChunkedSource {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.reads += 1;
            if let Some(limit) = self.fail_after {
                if self.reads > limit {
                    return Err(std::io::Error::new(ErrorKind::BrokenPipe, "source gone"));
                }
            }
            let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_reads_across_tiny_source_chunks() {
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let compressed = compress(&payload);

        let src = ChunkedSource::new(compressed, 7);
        let mut reader =
            StreamReader::with_config(src, StreamConfig::with_buffer_size(64)).unwrap();
        let mut decoded = Vec::new();
        reader.read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, payload);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_zero_length_reads_are_not_progress() {
        let compressed = compress(b"zero length reads");
        let mut reader = StreamReader::new(Cursor::new(compressed)).unwrap();

        let mut nothing = [0u8; 0];
        assert_eq!(reader.read(&mut nothing).unwrap(), 0);
        assert_eq!(reader.read(&mut nothing).unwrap(), 0);

        let mut decoded = Vec::new();
        reader.read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, b"zero length reads");
    }

    #[test]
    fn test_end_of_stream_is_stable() {
        let compressed = compress(b"eof");
        let mut reader = StreamReader::new(Cursor::new(compressed)).unwrap();
        let mut decoded = Vec::new();
        reader.read_to_end(&mut decoded).unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_source_error_is_sticky_and_source_untouched_after() {
        // Incompressible payload, so the compressed stream spans many pulls.
        let mut x = 1u32;
        let payload: Vec<u8> = (0..200_000)
            .map(|_| {
                x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (x >> 24) as u8
            })
            .collect();
        let compressed = compress(&payload);
        let mut src = ChunkedSource::new(compressed, 512);
        src.fail_after = Some(3);

        let mut reader =
            StreamReader::with_config(src, StreamConfig::with_buffer_size(512)).unwrap();
        let mut sink = Vec::new();
        let first = reader.read_to_end(&mut sink).unwrap_err();
        assert_eq!(first.kind(), ErrorKind::BrokenPipe);
        let reads_at_failure = reader.get_ref().reads;

        // Every later call replays the identical error without a pull.
        let mut buf = [0u8; 64];
        let replay = reader.read(&mut buf).unwrap_err();
        assert_eq!(replay.kind(), ErrorKind::BrokenPipe);
        assert_eq!(reader.get_ref().reads, reads_at_failure);

        // Close surfaces the captured error too.
        assert!(matches!(reader.finish(), Err(MuaraError::SourceIo(_))));
    }

    #[test]
    fn test_truncated_member_is_data_corruption() {
        let compressed = compress(b"this member will be cut short, well before its checksum");
        let truncated = compressed[..compressed.len() - 6].to_vec();

        let mut reader = StreamReader::new(Cursor::new(truncated)).unwrap();
        let mut decoded = Vec::new();
        let err = reader.read_to_end(&mut decoded).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(matches!(reader.finish(), Err(MuaraError::DataCorrupt(_))));
    }

    #[test]
    fn test_corrupt_input_is_data_corruption() {
        let mut compressed = compress(b"flip a byte in the deflate body and the crc disagrees");
        let mid = compressed.len() / 2;
        compressed[mid] ^= 0x55;

        let mut reader = StreamReader::new(Cursor::new(compressed)).unwrap();
        let mut decoded = Vec::new();
        let err = reader.read_to_end(&mut decoded).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    /// An engine that claims progress is possible but never makes any:
    /// the adapter must refuse to spin and report a structural fault.
    struct StuckEngine;

    impl DecodeEngine for StuckEngine {
        fn step(&mut self, _input: &[u8], _output: &mut [u8]) -> Step {
            Step {
                consumed: 0,
                produced: 0,
                status: EngineStatus::Ok,
            }
        }
        fn reset(&mut self) -> EngineStatus {
            EngineStatus::Ok
        }
        fn pending(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_stuck_engine_is_a_structural_fault() {
        let mut reader = StreamReader::with_engine(
            Cursor::new(vec![1u8; 32]),
            StuckEngine,
            StreamConfig::default(),
        )
        .unwrap();
        let mut buf = [0u8; 16];
        let err = reader.read_stream(&mut buf).unwrap_err();
        assert!(matches!(err, MuaraError::StructuralFault(_)));
        // And it sticks.
        assert!(matches!(
            reader.read_stream(&mut buf),
            Err(MuaraError::StructuralFault(_))
        ));
    }

    #[test]
    fn test_unknown_engine_code_is_captured_raw() {
        struct UnknownCodeEngine;
        impl DecodeEngine for UnknownCodeEngine {
            fn step(&mut self, _input: &[u8], _output: &mut [u8]) -> Step {
                Step::stalled(EngineStatus::Unknown(-9))
            }
            fn reset(&mut self) -> EngineStatus {
                EngineStatus::Ok
            }
            fn pending(&self) -> bool {
                false
            }
        }

        let mut reader = StreamReader::with_engine(
            Cursor::new(vec![1u8; 8]),
            UnknownCodeEngine,
            StreamConfig::default(),
        )
        .unwrap();
        let mut buf = [0u8; 8];
        match reader.read_stream(&mut buf) {
            Err(MuaraError::Internal { code }) => assert_eq!(code, -9),
            other => panic!("expected Internal, got {:?}", other),
        }
    }
}
