// In: src/stream/writer.rs

//! The compression adapter: a push-based byte sink over a block-step encode
//! engine.
//!
//! On each write the adapter steps the engine with the caller's bytes,
//! staging engine output in a fixed buffer and pushing every produced tranche
//! to the underlying sink. A completely filled staging buffer is the signal
//! that the engine may be holding more output for input it already consumed,
//! so the adapter keeps stepping without new input until the engine falls
//! behind the buffer again. Closing drains the trailing output (footer,
//! checksums) the same way.

use std::io::Write;

use log::{debug, trace};

use crate::config::StreamConfig;
use crate::engine::{EncodeEngine, ZlibEncoder, ZstdEncoder};
use crate::error::MuaraError;
use crate::stream::status::{self, StepOutcome};

/// A blocking compressing writer.
///
/// The write contract is all-or-error: a successful call means every input
/// byte was accepted by the engine and every byte the engine produced reached
/// the sink. Failures are sticky, and closing consumes the adapter, so the
/// trailing drain can run at most once.
pub struct StreamWriter<W, E = ZlibEncoder> {
    sink: W,
    engine: E,
    /// Output staging buffer, allocated once; capacity fixed for life.
    buf: Box<[u8]>,
    failed: Option<MuaraError>,
}

impl<W: Write> StreamWriter<W, ZlibEncoder> {
    /// Creates a zlib-member writer with the default configuration.
    pub fn new(sink: W) -> Result<Self, MuaraError> {
        Self::with_config(sink, StreamConfig::default())
    }

    /// Creates a zlib-member writer with an explicit configuration.
    pub fn with_config(sink: W, config: StreamConfig) -> Result<Self, MuaraError> {
        let engine = ZlibEncoder::new(&config)?;
        Self::with_engine(sink, engine, config)
    }
}

impl<W: Write> StreamWriter<W, ZstdEncoder> {
    /// Creates a zstd-frame writer with the default configuration.
    pub fn zstd(sink: W) -> Result<Self, MuaraError> {
        Self::zstd_with_config(sink, StreamConfig::default())
    }

    /// Creates a zstd-frame writer with an explicit configuration.
    pub fn zstd_with_config(sink: W, config: StreamConfig) -> Result<Self, MuaraError> {
        let engine = ZstdEncoder::new(&config)?;
        Self::with_engine(sink, engine, config)
    }
}

impl<W: Write, E: EncodeEngine> StreamWriter<W, E> {
    /// Wraps an already initialized engine.
    pub fn with_engine(sink: W, engine: E, config: StreamConfig) -> Result<Self, MuaraError> {
        config.validate()?;
        Ok(StreamWriter {
            sink,
            engine,
            buf: vec![0u8; config.buffer_size].into_boxed_slice(),
            failed: None,
        })
    }

    /// A shared reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// A mutable reference to the underlying sink. Writing to it directly
    /// will corrupt the compressed stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    fn fail(&mut self, err: MuaraError) -> MuaraError {
        debug!("stream writer failed: {}", err);
        self.failed = Some(err.clone());
        err
    }

    /// Pushes the first `n` staged bytes to the sink. The sink contract is
    /// full acceptance or an error; a sink that accepts nothing surfaces as
    /// `WriteZero` through `write_all`.
    fn push(&mut self, n: usize) -> Result<(), MuaraError> {
        if n == 0 {
            return Ok(());
        }
        trace!("flushing {} compressed bytes", n);
        if let Err(e) = self.sink.write_all(&self.buf[..n]) {
            return Err(self.fail(MuaraError::sink_io(e)));
        }
        Ok(())
    }

    /// The write loop. Accepts all of `input` or fails with nothing counted
    /// as accepted.
    fn write_stream(&mut self, input: &[u8]) -> Result<(), MuaraError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        if input.is_empty() {
            return Ok(());
        }

        let mut input = input;
        loop {
            let step = self.engine.step(input, &mut self.buf);
            let outcome = match status::translate(step.status) {
                Ok(outcome) => outcome,
                Err(err) => return Err(self.fail(err)),
            };
            debug_assert!(step.consumed <= input.len());
            input = &input[step.consumed..];
            self.push(step.produced)?;

            match outcome {
                StepOutcome::Running => {
                    // A full staging buffer means more output may be pending
                    // for input the engine already swallowed; anything less
                    // with no input left means this call is done.
                    if input.is_empty() && step.produced < self.buf.len() {
                        break;
                    }
                    if step.consumed == 0 && step.produced == 0 {
                        return Err(self.fail(MuaraError::StructuralFault(
                            "encode step made no progress with room in both buffers".to_string(),
                        )));
                    }
                }
                StepOutcome::Stalled => {
                    if input.is_empty() {
                        // Nothing pending inside the engine; drain complete.
                        break;
                    }
                    return Err(self.fail(MuaraError::StructuralFault(
                        "encode step stalled with input remaining".to_string(),
                    )));
                }
                StepOutcome::Complete => {
                    return Err(self.fail(MuaraError::StructuralFault(
                        "engine ended the stream during a write".to_string(),
                    )));
                }
            }
        }
        Ok(())
    }

    /// Closes the stream: drains the engine's trailing output into the sink
    /// and hands the sink back. Consuming `self` makes a second close
    /// unrepresentable.
    pub fn finish(mut self) -> Result<W, MuaraError> {
        if let Some(err) = self.failed.take() {
            return Err(err);
        }
        let mut tranches = 0u64;
        loop {
            let step = self.engine.finish_step(&mut self.buf);
            let outcome = status::translate(step.status)?;
            if step.produced > 0 {
                self.sink
                    .write_all(&self.buf[..step.produced])
                    .map_err(MuaraError::sink_io)?;
            }
            tranches += 1;
            match outcome {
                StepOutcome::Complete => break,
                StepOutcome::Running => {
                    if step.produced == 0 {
                        return Err(MuaraError::StructuralFault(
                            "finish step produced nothing while claiming more output is pending"
                                .to_string(),
                        ));
                    }
                }
                StepOutcome::Stalled => {
                    return Err(MuaraError::StructuralFault(
                        "finish step stalled with room in the staging buffer".to_string(),
                    ));
                }
            }
        }
        stream_metric!("event" = "finish", "tranches" = &tranches);
        debug!("compressed stream finished");
        Ok(self.sink)
    }
}

impl<W: Write, E: EncodeEngine> Write for StreamWriter<W, E> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_stream(buf)?;
        Ok(buf.len())
    }

    /// Flushes the sink only. Bytes still buffered inside the engine are
    /// emitted by [`StreamWriter::finish`]; there is no mid-stream engine
    /// flush in this container protocol.
    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(err) = &self.failed {
            return Err(err.clone().into());
        }
        match self.sink.flush() {
            Ok(()) => Ok(()),
            Err(e) => {
                let err = self.fail(MuaraError::sink_io(e));
                Err(err.into())
            }
        }
    }
}
