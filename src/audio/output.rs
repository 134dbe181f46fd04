use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use super::error::AudioError;

/// Control surface of the audio backend. The playback loop and the
/// volume monitor only ever talk to this trait; `RodioOutput` is the
/// production backend, tests substitute their own.
pub trait AudioOutput: Send + Sync {
    /// Decode `path` and make it the active track. Any previously loaded
    /// track is stopped and discarded.
    fn load(&self, path: &Path) -> Result<(), AudioError>;
    fn pause(&self);
    fn resume(&self);
    fn stop(&self);
    /// True while the loaded track still has queued audio.
    fn is_busy(&self) -> bool;
    fn set_volume(&self, level: f32);
}

/// One persistent sink fed one decoded track at a time. The output
/// stream is not `Send` and stays with the caller for the process
/// lifetime.
pub struct RodioOutput {
    sink: Sink,
}

impl RodioOutput {
    pub fn open_stream() -> Result<OutputStream, AudioError> {
        OutputStreamBuilder::open_default_stream().map_err(|e| AudioError::Device(e.to_string()))
    }

    pub fn new(stream: &OutputStream) -> Self {
        Self {
            sink: Sink::connect_new(stream.mixer()),
        }
    }
}

impl AudioOutput for RodioOutput {
    fn load(&self, path: &Path) -> Result<(), AudioError> {
        let file = File::open(path).map_err(|e| AudioError::Io(e.to_string()))?;
        let source = Decoder::builder()
            .with_data(BufReader::new(file))
            .with_gapless(true)
            .build()
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        self.sink.stop();
        self.sink.append(source);
        self.sink.play();
        Ok(())
    }

    fn pause(&self) {
        self.sink.pause();
    }

    fn resume(&self) {
        self.sink.play();
    }

    fn stop(&self) {
        self.sink.stop();
    }

    fn is_busy(&self) -> bool {
        !self.sink.empty()
    }

    fn set_volume(&self, level: f32) {
        self.sink.set_volume(level.clamp(0.0, 1.0));
    }
}
