//! Microphone capability.
//!
//! The flow controller only sees [`MediaCapability`] and [`Recorder`]. Two
//! implementations ship here: [`PcmCapability`], backed by a host-provided
//! PCM stream and encoded to WAV, and [`UnavailableCapability`] for hosts
//! without a microphone (and for tests).

use std::io::Cursor;
use std::sync::Arc;

use hound::{SampleFormat, WavSpec, WavWriter};
use moca_core::BoxFuture;
use moca_core::models::media::AudioClip;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::DeviceError;

/// Something that can hand out a microphone recorder.
pub trait MediaCapability: Send + Sync {
    /// Acquire the microphone. May suspend while the host asks the user for
    /// permission.
    fn acquire_microphone(&self) -> BoxFuture<'_, Result<Box<dyn Recorder>, DeviceError>>;
}

/// An acquired microphone stream.
pub trait Recorder: Send {
    fn start(&mut self) -> Result<(), DeviceError>;

    fn is_recording(&self) -> bool;

    /// Stop recording, flush buffered audio, release the device stream and
    /// return the encoded clip.
    fn finish(&mut self) -> BoxFuture<'_, Result<AudioClip, DeviceError>>;

    /// Discard buffered audio and release the device stream.
    fn release(&mut self) -> BoxFuture<'_, ()>;
}

/// Capability for hosts with no usable microphone.
#[derive(Debug, Clone)]
pub struct UnavailableCapability {
    reason: String,
}

impl UnavailableCapability {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl MediaCapability for UnavailableCapability {
    fn acquire_microphone(&self) -> BoxFuture<'_, Result<Box<dyn Recorder>, DeviceError>> {
        Box::pin(async move { Err(DeviceError::Unavailable(self.reason.clone())) })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
        }
    }
}

/// Opens the host's input device and returns the receiving end of its
/// interleaved 16-bit sample stream. Dropping the receiver tells the host
/// to stop the device.
pub type OpenStream =
    dyn Fn() -> Result<mpsc::UnboundedReceiver<Vec<i16>>, DeviceError> + Send + Sync;

/// Microphone backed by a host PCM stream.
#[derive(Clone)]
pub struct PcmCapability {
    format: PcmFormat,
    open: Arc<OpenStream>,
}

impl PcmCapability {
    pub fn new<F>(format: PcmFormat, open: F) -> Self
    where
        F: Fn() -> Result<mpsc::UnboundedReceiver<Vec<i16>>, DeviceError> + Send + Sync + 'static,
    {
        Self {
            format,
            open: Arc::new(open),
        }
    }
}

impl MediaCapability for PcmCapability {
    fn acquire_microphone(&self) -> BoxFuture<'_, Result<Box<dyn Recorder>, DeviceError>> {
        Box::pin(async move {
            let stream = (self.open)()?;
            info!(
                sample_rate = self.format.sample_rate,
                channels = self.format.channels,
                "microphone acquired"
            );
            Ok(Box::new(PcmRecorder::new(self.format, stream)) as Box<dyn Recorder>)
        })
    }
}

pub struct PcmRecorder {
    format: PcmFormat,
    stream: Option<mpsc::UnboundedReceiver<Vec<i16>>>,
    samples: Vec<i16>,
    recording: bool,
}

impl PcmRecorder {
    pub fn new(format: PcmFormat, stream: mpsc::UnboundedReceiver<Vec<i16>>) -> Self {
        Self {
            format,
            stream: Some(stream),
            samples: Vec::new(),
            recording: false,
        }
    }

    /// Pull everything the host has pushed so far.
    fn drain(&mut self) -> Vec<i16> {
        let mut drained = Vec::new();
        if let Some(stream) = self.stream.as_mut() {
            while let Ok(chunk) = stream.try_recv() {
                drained.extend_from_slice(&chunk);
            }
        }
        drained
    }

    fn close_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
        }
    }

    fn encode(&self) -> Result<Vec<u8>, DeviceError> {
        let spec = WavSpec {
            channels: self.format.channels,
            sample_rate: self.format.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(cursor.into_inner())
    }
}

impl Recorder for PcmRecorder {
    fn start(&mut self) -> Result<(), DeviceError> {
        if self.stream.is_none() {
            return Err(DeviceError::Stream("stream already released".into()));
        }
        // Audio captured before the start belongs to nobody.
        self.drain();
        self.samples.clear();
        self.recording = true;
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn finish(&mut self) -> BoxFuture<'_, Result<AudioClip, DeviceError>> {
        Box::pin(async move {
            if !self.recording {
                return Err(DeviceError::NotRecording);
            }
            self.recording = false;

            // Stop the host first, then take whatever it buffered.
            if let Some(stream) = self.stream.as_mut() {
                stream.close();
            }
            let tail = self.drain();
            self.samples.extend(tail);
            self.close_stream();

            let bytes = self.encode()?;
            debug!(samples = self.samples.len(), bytes = bytes.len(), "recording finalized");
            self.samples.clear();

            Ok(AudioClip {
                bytes,
                mime_type: "audio/wav".to_string(),
                file_name: "recording.wav".to_string(),
            })
        })
    }

    fn release(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.recording = false;
            self.samples.clear();
            self.close_stream();
            debug!("microphone released");
        })
    }
}
