//! Where the kiosk's microphone audio comes from.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hound::{SampleFormat, WavReader};
use moca_capture::device::{MediaCapability, PcmCapability, PcmFormat, UnavailableCapability};
use moca_capture::error::DeviceError;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Chunks per second when replaying a file.
const CHUNKS_PER_SECOND: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MicrophoneSource {
    #[default]
    Disabled,
    /// Replay a 16-bit PCM WAV file as a live input, in real time.
    Wav { path: PathBuf },
}

impl MicrophoneSource {
    pub fn capability(&self) -> Arc<dyn MediaCapability> {
        match self {
            MicrophoneSource::Disabled => {
                Arc::new(UnavailableCapability::new("microphone disabled in configuration"))
            }
            MicrophoneSource::Wav { path } => match wav_format(path) {
                Ok(format) => {
                    let path = path.clone();
                    Arc::new(PcmCapability::new(format, move || replay(&path)))
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "wav source unusable");
                    Arc::new(UnavailableCapability::new(e.to_string()))
                }
            },
        }
    }
}

fn wav_format(path: &Path) -> Result<PcmFormat, DeviceError> {
    let reader = WavReader::open(path)
        .map_err(|e| DeviceError::Unavailable(format!("{}: {e}", path.display())))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(DeviceError::Unavailable(format!(
            "{}: expected 16-bit PCM, got {} bits {:?}",
            path.display(),
            spec.bits_per_sample,
            spec.sample_format
        )));
    }
    Ok(PcmFormat {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Open the file and feed its samples on a background thread, paced like a
/// live device. The thread stops when the receiver is dropped.
fn replay(path: &Path) -> Result<mpsc::UnboundedReceiver<Vec<i16>>, DeviceError> {
    let reader = WavReader::open(path).map_err(|e| DeviceError::Stream(e.to_string()))?;
    let spec = reader.spec();
    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DeviceError::Stream(e.to_string()))?;

    let chunk_len = (spec.sample_rate / CHUNKS_PER_SECOND).max(1) as usize * spec.channels as usize;
    let period = Duration::from_secs(1) / CHUNKS_PER_SECOND;
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::Builder::new()
        .name("wav-replay".into())
        .spawn(move || {
            for chunk in samples.chunks(chunk_len) {
                std::thread::sleep(period);
                if tx.send(chunk.to_vec()).is_err() {
                    debug!("wav replay stopped by recorder");
                    return;
                }
            }
            debug!("wav replay finished");
        })
        .map_err(|e| DeviceError::Stream(e.to_string()))?;

    Ok(rx)
}
