#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use moca_capture::device::{MediaCapability, PcmFormat, PcmRecorder, Recorder};
use moca_capture::error::DeviceError;
use moca_core::BoxFuture;
use moca_core::models::answer::AnswerPackage;
use moca_core::models::assessment::{TestId, TestResult};
use moca_core::models::media::AudioClip;
use moca_core::models::question::{CaptureRequirement, Category, Question, QuestionKind};
use moca_flow::config::FlowConfig;
use moca_flow::controller::{FlowController, FlowServices};
use moca_instruments::Instrument;
use moca_storage::assessments::AssessmentStore;
use moca_storage::error::StorageError;
use moca_storage::media::MediaStore;
use tokio::sync::mpsc;

/// Consume one scripted failure, if any are left.
fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// In-memory Assessment Store and Media Store.
#[derive(Default)]
pub struct MockStore {
    pub submissions: Mutex<Vec<AnswerPackage>>,
    pub submit_failures: AtomicUsize,
    /// Every upload attempt, failed ones included.
    pub upload_attempts: Mutex<Vec<AudioClip>>,
    pub upload_failures: AtomicUsize,
}

impl MockStore {
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

impl AssessmentStore for MockStore {
    fn submit<'a>(
        &'a self,
        package: &'a AnswerPackage,
    ) -> BoxFuture<'a, Result<TestId, StorageError>> {
        Box::pin(async move {
            if take_failure(&self.submit_failures) {
                return Err(StorageError::Status {
                    operation: "submit test",
                    status: 503,
                });
            }
            let mut submissions = self.submissions.lock().unwrap();
            submissions.push(package.clone());
            Ok(TestId::new(submissions.len().to_string()))
        })
    }

    fn fetch_result<'a>(&'a self, id: &'a TestId) -> BoxFuture<'a, Result<TestResult, StorageError>> {
        Box::pin(async move {
            if id.as_str() != "1" {
                return Err(StorageError::NotFound { id: id.to_string() });
            }
            Ok(serde_json::from_str(
                r#"{"test_id": 1, "date_of_test": "2024-03-05", "points": 27}"#,
            )?)
        })
    }
}

impl MediaStore for MockStore {
    fn upload_audio<'a>(&'a self, clip: &'a AudioClip) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            let mut attempts = self.upload_attempts.lock().unwrap();
            attempts.push(clip.clone());
            if take_failure(&self.upload_failures) {
                return Err(StorageError::Transport {
                    operation: "upload audio",
                    message: "connection reset".into(),
                });
            }
            Ok(format!("audio/{}.wav", attempts.len()))
        })
    }
}

/// How a broken recording goes wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingFault {
    /// Finalizing the clip fails.
    FinishFails,
    /// The stream stops right after it started.
    StreamDrops,
}

/// Recorder that starts fine and then loses the recording.
pub struct BrokenRecorder {
    fault: RecordingFault,
    recording: bool,
    released: Arc<AtomicUsize>,
}

impl Recorder for BrokenRecorder {
    fn start(&mut self) -> Result<(), DeviceError> {
        self.recording = self.fault == RecordingFault::FinishFails;
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn finish(&mut self) -> BoxFuture<'_, Result<AudioClip, DeviceError>> {
        Box::pin(async move {
            self.recording = false;
            Err(DeviceError::Stream("device unplugged".into()))
        })
    }

    fn release(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.recording = false;
            self.released.fetch_add(1, Ordering::SeqCst);
        })
    }
}

/// Microphone that refuses the first `failures` acquisitions, hands out
/// `broken` broken recorders after that, and passes the stream senders of
/// the rest back to the test.
#[derive(Default)]
pub struct MockMicrophone {
    pub failures: AtomicUsize,
    pub acquisitions: AtomicUsize,
    pub streams: Mutex<Vec<mpsc::UnboundedSender<Vec<i16>>>>,
    pub broken: AtomicUsize,
    pub fault: Option<RecordingFault>,
    /// Broken recorders released so far.
    pub released: Arc<AtomicUsize>,
}

impl MockMicrophone {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            ..Self::default()
        }
    }

    /// The first `count` recordings are lost to `fault`.
    pub fn losing(count: usize, fault: RecordingFault) -> Self {
        Self {
            broken: AtomicUsize::new(count),
            fault: Some(fault),
            ..Self::default()
        }
    }

    pub fn stream(&self, index: usize) -> mpsc::UnboundedSender<Vec<i16>> {
        self.streams.lock().unwrap()[index].clone()
    }
}

impl MediaCapability for MockMicrophone {
    fn acquire_microphone(&self) -> BoxFuture<'_, Result<Box<dyn Recorder>, DeviceError>> {
        Box::pin(async move {
            self.acquisitions.fetch_add(1, Ordering::SeqCst);
            if take_failure(&self.failures) {
                return Err(DeviceError::Unavailable("permission denied".into()));
            }
            if let Some(fault) = self.fault.filter(|_| take_failure(&self.broken)) {
                return Ok(Box::new(BrokenRecorder {
                    fault,
                    recording: false,
                    released: Arc::clone(&self.released),
                }) as Box<dyn Recorder>);
            }
            let (tx, rx) = mpsc::unbounded_channel();
            self.streams.lock().unwrap().push(tx);
            Ok(Box::new(PcmRecorder::new(PcmFormat::default(), rx)) as Box<dyn Recorder>)
        })
    }
}

/// Small instrument over a static catalog.
pub struct Quiz(pub &'static [Question]);

impl Instrument for Quiz {
    fn id(&self) -> &str {
        "quiz"
    }

    fn name(&self) -> &str {
        "Quiz"
    }

    fn questions(&self) -> &[Question] {
        self.0
    }

    fn max_score(&self) -> u32 {
        30
    }
}

pub const fn question(id: u8, kind: QuestionKind, capability: CaptureRequirement) -> Question {
    Question {
        id,
        category: Category::Orientation,
        prompt: "?",
        kind,
        capability,
        options: &[],
        fields: 0,
        max_points: 1,
    }
}

pub fn controller(
    instrument: Box<dyn Instrument>,
    microphone: Arc<dyn MediaCapability>,
    store: Arc<MockStore>,
) -> FlowController {
    let services = FlowServices {
        capability: microphone,
        assessments: store.clone(),
        media: store,
    };
    FlowController::new(instrument, services, FlowConfig::default()).unwrap()
}
