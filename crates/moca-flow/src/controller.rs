//! Flow controller.
//!
//! Owns the session: current position, the append-only answer package, the
//! mounted capture adapter, the microphone recorder and the countdown. All
//! transitions go through `&mut self`, so there is a single thread of
//! control; the controller only suspends on device acquisition, recording
//! finalization and store calls.

use std::sync::Arc;

use moca_capture::adapters::{CaptureAdapter, Input, mount};
use moca_capture::device::{MediaCapability, Recorder};
use moca_core::models::answer::{Answer, AnswerPackage};
use moca_core::models::assessment::{TestId, TestResult};
use moca_core::models::media::AudioClip;
use moca_core::models::question::Question;
use moca_core::models::score::ScoreResult;
use moca_instruments::Instrument;
use moca_storage::assessments::AssessmentStore;
use moca_storage::media::MediaStore;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::FlowConfig;
use crate::countdown::{Countdown, CountdownEvent};
use crate::error::FlowError;
use crate::view::{self, CaptureStatus, FlowView, QuestionView, Stage};

/// Why the respondent cannot move past the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// The adapter's completeness check failed.
    Incomplete,
    /// The recording could not be uploaded. The clip is kept for a retry.
    UploadFailed(String),
    /// The question cannot be answered without a microphone.
    DeviceUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Not started yet.
    Idle,
    Capturing {
        index: usize,
    },
    Blocked {
        index: usize,
        reason: BlockReason,
    },
    Submitting,
    Submitted {
        test_id: TestId,
        score: ScoreResult,
    },
    SubmissionFailed {
        reason: String,
    },
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::Capturing { .. } => "capturing",
            FlowState::Blocked { .. } => "blocked",
            FlowState::Submitting => "submitting",
            FlowState::Submitted { .. } => "submitted",
            FlowState::SubmissionFailed { .. } => "submission failed",
        }
    }

    /// Position of the question on screen, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            FlowState::Capturing { index } | FlowState::Blocked { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// The external seams a flow talks to.
#[derive(Clone)]
pub struct FlowServices {
    pub capability: Arc<dyn MediaCapability>,
    pub assessments: Arc<dyn AssessmentStore>,
    pub media: Arc<dyn MediaStore>,
}

pub struct FlowController {
    instrument: Box<dyn Instrument>,
    services: FlowServices,
    config: FlowConfig,
    state: FlowState,
    answers: AnswerPackage,
    adapter: Option<Box<dyn CaptureAdapter>>,
    recorder: Option<Box<dyn Recorder>>,
    /// Finalized recording waiting for a successful upload.
    pending_clip: Option<AudioClip>,
    countdown: Option<Countdown>,
    remaining: Option<u32>,
    /// Bumped on every question entry; countdown events from older
    /// generations are stale.
    generation: u64,
    events_tx: mpsc::UnboundedSender<CountdownEvent>,
    events_rx: mpsc::UnboundedReceiver<CountdownEvent>,
    message: Option<String>,
}

impl FlowController {
    pub fn new(
        instrument: Box<dyn Instrument>,
        services: FlowServices,
        config: FlowConfig,
    ) -> Result<Self, FlowError> {
        instrument.validate_catalog()?;
        config.validate()?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            instrument,
            services,
            config,
            state: FlowState::Idle,
            answers: AnswerPackage::new(),
            adapter: None,
            recorder: None,
            pending_clip: None,
            countdown: None,
            remaining: None,
            generation: 0,
            events_tx,
            events_rx,
            message: None,
        })
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn answers(&self) -> &AnswerPackage {
        &self.answers
    }

    pub fn instrument(&self) -> &dyn Instrument {
        self.instrument.as_ref()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.state
            .index()
            .and_then(|index| self.instrument.questions().get(index))
    }

    /// Enter the first question.
    pub async fn start(&mut self) -> Result<(), FlowError> {
        if self.state != FlowState::Idle {
            return Err(self.invalid("start"));
        }
        info!(
            instrument = self.instrument.id(),
            questions = self.instrument.questions().len(),
            "starting assessment"
        );
        self.enter_question(0).await
    }

    /// Forward a respondent action to the mounted adapter.
    pub fn input(&mut self, input: Input) -> Result<(), FlowError> {
        if self.state.index().is_none() {
            return Err(self.invalid("accept input"));
        }
        let adapter = self
            .adapter
            .as_mut()
            .ok_or_else(|| FlowError::InvalidState {
                action: "accept input",
                state: "without a mounted question",
            })?;
        adapter.on_input(input)?;

        if let FlowState::Blocked {
            index,
            reason: BlockReason::Incomplete,
        } = self.state
        {
            self.state = FlowState::Capturing { index };
            self.message = None;
        }
        Ok(())
    }

    /// Validate the current answer and move on: to the next question, or to
    /// submission after the last one. Also retries a failed upload.
    pub async fn advance(&mut self) -> Result<(), FlowError> {
        let index = match &self.state {
            FlowState::Capturing { index }
            | FlowState::Blocked {
                index,
                reason: BlockReason::Incomplete | BlockReason::UploadFailed(_),
            } => *index,
            _ => return Err(self.invalid("advance")),
        };
        let question = *self.question_at(index)?;

        let complete = self.adapter.as_ref().is_some_and(|a| a.is_complete());
        if !complete {
            debug!(question = question.id, "answer incomplete");
            self.block(index, BlockReason::Incomplete, view::MSG_INCOMPLETE);
            return Ok(());
        }
        let mut answer = self
            .adapter
            .as_ref()
            .and_then(|a| a.current_value())
            .unwrap_or_else(Answer::empty);

        if let Some(mut recorder) = self.recorder.take() {
            if recorder.is_recording() {
                match recorder.finish().await {
                    Ok(clip) => self.pending_clip = Some(clip),
                    Err(e) => warn!(question = question.id, error = %e, "recording lost"),
                }
            }
            recorder.release().await;
        }

        if let Some(clip) = self.pending_clip.as_ref() {
            let media = Arc::clone(&self.services.media);
            match media.upload_audio(clip).await {
                Ok(media_ref) => {
                    self.pending_clip = None;
                    answer = answer.with_recording(media_ref);
                }
                Err(e) => {
                    warn!(question = question.id, error = %e, "audio upload failed");
                    self.block(
                        index,
                        BlockReason::UploadFailed(e.to_string()),
                        view::MSG_UPLOAD_FAILED,
                    );
                    return Ok(());
                }
            }
        } else if question.capability.is_required() {
            // The stream died between entry and advance.
            self.block(
                index,
                BlockReason::DeviceUnavailable("recording lost".into()),
                view::MSG_MICROPHONE_REQUIRED,
            );
            return Ok(());
        }

        self.commit(index, &question, answer).await
    }

    /// Try the microphone again for a question blocked on it.
    pub async fn retry_acquisition(&mut self) -> Result<(), FlowError> {
        let index = match &self.state {
            FlowState::Blocked {
                index,
                reason: BlockReason::DeviceUnavailable(_),
            } => *index,
            _ => return Err(self.invalid("retry microphone")),
        };
        let question = *self.question_at(index)?;
        self.acquire(index, &question).await;
        Ok(())
    }

    /// Resubmit the same answer package after a failed submission.
    pub async fn retry_submission(&mut self) -> Result<(), FlowError> {
        if !matches!(self.state, FlowState::SubmissionFailed { .. }) {
            return Err(self.invalid("retry submission"));
        }
        self.submit().await
    }

    /// Wait for the next countdown event. Cancel-safe, so it can sit in a
    /// `select!` next to input handling. Pends forever while no countdown
    /// is running.
    pub async fn next_countdown_event(&mut self) -> CountdownEvent {
        match self.events_rx.recv().await {
            Some(event) => event,
            // The controller holds a sender, so the channel never closes.
            None => std::future::pending().await,
        }
    }

    /// Apply a countdown event. Events from a question that is no longer on
    /// screen are ignored.
    pub async fn handle_countdown(&mut self, event: CountdownEvent) -> Result<(), FlowError> {
        let live = self.countdown.as_ref().map(Countdown::generation);
        if live != Some(event.generation()) || event.generation() != self.generation {
            debug!(
                generation = event.generation(),
                current = self.generation,
                "stale countdown event"
            );
            return Ok(());
        }
        let Some(index) = self.state.index() else {
            return Ok(());
        };

        match event {
            CountdownEvent::Tick { remaining, .. } => {
                self.remaining = Some(remaining);
                Ok(())
            }
            CountdownEvent::Expired { .. } => {
                self.remaining = Some(0);
                self.countdown = None;
                let question = *self.question_at(index)?;
                if index + 1 >= self.instrument.questions().len() {
                    info!(question = question.id, "countdown expired on the last question");
                    return Ok(());
                }
                info!(question = question.id, "countdown expired, advancing");
                self.release_recorder().await;
                self.pending_clip = None;
                self.commit(index, &question, Answer::empty()).await
            }
        }
    }

    /// Look up a submitted test in the Assessment Store.
    pub async fn check_result(&self, id: &TestId) -> Result<TestResult, FlowError> {
        Ok(self.services.assessments.fetch_result(id).await?)
    }

    /// Stop the countdown, release the microphone and unmount the adapter.
    pub async fn teardown(&mut self) {
        self.cancel_countdown();
        self.release_recorder().await;
        self.adapter = None;
        self.pending_clip = None;
        debug!(state = self.state.name(), "flow torn down");
    }

    pub fn view(&self) -> FlowView {
        let total = self.instrument.questions().len();
        let question = self.current_question();
        let position = self.state.index().map_or(0, |index| index + 1);
        let is_last = position == total;

        let (stage, primary_action) = match &self.state {
            FlowState::Idle => (Stage::NotStarted, Some(view::ACTION_START)),
            FlowState::Capturing { .. }
            | FlowState::Blocked {
                reason: BlockReason::Incomplete,
                ..
            } => (
                Stage::Question,
                Some(if is_last {
                    view::ACTION_FINISH
                } else {
                    view::ACTION_NEXT
                }),
            ),
            FlowState::Blocked {
                reason: BlockReason::UploadFailed(_),
                ..
            } => (Stage::Question, Some(view::ACTION_RETRY_UPLOAD)),
            FlowState::Blocked {
                reason: BlockReason::DeviceUnavailable(_),
                ..
            } => (Stage::Question, Some(view::ACTION_RETRY_MICROPHONE)),
            FlowState::Submitting => (Stage::Submitting, None),
            FlowState::Submitted { .. } => (Stage::Submitted, None),
            FlowState::SubmissionFailed { .. } => {
                (Stage::SubmissionFailed, Some(view::ACTION_RETRY_SUBMISSION))
            }
        };

        let capture = match (question, self.recorder.as_ref()) {
            (Some(q), _) if !q.capability.needs_microphone() => CaptureStatus::NotNeeded,
            (Some(_), Some(recorder)) if recorder.is_recording() => CaptureStatus::Recording,
            (Some(_), _) => CaptureStatus::Unavailable,
            (None, _) => CaptureStatus::NotNeeded,
        };

        let (test_id, score) = match &self.state {
            FlowState::Submitted { test_id, score } => {
                (Some(test_id.to_string()), Some(score.clone()))
            }
            _ => (None, None),
        };

        FlowView {
            stage,
            question: question.map(QuestionView::from),
            position,
            total,
            progress_percent: view::progress_percent(position, total),
            countdown: self.remaining,
            message: self.message.clone(),
            capture,
            primary_action: primary_action.map(str::to_string),
            test_id,
            score,
        }
    }

    fn question_at(&self, index: usize) -> Result<&Question, FlowError> {
        self.instrument
            .questions()
            .get(index)
            .ok_or(FlowError::QuestionNotFound(index))
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidState {
            action,
            state: self.state.name(),
        }
    }

    fn block(&mut self, index: usize, reason: BlockReason, message: &str) {
        self.message = Some(message.to_string());
        self.state = FlowState::Blocked { index, reason };
    }

    /// Write the answer for the question at `index` and leave it.
    async fn commit(
        &mut self,
        index: usize,
        question: &Question,
        answer: Answer,
    ) -> Result<(), FlowError> {
        self.cancel_countdown();
        self.answers.record(question.id, answer)?;
        info!(question = question.id, answered = self.answers.len(), "answer recorded");

        if index + 1 < self.instrument.questions().len() {
            self.enter_question(index + 1).await
        } else {
            self.adapter = None;
            self.submit().await
        }
    }

    async fn enter_question(&mut self, index: usize) -> Result<(), FlowError> {
        self.cancel_countdown();
        self.release_recorder().await;
        self.generation += 1;
        self.pending_clip = None;
        self.remaining = None;
        self.message = None;

        let question = match self.question_at(index) {
            Ok(question) => *question,
            Err(e) => {
                self.adapter = None;
                self.message = Some(view::MSG_QUESTION_NOT_FOUND.to_string());
                return Err(e);
            }
        };
        self.adapter = Some(mount(&question));
        self.state = FlowState::Capturing { index };
        info!(
            question = question.id,
            kind = ?question.kind,
            generation = self.generation,
            "entered question"
        );

        if question.capability.needs_microphone() {
            self.acquire(index, &question).await;
        }

        if question.kind.is_timed() {
            self.remaining = Some(self.config.countdown_ticks);
            self.countdown = Some(Countdown::start(
                self.generation,
                self.config.countdown_ticks,
                self.config.tick_interval(),
                self.events_tx.clone(),
            ));
        }
        Ok(())
    }

    /// Acquire and start the microphone for the question at `index`.
    async fn acquire(&mut self, index: usize, question: &Question) {
        let capability = Arc::clone(&self.services.capability);
        let started = match capability.acquire_microphone().await {
            Ok(mut recorder) => match recorder.start() {
                Ok(()) => Ok(recorder),
                Err(e) => {
                    recorder.release().await;
                    Err(e)
                }
            },
            Err(e) => Err(e),
        };

        match started {
            Ok(recorder) => {
                info!(question = question.id, "recording started");
                self.recorder = Some(recorder);
                self.message = None;
                self.state = FlowState::Capturing { index };
            }
            Err(e) => {
                if question.capability.is_required() {
                    warn!(question = question.id, error = %e, "required microphone unavailable");
                    self.block(
                        index,
                        BlockReason::DeviceUnavailable(e.to_string()),
                        view::MSG_MICROPHONE_REQUIRED,
                    );
                } else {
                    warn!(question = question.id, error = %e, "continuing without recording");
                    self.message = Some(view::MSG_MICROPHONE_OPTIONAL.to_string());
                }
            }
        }
    }

    async fn submit(&mut self) -> Result<(), FlowError> {
        self.instrument.validate_package(&self.answers)?;
        self.state = FlowState::Submitting;
        self.message = None;

        let score = self.instrument.score(&self.answers);
        info!(
            answers = self.answers.len(),
            provisional_points = score.provisional_points,
            "submitting assessment"
        );

        let assessments = Arc::clone(&self.services.assessments);
        match assessments.submit(&self.answers).await {
            Ok(test_id) => {
                info!(test_id = %test_id, "assessment submitted");
                self.state = FlowState::Submitted { test_id, score };
            }
            Err(e) => {
                warn!(error = %e, "submission failed");
                self.message = Some(view::MSG_SUBMISSION_FAILED.to_string());
                self.state = FlowState::SubmissionFailed {
                    reason: e.to_string(),
                };
            }
        }
        Ok(())
    }

    fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
    }

    async fn release_recorder(&mut self) {
        if let Some(mut recorder) = self.recorder.take() {
            recorder.release().await;
        }
    }
}

impl Drop for FlowController {
    fn drop(&mut self) {
        self.cancel_countdown();
        // Dropping the recorder closes its stream.
        self.recorder = None;
    }
}
