//! Capture adapters, one per question kind.
//!
//! An adapter owns the in-progress value for the mounted question. It never
//! writes to the answer package; the flow controller reads `current_value`
//! once `is_complete` holds.

use std::collections::BTreeMap;

use moca_core::models::answer::Answer;
use moca_core::models::question::{Question, QuestionKind};

use crate::drawing::{DrawingSurface, PointerEvent};
use crate::error::CaptureError;

/// A respondent action forwarded from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Replace the text value.
    Text(String),
    /// Select the option at this index.
    Choice(usize),
    /// Replace one sub-field of a multi-field answer.
    Field { index: usize, text: String },
    Pointer(PointerEvent),
    /// Rendered size of the drawing surface, in display pixels.
    DisplaySize { width: f32, height: f32 },
    ClearDrawing,
    Tap,
}

impl Input {
    pub fn name(&self) -> &'static str {
        match self {
            Input::Text(_) => "text",
            Input::Choice(_) => "choice",
            Input::Field { .. } => "field",
            Input::Pointer(_) => "pointer",
            Input::DisplaySize { .. } => "display size",
            Input::ClearDrawing => "clear",
            Input::Tap => "tap",
        }
    }
}

pub trait CaptureAdapter: Send {
    fn kind(&self) -> QuestionKind;

    fn on_input(&mut self, input: Input) -> Result<(), CaptureError>;

    /// The answer as it stands now. `None` until there is something to
    /// report.
    fn current_value(&self) -> Option<Answer>;

    fn is_complete(&self) -> bool;
}

/// Create a fresh adapter for `question`, dispatching on its kind.
pub fn mount(question: &Question) -> Box<dyn CaptureAdapter> {
    match question.kind {
        QuestionKind::FreeText | QuestionKind::TimedRecall => {
            Box::new(TextAdapter::new(question.kind))
        }
        QuestionKind::SingleChoice => Box::new(ChoiceAdapter::new(question.options)),
        QuestionKind::MultiField => Box::new(MultiFieldAdapter::new(question.fields)),
        QuestionKind::Drawing => Box::new(DrawingAdapter::new(DrawingSurface::default())),
        QuestionKind::TapGesture => Box::new(TapAdapter::default()),
        QuestionKind::VoiceRecorded => Box::new(VoiceAdapter::default()),
    }
}

fn unsupported(kind: QuestionKind, input: &Input) -> CaptureError {
    CaptureError::UnsupportedInput {
        kind,
        input: input.name(),
    }
}

fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Free text and timed recall.
pub struct TextAdapter {
    kind: QuestionKind,
    text: String,
}

impl TextAdapter {
    pub fn new(kind: QuestionKind) -> Self {
        Self {
            kind,
            text: String::new(),
        }
    }
}

impl CaptureAdapter for TextAdapter {
    fn kind(&self) -> QuestionKind {
        self.kind
    }

    fn on_input(&mut self, input: Input) -> Result<(), CaptureError> {
        match input {
            Input::Text(text) => {
                self.text = text;
                Ok(())
            }
            other => Err(unsupported(self.kind, &other)),
        }
    }

    fn current_value(&self) -> Option<Answer> {
        Some(Answer::Text(self.text.clone()))
    }

    fn is_complete(&self) -> bool {
        has_content(&self.text)
    }
}

pub struct ChoiceAdapter {
    options: &'static [&'static str],
    selected: Option<usize>,
}

impl ChoiceAdapter {
    pub fn new(options: &'static [&'static str]) -> Self {
        Self {
            options,
            selected: None,
        }
    }
}

impl CaptureAdapter for ChoiceAdapter {
    fn kind(&self) -> QuestionKind {
        QuestionKind::SingleChoice
    }

    fn on_input(&mut self, input: Input) -> Result<(), CaptureError> {
        match input {
            Input::Choice(index) if index < self.options.len() => {
                self.selected = Some(index);
                Ok(())
            }
            Input::Choice(index) => Err(CaptureError::ChoiceOutOfRange {
                index,
                options: self.options.len(),
            }),
            other => Err(unsupported(self.kind(), &other)),
        }
    }

    fn current_value(&self) -> Option<Answer> {
        self.selected
            .map(|index| Answer::Text(self.options[index].to_string()))
    }

    fn is_complete(&self) -> bool {
        self.selected.is_some()
    }
}

/// Fixed-arity set of text fields, e.g. one per pictured animal.
pub struct MultiFieldAdapter {
    values: Vec<String>,
}

impl MultiFieldAdapter {
    pub fn new(arity: usize) -> Self {
        Self {
            values: vec![String::new(); arity],
        }
    }
}

impl CaptureAdapter for MultiFieldAdapter {
    fn kind(&self) -> QuestionKind {
        QuestionKind::MultiField
    }

    fn on_input(&mut self, input: Input) -> Result<(), CaptureError> {
        match input {
            Input::Field { index, text } => {
                let arity = self.values.len();
                let slot = self
                    .values
                    .get_mut(index)
                    .ok_or(CaptureError::FieldOutOfRange { index, arity })?;
                *slot = text;
                Ok(())
            }
            other => Err(unsupported(self.kind(), &other)),
        }
    }

    fn current_value(&self) -> Option<Answer> {
        let fields: BTreeMap<usize, String> = self.values.iter().cloned().enumerate().collect();
        Some(Answer::MultiField(fields))
    }

    fn is_complete(&self) -> bool {
        !self.values.is_empty() && self.values.iter().all(|v| has_content(v))
    }
}

pub struct DrawingAdapter {
    surface: DrawingSurface,
}

impl DrawingAdapter {
    pub fn new(surface: DrawingSurface) -> Self {
        Self { surface }
    }
}

impl CaptureAdapter for DrawingAdapter {
    fn kind(&self) -> QuestionKind {
        QuestionKind::Drawing
    }

    fn on_input(&mut self, input: Input) -> Result<(), CaptureError> {
        match input {
            Input::Pointer(event) => self.surface.handle(event).map(|_| ()),
            Input::DisplaySize { width, height } => {
                self.surface.set_display_size(width, height);
                Ok(())
            }
            Input::ClearDrawing => {
                self.surface.clear();
                Ok(())
            }
            other => Err(unsupported(self.kind(), &other)),
        }
    }

    fn current_value(&self) -> Option<Answer> {
        self.surface
            .snapshot()
            .map(|snapshot| Answer::DrawingImage(snapshot.clone()))
    }

    fn is_complete(&self) -> bool {
        self.surface.snapshot().is_some()
    }
}

#[derive(Default)]
pub struct TapAdapter {
    taps: u32,
}

impl CaptureAdapter for TapAdapter {
    fn kind(&self) -> QuestionKind {
        QuestionKind::TapGesture
    }

    fn on_input(&mut self, input: Input) -> Result<(), CaptureError> {
        match input {
            Input::Tap => {
                self.taps = self.taps.saturating_add(1);
                Ok(())
            }
            other => Err(unsupported(self.kind(), &other)),
        }
    }

    fn current_value(&self) -> Option<Answer> {
        Some(Answer::TapCount(self.taps))
    }

    fn is_complete(&self) -> bool {
        self.taps > 0
    }
}

/// Spoken phrase, typed back by the respondent. A recording is attached
/// when a microphone is available; completeness ignores it.
#[derive(Default)]
pub struct VoiceAdapter {
    text: String,
}

impl CaptureAdapter for VoiceAdapter {
    fn kind(&self) -> QuestionKind {
        QuestionKind::VoiceRecorded
    }

    fn on_input(&mut self, input: Input) -> Result<(), CaptureError> {
        match input {
            Input::Text(text) => {
                self.text = text;
                Ok(())
            }
            other => Err(unsupported(self.kind(), &other)),
        }
    }

    fn current_value(&self) -> Option<Answer> {
        Some(Answer::Text(self.text.clone()))
    }

    fn is_complete(&self) -> bool {
        has_content(&self.text)
    }
}
