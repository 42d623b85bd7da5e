use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Dense 1-based question identifier. Defines traversal order.
pub type QuestionId = u8;

/// How a question is answered. The flow controller dispatches on this,
/// never on the numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuestionKind {
    FreeText,
    SingleChoice,
    MultiField,
    Drawing,
    /// Memorization prompt with a countdown that auto-advances on expiry.
    TimedRecall,
    TapGesture,
    VoiceRecorded,
}

impl QuestionKind {
    pub fn is_timed(self) -> bool {
        matches!(self, QuestionKind::TimedRecall)
    }
}

/// Device capability a question needs while it is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CaptureRequirement {
    None,
    Canvas,
    /// Recording is attached when available; the answer stands without it.
    MicrophoneOptional,
    /// The answer cannot be extracted without a recording.
    MicrophoneRequired,
}

impl CaptureRequirement {
    pub fn needs_microphone(self) -> bool {
        matches!(
            self,
            CaptureRequirement::MicrophoneOptional | CaptureRequirement::MicrophoneRequired
        )
    }

    pub fn is_required(self) -> bool {
        matches!(self, CaptureRequirement::MicrophoneRequired)
    }
}

/// Scoring category. Each question belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Category {
    Orientation,
    ImmediateRecall,
    ForwardDigitSpan,
    BackwardDigitSpan,
    SustainedAttention,
    SentenceRepetition,
    Naming,
    Abstraction,
    ClockDrawing,
    DelayedRecall,
    SpatialOrientation,
}

impl Category {
    /// Section heading shown to the respondent.
    pub fn label(self) -> &'static str {
        match self {
            Category::Orientation => "Ориентировка во времени и месте",
            Category::ImmediateRecall => "Запоминание слов",
            Category::ForwardDigitSpan
            | Category::BackwardDigitSpan
            | Category::SustainedAttention => "Внимание",
            Category::SentenceRepetition | Category::Naming => "Речь",
            Category::Abstraction => "Абстрактное мышление",
            Category::ClockDrawing => "Тест с часами",
            Category::DelayedRecall => "Отсроченное воспроизведение",
            Category::SpatialOrientation => "Ориентировка в пространстве",
        }
    }
}

/// A static questionnaire entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub category: Category,
    pub prompt: &'static str,
    pub kind: QuestionKind,
    pub capability: CaptureRequirement,
    /// Choices for `SingleChoice`; empty otherwise.
    pub options: &'static [&'static str],
    /// Sub-field count for `MultiField`; zero otherwise.
    pub fields: usize,
    pub max_points: u32,
}
