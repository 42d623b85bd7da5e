//! Presentation snapshot of a flow.

use serde::Serialize;
use ts_rs::TS;

use moca_core::models::question::{Category, Question, QuestionKind};
use moca_core::models::score::ScoreResult;

pub const MSG_INCOMPLETE: &str = "Пожалуйста, заполните ответ";
pub const MSG_UPLOAD_FAILED: &str = "Ошибка загрузки аудио";
pub const MSG_MICROPHONE_REQUIRED: &str =
    "Микрофон недоступен. Разрешите доступ к микрофону и повторите попытку";
pub const MSG_MICROPHONE_OPTIONAL: &str =
    "Микрофон недоступен, ответ будет сохранен без записи";
pub const MSG_SUBMISSION_FAILED: &str = "Не удалось отправить тест";
pub const MSG_QUESTION_NOT_FOUND: &str = "Вопрос не найден";

pub const ACTION_START: &str = "Начать тест";
pub const ACTION_NEXT: &str = "Следующий вопрос";
pub const ACTION_FINISH: &str = "Завершить тест";
pub const ACTION_RETRY_UPLOAD: &str = "Повторить загрузку";
pub const ACTION_RETRY_MICROPHONE: &str = "Повторить подключение микрофона";
pub const ACTION_RETRY_SUBMISSION: &str = "Повторить отправку";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Stage {
    NotStarted,
    Question,
    Submitting,
    Submitted,
    SubmissionFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CaptureStatus {
    NotNeeded,
    Recording,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct QuestionView {
    pub id: u8,
    pub category: Category,
    pub heading: String,
    pub prompt: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub fields: usize,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            category: question.category,
            heading: question.category.label().to_string(),
            prompt: question.prompt.to_string(),
            kind: question.kind,
            options: question.options.iter().map(|o| o.to_string()).collect(),
            fields: question.fields,
        }
    }
}

/// Everything a presentation layer needs to render the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FlowView {
    pub stage: Stage,
    pub question: Option<QuestionView>,
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub progress_percent: u32,
    /// Ticks left on a timed question.
    pub countdown: Option<u32>,
    pub message: Option<String>,
    pub capture: CaptureStatus,
    /// Label of the button that moves the flow forward, if any.
    pub primary_action: Option<String>,
    pub test_id: Option<String>,
    pub score: Option<ScoreResult>,
}

pub(crate) fn progress_percent(position: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    u32::try_from(position * 100 / total).unwrap_or(100)
}
