use moca_core::models::question::{Category, CaptureRequirement, Question, QuestionKind};

use crate::Instrument;

/// MoCA: Montreal Cognitive Assessment, Russian-language digital form.
/// 11 questions, total capped at 30 points. The clock drawing is left for
/// the reviewer.
pub struct Moca;

impl Instrument for Moca {
    fn id(&self) -> &str {
        "moca"
    }

    fn name(&self) -> &str {
        "MoCA"
    }

    fn questions(&self) -> &[Question] {
        &QUESTIONS
    }

    fn max_score(&self) -> u32 {
        30
    }
}

const fn text(id: u8, category: Category, prompt: &'static str, max_points: u32) -> Question {
    Question {
        id,
        category,
        prompt,
        kind: QuestionKind::FreeText,
        capability: CaptureRequirement::None,
        options: &[],
        fields: 0,
        max_points,
    }
}

static QUESTIONS: [Question; 11] = [
    text(
        1,
        Category::Orientation,
        "Назовите сегодняшнюю дату, месяц, год, день недели",
        6,
    ),
    Question {
        kind: QuestionKind::TimedRecall,
        ..text(
            2,
            Category::ImmediateRecall,
            "Повторите следующие слова: лист, церковь, цветок, перо, красный",
            5,
        )
    },
    text(3, Category::ForwardDigitSpan, "Повторите цифры: 5-8-2", 3),
    text(4, Category::BackwardDigitSpan, "Скажите в обратном порядке: 7-4-1", 3),
    Question {
        kind: QuestionKind::TapGesture,
        capability: CaptureRequirement::MicrophoneRequired,
        ..text(
            5,
            Category::SustainedAttention,
            "Хлопните, когда услышите букву \"А\" в последовательности: Б-А-Л-А-Т-А-К",
            6,
        )
    },
    Question {
        kind: QuestionKind::VoiceRecorded,
        capability: CaptureRequirement::MicrophoneOptional,
        ..text(
            6,
            Category::SentenceRepetition,
            "Повторите фразу: \"Никаких если, и или но\"",
            1,
        )
    },
    Question {
        kind: QuestionKind::MultiField,
        fields: 3,
        ..text(7, Category::Naming, "Назовите изображенных животных", 2)
    },
    text(8, Category::Abstraction, "Чем похожи яблоко и груша?", 2),
    Question {
        kind: QuestionKind::Drawing,
        capability: CaptureRequirement::Canvas,
        ..text(
            9,
            Category::ClockDrawing,
            "Нарисуйте круглые часы, расставьте цифры и укажите время \"11:10\"",
            4,
        )
    },
    text(
        10,
        Category::DelayedRecall,
        "Повторите слова, которые вы запомнили в начале теста",
        5,
    ),
    text(11, Category::SpatialOrientation, "На каком этаже мы находимся?", 1),
];
