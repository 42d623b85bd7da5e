//! Provisional scoring heuristic.
//!
//! Every rule is literal substring or digit matching on the respondent's
//! text. The matching is naive: "город" earns the place marker
//! while "понедельник" does not earn "день". Reviewers assign the
//! authoritative score.

use moca_core::models::answer::{Answer, AnswerPackage};
use moca_core::models::question::{Category, Question};
use moca_core::models::score::{CategoryScore, ScoreResult};
use tracing::debug;

/// Date, month, year, weekday, city and institution markers.
pub const ORIENTATION_MARKERS: [&str; 6] = ["дата", "месяц", "год", "день", "город", "учреждение"];

/// The five words presented for immediate and delayed recall.
pub const RECALL_WORDS: [&str; 5] = ["лист", "церковь", "цветок", "перо", "красный"];

pub const FORWARD_DIGITS: &str = "582";

pub const BACKWARD_DIGITS: &str = "741";

pub const TARGET_PHRASE: &str = "никаких если, и или но";

/// Animals shown on the naming card.
pub const NAMING_TARGETS: [&str; 3] = ["лев", "носорог", "верблюд"];

/// Stem of the expected category word ("фрукты") for the similarity item.
pub const ABSTRACTION_STEM: &str = "фрук";

/// Score an answer package against a catalog.
///
/// Each question is scored by its category rule and capped at its own
/// `max_points`; the total is clamped to `ceiling`. The package is never
/// modified, and repeated calls give the same result.
pub fn score(questions: &[Question], package: &AnswerPackage, ceiling: u32) -> ScoreResult {
    let breakdown: Vec<CategoryScore> = questions
        .iter()
        .map(|question| {
            let points = package
                .get(question.id)
                .map_or(0, |answer| rule_points(question, answer));
            CategoryScore {
                question_id: question.id,
                category: question.category,
                points: points.min(question.max_points),
                max_points: question.max_points,
            }
        })
        .collect();

    let sum: u32 = breakdown.iter().map(|entry| entry.points).sum();
    let provisional_points = sum.min(ceiling);

    debug!(sum, provisional_points, ceiling, "scored answer package");

    ScoreResult {
        provisional_points,
        max_points: ceiling,
        breakdown,
    }
}

fn rule_points(question: &Question, answer: &Answer) -> u32 {
    let full = question.max_points;
    let text = answer.as_text().unwrap_or_default();

    match question.category {
        Category::Orientation => count_present(text, &ORIENTATION_MARKERS),
        Category::ImmediateRecall | Category::DelayedRecall => count_present(text, &RECALL_WORDS),
        Category::ForwardDigitSpan => award_if(digits_only(text) == FORWARD_DIGITS, full),
        Category::BackwardDigitSpan => award_if(digits_only(text) == BACKWARD_DIGITS, full),
        Category::SustainedAttention => answer.tap_count().unwrap_or(0),
        Category::SentenceRepetition => award_if(text.to_lowercase().contains(TARGET_PHRASE), full),
        Category::Naming => naming_matches(answer),
        Category::Abstraction => award_if(text.to_lowercase().contains(ABSTRACTION_STEM), full),
        // Not automatically scorable.
        Category::ClockDrawing => 0,
        Category::SpatialOrientation => award_if(text.chars().any(|c| c.is_ascii_digit()), full),
    }
}

/// Number of `terms` found as case-insensitive substrings of `text`.
pub fn count_present(text: &str, terms: &[&str]) -> u32 {
    let lowered = text.to_lowercase();
    terms.iter().filter(|term| lowered.contains(*term)).count() as u32
}

/// Strip everything except ASCII digits.
pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn award_if(matched: bool, points: u32) -> u32 {
    if matched { points } else { 0 }
}

/// Every (sub-answer, target) pair that matches counts once.
fn naming_matches(answer: &Answer) -> u32 {
    match answer.fields() {
        Some(fields) => fields
            .values()
            .map(|value| count_present(value, &NAMING_TARGETS))
            .sum(),
        None => answer
            .as_text()
            .map_or(0, |text| count_present(text, &NAMING_TARGETS)),
    }
}
