//! moca-instruments
//!
//! Questionnaire definitions and automated scoring. Pure data and pure
//! functions, no I/O. An instrument owns its ordered question catalog and
//! the heuristic that turns a completed answer package into a provisional
//! score.

pub mod error;
pub mod instruments;
pub mod scoring;

use moca_core::models::answer::AnswerPackage;
use moca_core::models::question::{Question, QuestionId, QuestionKind};
use moca_core::models::score::ScoreResult;

use error::InstrumentError;

/// Trait implemented by each administered questionnaire.
pub trait Instrument: Send + Sync {
    /// Unique identifier for this instrument (e.g., "moca").
    fn id(&self) -> &str;

    /// Human-readable name (e.g., "MoCA").
    fn name(&self) -> &str;

    /// Questions in traversal order. Ids are dense, starting at 1.
    fn questions(&self) -> &[Question];

    fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions().iter().find(|q| q.id == id)
    }

    /// Ceiling of the instrument's total score. Per-question maxima may sum
    /// above it; totals are clamped.
    fn max_score(&self) -> u32;

    /// Provisional score for an answer package. Unanswered questions
    /// contribute zero.
    fn score(&self, package: &AnswerPackage) -> ScoreResult {
        scoring::score(self.questions(), package, self.max_score())
    }

    /// Check that every catalog question has an answer.
    fn validate_package(&self, package: &AnswerPackage) -> Result<(), InstrumentError> {
        let missing = package.missing(self.questions().iter().map(|q| q.id));
        if missing.is_empty() {
            Ok(())
        } else {
            Err(InstrumentError::IncompletePackage { missing })
        }
    }

    /// Check the catalog invariants: ids run 1..=N in order and every
    /// multi-field or single-choice question declares its inputs.
    fn validate_catalog(&self) -> Result<(), InstrumentError> {
        for (index, question) in self.questions().iter().enumerate() {
            let expected = index + 1;
            if usize::from(question.id) != expected {
                return Err(InstrumentError::Catalog(format!(
                    "{}: question at position {expected} has id {}",
                    self.name(),
                    question.id
                )));
            }
            let malformed = match question.kind {
                QuestionKind::MultiField => question.fields == 0,
                QuestionKind::SingleChoice => question.options.is_empty(),
                _ => false,
            };
            if malformed {
                return Err(InstrumentError::Catalog(format!(
                    "{}: question {} declares no inputs for {:?}",
                    self.name(),
                    question.id,
                    question.kind
                )));
            }
        }
        Ok(())
    }
}

/// Return all registered instruments.
pub fn all_instruments() -> Vec<Box<dyn Instrument>> {
    vec![Box::new(instruments::moca::Moca)]
}

/// Look up an instrument by ID.
pub fn get_instrument(id: &str) -> Result<Box<dyn Instrument>, InstrumentError> {
    all_instruments()
        .into_iter()
        .find(|i| i.id() == id)
        .ok_or_else(|| InstrumentError::UnknownInstrument(id.to_string()))
}
