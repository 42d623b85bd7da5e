use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Serialize, Serializer};

use super::question::QuestionId;
use crate::error::CoreError;

/// A PNG-encoded snapshot of the drawing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSnapshot {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl RasterSnapshot {
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", B64.encode(&self.png))
    }
}

impl Serialize for RasterSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

/// The structured half of a recorded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    TapCount(u32),
}

/// One respondent answer.
///
/// Serializes to the shape the Assessment Store keeps in `answers_package`:
/// plain strings for text and drawings, a `{"0": .., "1": ..}` object for
/// multi-field answers, and `{"answer": .., "audio": ..}` for answers with an
/// uploaded recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    MultiField(BTreeMap<usize, String>),
    DrawingImage(RasterSnapshot),
    TapCount(u32),
    Recorded {
        #[serde(rename = "answer")]
        raw: RawValue,
        #[serde(rename = "audio")]
        media_ref: String,
    },
}

impl Answer {
    /// The implicit value written when a timed question expires.
    pub fn empty() -> Self {
        Answer::Text(String::new())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(text)
            | Answer::Recorded {
                raw: RawValue::Text(text),
                ..
            } => Some(text),
            _ => None,
        }
    }

    pub fn tap_count(&self) -> Option<u32> {
        match self {
            Answer::TapCount(count)
            | Answer::Recorded {
                raw: RawValue::TapCount(count),
                ..
            } => Some(*count),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&BTreeMap<usize, String>> {
        match self {
            Answer::MultiField(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn media_ref(&self) -> Option<&str> {
        match self {
            Answer::Recorded { media_ref, .. } => Some(media_ref),
            _ => None,
        }
    }

    /// Attach an uploaded recording. Text and tap answers keep their value as
    /// the raw half; other variants have no recorded form and are returned
    /// unchanged.
    pub fn with_recording(self, media_ref: String) -> Self {
        match self {
            Answer::Text(text) => Answer::Recorded {
                raw: RawValue::Text(text),
                media_ref,
            },
            Answer::TapCount(count) => Answer::Recorded {
                raw: RawValue::TapCount(count),
                media_ref,
            },
            other => other,
        }
    }
}

/// Append-only mapping from question id to answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerPackage {
    answers: BTreeMap<QuestionId, Answer>,
}

impl AnswerPackage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the answer for `id`. Written answers are never replaced.
    pub fn record(&mut self, id: QuestionId, answer: Answer) -> Result<(), CoreError> {
        if self.answers.contains_key(&id) {
            return Err(CoreError::AlreadyAnswered(id));
        }
        self.answers.insert(id, answer);
        Ok(())
    }

    pub fn get(&self, id: QuestionId) -> Option<&Answer> {
        self.answers.get(&id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.answers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &Answer)> {
        self.answers.iter().map(|(id, answer)| (*id, answer))
    }

    /// Ids from `expected` with no answer yet, in the given order.
    pub fn missing(&self, expected: impl IntoIterator<Item = QuestionId>) -> Vec<QuestionId> {
        expected
            .into_iter()
            .filter(|id| !self.answers.contains_key(id))
            .collect()
    }

    pub fn to_json(&self) -> Result<serde_json::Value, CoreError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl FromIterator<(QuestionId, Answer)> for AnswerPackage {
    /// Builds a package keeping the first answer seen for each id.
    fn from_iter<I: IntoIterator<Item = (QuestionId, Answer)>>(iter: I) -> Self {
        let mut answers = BTreeMap::new();
        for (id, answer) in iter {
            answers.entry(id).or_insert(answer);
        }
        Self { answers }
    }
}
