use std::fmt;

use serde::{Deserialize, Serialize};

use super::answer::AnswerPackage;
use super::score::Interpretation;

/// Opaque identifier the Assessment Store assigns to a submitted test.
///
/// The store may hand out numeric or string ids; both deserialize into the
/// same textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WireTestId")]
pub struct TestId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum WireTestId {
    Number(u64),
    Text(String),
}

impl From<WireTestId> for TestId {
    fn from(raw: WireTestId) -> Self {
        match raw {
            WireTestId::Number(n) => TestId(n.to_string()),
            WireTestId::Text(s) => TestId(s),
        }
    }
}

impl TestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request body for `POST /test/`.
#[derive(Debug, Serialize)]
pub struct Submission<'a> {
    pub answers_package: &'a AnswerPackage,
}

/// Response body for `POST /test/`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionReceipt {
    pub id: TestId,
}

/// Response body for `GET /test/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(alias = "id")]
    pub test_id: TestId,
    pub date_of_test: jiff::civil::Date,
    /// Reviewer-assigned score. `None` until an administrator reviews it.
    pub points: Option<u32>,
}

impl TestResult {
    pub fn review(&self) -> ReviewStatus {
        match self.points {
            Some(points) => ReviewStatus::Reviewed {
                points,
                interpretation: Interpretation::from_points(points),
            },
            None => ReviewStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    /// Not yet reviewed; must not be rendered as a zero score.
    Pending,
    Reviewed {
        points: u32,
        interpretation: Interpretation,
    },
}
