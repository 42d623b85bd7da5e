use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::question::{Category, QuestionId};

/// Points awarded for a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryScore {
    pub question_id: QuestionId,
    pub category: Category,
    pub points: u32,
    pub max_points: u32,
}

/// Automatically computed score. Provisional until a reviewer assigns the
/// authoritative one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreResult {
    pub provisional_points: u32,
    pub max_points: u32,
    pub breakdown: Vec<CategoryScore>,
}

impl ScoreResult {
    pub fn points_for(&self, category: Category) -> u32 {
        self.breakdown
            .iter()
            .filter(|entry| entry.category == category)
            .map(|entry| entry.points)
            .sum()
    }

    pub fn interpretation(&self) -> Interpretation {
        Interpretation::from_points(self.provisional_points)
    }
}

/// Conventional MoCA bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Interpretation {
    /// 26–30.
    Normal,
    /// 18–25.
    MildImpairment,
    /// Below 18.
    PossibleDementia,
}

impl Interpretation {
    pub fn from_points(points: u32) -> Self {
        match points {
            26.. => Interpretation::Normal,
            18..=25 => Interpretation::MildImpairment,
            _ => Interpretation::PossibleDementia,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Interpretation::Normal => "Норма",
            Interpretation::MildImpairment => "Легкие когнитивные нарушения",
            Interpretation::PossibleDementia => {
                "Возможная деменция или другие когнитивные нарушения"
            }
        }
    }
}
