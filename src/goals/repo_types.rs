use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Bulk,
    Lean,
}

impl GoalType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bulk" => Some(GoalType::Bulk),
            "lean" => Some(GoalType::Lean),
            _ => None,
        }
    }

    /// Targets suggested when the user picks a goal without numbers.
    pub fn default_targets(&self) -> (u32, u32) {
        match self {
            GoalType::Bulk => (2500, 150),
            GoalType::Lean => (1800, 100),
        }
    }
}

/// Daily targets the totals are compared against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    pub goal_type: Option<GoalType>,
    pub daily_calories: u32,
    pub daily_protein: u32,
}

impl Goal {
    pub fn for_type(goal_type: GoalType) -> Self {
        let (daily_calories, daily_protein) = goal_type.default_targets();
        Self {
            goal_type: Some(goal_type),
            daily_calories,
            daily_protein,
        }
    }
}

/// Row in `goals`.
#[derive(Debug, Clone, FromRow)]
pub struct GoalRow {
    pub goal_type: Option<String>,
    pub daily_calories: i32,
    pub daily_protein: i32,
}

// A target left at zero takes the goal type's default.
impl From<GoalRow> for Goal {
    fn from(r: GoalRow) -> Self {
        let calories = u32::try_from(r.daily_calories).unwrap_or(0);
        let protein = u32::try_from(r.daily_protein).unwrap_or(0);
        let base = match r.goal_type.as_deref().and_then(GoalType::parse) {
            Some(goal_type) => Goal::for_type(goal_type),
            None => Goal {
                goal_type: None,
                daily_calories: 0,
                daily_protein: 0,
            },
        };
        Self {
            daily_calories: if calories > 0 { calories } else { base.daily_calories },
            daily_protein: if protein > 0 { protein } else { base.daily_protein },
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_goal_type() {
        assert_eq!(Goal::for_type(GoalType::Bulk).daily_calories, 2500);
        assert_eq!(Goal::for_type(GoalType::Bulk).daily_protein, 150);
        assert_eq!(Goal::for_type(GoalType::Lean).daily_calories, 1800);
        assert_eq!(Goal::for_type(GoalType::Lean).daily_protein, 100);
    }

    #[test]
    fn unset_targets_fall_back_to_type_defaults() {
        let goal = Goal::from(GoalRow {
            goal_type: Some("bulk".into()),
            daily_calories: 0,
            daily_protein: 0,
        });
        assert_eq!(goal, Goal::for_type(GoalType::Bulk));

        let goal = Goal::from(GoalRow {
            goal_type: Some("lean".into()),
            daily_calories: 1650,
            daily_protein: 0,
        });
        assert_eq!(goal.goal_type, Some(GoalType::Lean));
        assert_eq!(goal.daily_calories, 1650);
        assert_eq!(goal.daily_protein, 100);
    }

    #[test]
    fn row_with_unknown_type_keeps_targets() {
        let goal = Goal::from(GoalRow {
            goal_type: Some("maintain".into()),
            daily_calories: 2100,
            daily_protein: 120,
        });
        assert_eq!(goal.goal_type, None);
        assert_eq!(goal.daily_calories, 2100);
        assert_eq!(goal.daily_protein, 120);
    }
}
