//! Entity records and request inputs. Wire names are camelCase.

use serde::{Deserialize, Serialize};

/// Default `totalGoals` for a progress entry when the client omits it.
pub const DEFAULT_TOTAL_GOALS: i32 = 3;

/// A weekly priority. `priority` is a display rank within the week (1..=3).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub priority: i32,
    pub week_start: String,
    pub completed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    pub priority: i32,
    pub week_start: String,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Partial goal update. `None` leaves the stored field untouched; `Some(false)` still applies.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl GoalPatch {
    pub fn apply(&self, goal: &mut Goal) {
        if let Some(title) = &self.title {
            goal.title = title.clone();
        }
        if let Some(completed) = self.completed {
            goal.completed = completed;
        }
        if let Some(priority) = self.priority {
            goal.priority = priority;
        }
    }
}

/// Per-day completion snapshot. At most one per `date`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub id: String,
    pub date: String,
    pub goals_completed: i32,
    pub total_goals: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProgressEntry {
    pub date: String,
    pub goals_completed: i32,
    #[serde(default = "default_total_goals")]
    pub total_goals: i32,
}

fn default_total_goals() -> i32 {
    DEFAULT_TOTAL_GOALS
}

/// Weekly reflection. At most one per `weekStart`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub week_start: String,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJournalEntry {
    pub week_start: String,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JournalPatch {
    pub content: String,
}

/// Fresh opaque record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
