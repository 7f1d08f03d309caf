//! Set-log records and the client-side backlog entry wrapping them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One performed (or skipped) set, as sent to `POST /api/logs/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLog {
    pub exercise_id: i64,
    pub workout_id: i64,
    /// 1-based
    pub set_number: u32,
    pub reps: u32,
    pub weight: f64,
}

impl SetLog {
    /// True when both records describe the same set of the same workout.
    pub fn same_set(&self, other: &SetLog) -> bool {
        self.exercise_id == other.exercise_id
            && self.workout_id == other.workout_id
            && self.set_number == other.set_number
    }
}

/// What the user entered for the current set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SetInput {
    pub reps: u32,
    pub weight: f64,
}

/// Backlog entry awaiting confirmation by the backend.
///
/// `id` is generated client-side and never sent; it lets a late send
/// confirmation remove exactly the entry it was issued for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingLog {
    pub id: Uuid,
    pub log: SetLog,
}

impl PendingLog {
    pub fn new(log: SetLog) -> Self {
        Self {
            id: Uuid::new_v4(),
            log,
        }
    }
}
