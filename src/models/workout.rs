//! Workout plan model.
//!
//! A workout is an ordered list of [`WorkoutExercise`] entries, each carrying
//! the planned sets/reps/weight and the rest to take between sets.

use super::Exercise;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Workout plan as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Workout {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub workout_exercises: Vec<WorkoutExercise>,
}

/// One exercise's planned parameters within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutExercise {
    #[serde(default)]
    pub id: Option<i64>,
    pub exercise: Exercise,
    #[serde(default)]
    pub planned_sets: Option<u32>,
    #[serde(default)]
    pub planned_reps: Option<u32>,
    #[serde(default)]
    pub planned_weight: Option<f64>,
    #[serde(default)]
    pub rest_seconds: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl WorkoutExercise {
    /// Number of sets to perform; a missing or zero plan counts as one set.
    pub fn set_count(&self) -> usize {
        self.planned_sets.unwrap_or(0).max(1) as usize
    }

    /// Rest after a set, falling back to `default_secs` when unset or zero.
    pub fn rest_secs(&self, default_secs: u32) -> u32 {
        match self.rest_seconds {
            Some(secs) if secs > 0 => secs,
            _ => default_secs,
        }
    }
}

/// Response of `GET /api/workouts/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutList {
    #[serde(default)]
    pub workouts: Vec<Workout>,
    #[serde(default)]
    pub total: usize,
}

/// Body of `POST /api/workouts/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewWorkout {
    pub name: String,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `PUT /api/workouts/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkoutUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Planned exercise attached to a workout via
/// `POST /api/workouts/{id}/exercises`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub exercise_id: i64,
    pub planned_sets: Option<u32>,
    pub planned_reps: Option<u32>,
    pub planned_weight: Option<f64>,
    pub rest_seconds: Option<u32>,
    pub notes: Option<String>,
}

/// A workout being composed in the editor, before it exists on the backend.
#[derive(Debug, Clone, Default)]
pub struct WorkoutDraft {
    pub name: String,
    pub exercises: Vec<PlannedExercise>,
}
