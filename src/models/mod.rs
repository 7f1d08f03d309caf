// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models exchanged with the gym backend.

pub mod dashboard;
pub mod exercise;
pub mod log;
pub mod user;
pub mod workout;

pub use dashboard::DashboardData;
pub use exercise::Exercise;
pub use log::{PendingLog, SetInput, SetLog};
pub use user::{ActivityLevel, Gender, Goal, LoginResponse, NewUser, User};
pub use workout::{
    NewWorkout, PlannedExercise, Workout, WorkoutDraft, WorkoutExercise, WorkoutList,
    WorkoutUpdate,
};
