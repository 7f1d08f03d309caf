// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - stores and the live session.

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod exercises;
pub mod live_workout;
pub mod scheduler;
pub mod workouts;

pub use api::{ApiClient, GymApi};
pub use auth::AuthStore;
pub use dashboard::DashboardStore;
pub use exercises::ExerciseSearch;
pub use live_workout::{LiveWorkout, Session, SessionStatus};
pub use scheduler::{ManualScheduler, Scheduler, Tick, TimerHandle, TokioScheduler};
pub use workouts::WorkoutStore;
