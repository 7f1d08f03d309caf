// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout catalog store: CRUD over the authenticated user's plans.

use crate::error::{ActionOutcome, AppError};
use crate::middleware::auth::SessionHandle;
use crate::models::{NewWorkout, Workout, WorkoutDraft, WorkoutUpdate};
use crate::services::api::GymApi;
use std::sync::{Arc, Mutex, MutexGuard};

const NOT_AUTHENTICATED: &str = "User not authenticated.";

#[derive(Debug, Default)]
struct CatalogState {
    workouts: Vec<Workout>,
    is_loading: bool,
}

/// Cached list of workouts plus the actions that keep it in sync.
pub struct WorkoutStore {
    api: Arc<dyn GymApi>,
    session: SessionHandle,
    state: Mutex<CatalogState>,
}

impl WorkoutStore {
    pub fn new(api: Arc<dyn GymApi>, session: SessionHandle) -> Self {
        Self {
            api,
            session,
            state: Mutex::new(CatalogState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn workouts(&self) -> Vec<Workout> {
        self.state().workouts.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    /// Reload the list. Failures are logged and leave the list empty.
    pub async fn fetch_workouts(&self) {
        {
            let mut state = self.state();
            state.is_loading = true;
            state.workouts.clear();
        }

        let Some(user_id) = self.session.user_id() else {
            tracing::error!("User not authenticated or user ID is missing");
            self.state().is_loading = false;
            return;
        };

        let result = self.api.list_workouts(user_id).await;

        let mut state = self.state();
        state.is_loading = false;
        match result {
            Ok(list) => {
                tracing::debug!(user_id, count = list.workouts.len(), "Fetched workouts");
                state.workouts = list.workouts;
            }
            Err(e) => tracing::error!(user_id, error = %e, "Error fetching workouts"),
        }
    }

    pub async fn fetch_workout(&self, workout_id: i64) -> ActionOutcome<Workout> {
        let result = self.api.get_workout(workout_id).await;
        if let Err(e) = &result {
            tracing::error!(workout_id, error = %e, "Error fetching workout");
        }
        result.into()
    }

    /// Create the workout, then attach its planned exercises.
    ///
    /// The outcome value is the new workout id.
    pub async fn create_workout(&self, draft: WorkoutDraft) -> ActionOutcome<i64> {
        let Some(user_id) = self.session.user_id() else {
            return ActionOutcome::failed(NOT_AUTHENTICATED);
        };

        let result = self.create_with_exercises(user_id, draft).await;
        match result {
            Ok(workout) => {
                let id = workout.id;
                tracing::info!(user_id, workout_id = id, "Workout created");
                self.state().workouts.push(workout);
                ActionOutcome::ok(id)
            }
            Err(e) => {
                tracing::error!(user_id, error = %e, "Error creating workout");
                ActionOutcome::failed(failure_message(&e, "Failed to save workout."))
            }
        }
    }

    async fn create_with_exercises(
        &self,
        user_id: i64,
        draft: WorkoutDraft,
    ) -> Result<Workout, AppError> {
        let payload = NewWorkout {
            name: draft.name,
            user_id,
            date: None,
            notes: None,
        };
        let mut workout = self.api.create_workout(&payload).await?;

        if !draft.exercises.is_empty() {
            self.api
                .add_exercises_to_workout(workout.id, &draft.exercises)
                .await?;
            // Pick up the attached entries; fall back to the bare workout.
            if let Ok(full) = self.api.get_workout(workout.id).await {
                workout = full;
            }
        }

        Ok(workout)
    }

    pub async fn update_workout(
        &self,
        workout_id: i64,
        update: WorkoutUpdate,
    ) -> ActionOutcome<Workout> {
        match self.api.update_workout(workout_id, &update).await {
            Ok(workout) => {
                let mut state = self.state();
                if let Some(slot) = state.workouts.iter_mut().find(|w| w.id == workout_id) {
                    *slot = workout.clone();
                }
                ActionOutcome::ok(workout)
            }
            Err(e) => {
                tracing::error!(workout_id, error = %e, "Error updating workout");
                ActionOutcome::failed(failure_message(&e, "Failed to update workout."))
            }
        }
    }

    pub async fn delete_workout(&self, workout_id: i64) -> ActionOutcome<()> {
        match self.api.delete_workout(workout_id).await {
            Ok(()) => {
                self.state().workouts.retain(|w| w.id != workout_id);
                ActionOutcome::ok(())
            }
            Err(e) => {
                tracing::error!(workout_id, error = %e, "Error deleting workout");
                ActionOutcome::failed(failure_message(&e, "Failed to delete workout."))
            }
        }
    }
}

fn failure_message(err: &AppError, fallback: &str) -> String {
    match err {
        AppError::BadRequest(detail)
        | AppError::NotFound(detail)
        | AppError::Api { detail, .. }
            if !detail.is_empty() =>
        {
            detail.clone()
        }
        _ => fallback.to_string(),
    }
}
