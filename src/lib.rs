// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gym session client: auth, workout plans, exercise search and the live
//! workout session, against the gym tracker REST backend.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::{FileStore, KeyValueStore};
use error::AppError;
use middleware::auth::SessionHandle;
use services::{
    ApiClient, AuthStore, DashboardStore, ExerciseSearch, GymApi, LiveWorkout, Scheduler,
    TokioScheduler, WorkoutStore,
};
use std::sync::Arc;
use std::time::Duration;

/// Shared client state, built once at the composition root and handed to
/// whatever drives the UI.
pub struct ClientContext {
    pub config: Config,
    pub api: Arc<dyn GymApi>,
    pub auth: AuthStore,
    pub workouts: WorkoutStore,
    pub exercises: ExerciseSearch,
    pub dashboard: DashboardStore,
    pub live: LiveWorkout,
}

impl ClientContext {
    /// Production wiring: HTTP client, file-backed state, tokio timers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let session = SessionHandle::new();
        let api: Arc<dyn GymApi> = Arc::new(ApiClient::new(
            config.api_url.clone(),
            session.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?);
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.state_dir)?);
        let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::current()?);

        Ok(Self::with_parts(config, api, storage, scheduler, session))
    }

    /// Wire the stores from explicit parts. `session` must be the same handle
    /// the API client reads its bearer token from.
    pub fn with_parts(
        config: Config,
        api: Arc<dyn GymApi>,
        storage: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn Scheduler>,
        session: SessionHandle,
    ) -> Self {
        let auth = AuthStore::new(api.clone(), storage.clone(), session.clone());
        let workouts = WorkoutStore::new(api.clone(), session.clone());
        let exercises = ExerciseSearch::new(api.clone());
        let dashboard = DashboardStore::new(api.clone(), session.clone());
        let live = LiveWorkout::restore(
            api.clone(),
            session,
            scheduler,
            storage,
            config.default_rest_secs,
        );

        Self {
            config,
            api,
            auth,
            workouts,
            exercises,
            dashboard,
            live,
        }
    }

    /// Try to deliver any backlogged set logs before the context goes away.
    pub async fn shutdown(self) {
        if self.live.pending_logs() > 0 {
            if let Err(e) = self.live.flush_logs().await {
                tracing::warn!(error = %e, "Backlog not flushed at shutdown");
            }
        }
    }
}
