//! Per-user dashboard aggregate.

use crate::middleware::auth::SessionHandle;
use crate::models::DashboardData;
use crate::services::api::GymApi;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct DashboardState {
    data: Option<DashboardData>,
    is_loading: bool,
}

pub struct DashboardStore {
    api: Arc<dyn GymApi>,
    session: SessionHandle,
    state: Mutex<DashboardState>,
}

impl DashboardStore {
    pub fn new(api: Arc<dyn GymApi>, session: SessionHandle) -> Self {
        Self {
            api,
            session,
            state: Mutex::new(DashboardState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn data(&self) -> Option<DashboardData> {
        self.state().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    /// Refresh the dashboard. On failure the previous data is kept.
    pub async fn fetch(&self) {
        let Some(user_id) = self.session.user_id() else {
            tracing::warn!("Dashboard requested without an authenticated user");
            return;
        };

        self.state().is_loading = true;
        let result = self.api.dashboard(user_id).await;

        let mut state = self.state();
        state.is_loading = false;
        match result {
            Ok(data) => state.data = Some(data),
            Err(e) => tracing::error!(user_id, error = %e, "Failed to fetch dashboard data"),
        }
    }
}
