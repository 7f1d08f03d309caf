//! Exercise catalog search.

use crate::models::Exercise;
use crate::services::api::GymApi;
use std::sync::{Arc, Mutex, MutexGuard};

/// Queries shorter than this clear the results without a request.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Default)]
struct SearchState {
    results: Vec<Exercise>,
    is_loading: bool,
}

pub struct ExerciseSearch {
    api: Arc<dyn GymApi>,
    state: Mutex<SearchState>,
}

impl ExerciseSearch {
    pub fn new(api: Arc<dyn GymApi>) -> Self {
        Self {
            api,
            state: Mutex::new(SearchState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn results(&self) -> Vec<Exercise> {
        self.state().results.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub async fn search(&self, query: &str) {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            self.clear();
            return;
        }

        self.state().is_loading = true;
        let result = self.api.search_exercises(query).await;

        let mut state = self.state();
        state.is_loading = false;
        match result {
            Ok(results) => state.results = results,
            Err(e) => {
                tracing::warn!(query, error = %e, "Error searching exercises");
                state.results.clear();
            }
        }
    }

    pub fn clear(&self) {
        self.state().results.clear();
    }
}
