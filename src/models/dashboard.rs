//! Per-user dashboard aggregate.

use super::Workout;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub todays_workout: Option<Workout>,
    #[serde(default)]
    pub yesterday_skipped: bool,
}
