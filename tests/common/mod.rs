// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use gym_session_client::config::Config;
use gym_session_client::db::{KeyValueStore, MemoryStore};
use gym_session_client::error::AppError;
use gym_session_client::middleware::auth::SessionHandle;
use gym_session_client::models::{
    DashboardData, Exercise, LoginResponse, NewUser, NewWorkout, PlannedExercise, SetLog, User,
    Workout, WorkoutExercise, WorkoutList, WorkoutUpdate,
};
use gym_session_client::services::{GymApi, LiveWorkout, ManualScheduler, Scheduler};
use gym_session_client::ClientContext;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What `todays_workout` answers with.
#[allow(dead_code)]
#[derive(Clone)]
pub enum TodayResponse {
    Plan(Option<Workout>),
    NotFound,
    ServerError,
}

/// In-memory stand-in for the backend.
pub struct FakeApi {
    pub today: Mutex<TodayResponse>,
    pub today_calls: AtomicUsize,
    /// When set, `todays_workout` signals `today_started` and waits here.
    pub today_gate: Mutex<Option<Arc<Notify>>>,
    pub today_started: Notify,
    /// When set, the next `create_log` signals `log_started` and waits here.
    pub log_gate: Mutex<Option<Arc<Notify>>>,
    pub log_started: Notify,

    pub fail_create_log: AtomicBool,
    pub fail_batch: AtomicBool,
    pub fail_login: AtomicBool,
    pub fail_register: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_dashboard: AtomicBool,
    pub fail_search: AtomicBool,
    pub fail_add_exercises: AtomicBool,

    pub created_logs: Mutex<Vec<SetLog>>,
    pub batches: Mutex<Vec<(i64, i64, Vec<SetLog>)>>,
    pub search_calls: Mutex<Vec<String>>,
    pub registered: Mutex<Vec<NewUser>>,
    pub attached: Mutex<Vec<(i64, Vec<PlannedExercise>)>>,
    pub workouts: Mutex<Vec<Workout>>,
    pub dashboard: Mutex<DashboardData>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            today: Mutex::new(TodayResponse::Plan(None)),
            today_calls: AtomicUsize::new(0),
            today_gate: Mutex::new(None),
            today_started: Notify::new(),
            log_gate: Mutex::new(None),
            log_started: Notify::new(),
            fail_create_log: AtomicBool::new(false),
            fail_batch: AtomicBool::new(false),
            fail_login: AtomicBool::new(false),
            fail_register: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            fail_dashboard: AtomicBool::new(false),
            fail_search: AtomicBool::new(false),
            fail_add_exercises: AtomicBool::new(false),
            created_logs: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
            search_calls: Mutex::new(Vec::new()),
            registered: Mutex::new(Vec::new()),
            attached: Mutex::new(Vec::new()),
            workouts: Mutex::new(Vec::new()),
            dashboard: Mutex::new(DashboardData::default()),
        }
    }
}

#[allow(dead_code)]
impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_today(workout: Option<Workout>) -> Arc<Self> {
        let api = Self::default();
        *api.today.lock().unwrap() = TodayResponse::Plan(workout);
        Arc::new(api)
    }

    pub fn set_today(&self, response: TodayResponse) {
        *self.today.lock().unwrap() = response;
    }

    pub fn created_logs(&self) -> Vec<SetLog> {
        self.created_logs.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<(i64, i64, Vec<SetLog>)> {
        self.batches.lock().unwrap().clone()
    }

    fn fails(flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }
}

fn server_error() -> AppError {
    AppError::Api {
        status: 500,
        detail: "Internal Server Error".to_string(),
    }
}

#[async_trait]
impl GymApi for FakeApi {
    async fn login(&self, email: &str, _password: &str) -> Result<LoginResponse, AppError> {
        if Self::fails(&self.fail_login) {
            return Err(AppError::Unauthorized);
        }
        Ok(LoginResponse {
            access_token: format!("token-for-{}", email),
            token_type: Some("bearer".to_string()),
            user: user(1, email),
        })
    }

    async fn register(&self, new_user: &NewUser) -> Result<User, AppError> {
        if Self::fails(&self.fail_register) {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }
        self.registered.lock().unwrap().push(new_user.clone());
        Ok(user(1, &new_user.email))
    }

    async fn current_user(&self) -> Result<User, AppError> {
        let mut u = user(1, "me@example.com");
        u.username = "refreshed".to_string();
        Ok(u)
    }

    async fn list_workouts(&self, _user_id: i64) -> Result<WorkoutList, AppError> {
        if Self::fails(&self.fail_list) {
            return Err(server_error());
        }
        let workouts = self.workouts.lock().unwrap().clone();
        Ok(WorkoutList {
            total: workouts.len(),
            workouts,
        })
    }

    async fn get_workout(&self, workout_id: i64) -> Result<Workout, AppError> {
        self.workouts
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.id == workout_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))
    }

    async fn create_workout(&self, new: &NewWorkout) -> Result<Workout, AppError> {
        let mut workouts = self.workouts.lock().unwrap();
        let created = Workout {
            id: 100 + workouts.len() as i64,
            name: new.name.clone(),
            date: None,
            notes: None,
            user_id: Some(new.user_id),
            workout_exercises: Vec::new(),
        };
        workouts.push(created.clone());
        Ok(created)
    }

    async fn update_workout(
        &self,
        workout_id: i64,
        update: &WorkoutUpdate,
    ) -> Result<Workout, AppError> {
        let mut workouts = self.workouts.lock().unwrap();
        let workout = workouts
            .iter_mut()
            .find(|w| w.id == workout_id)
            .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))?;
        if let Some(name) = &update.name {
            workout.name = name.clone();
        }
        Ok(workout.clone())
    }

    async fn delete_workout(&self, workout_id: i64) -> Result<(), AppError> {
        let mut workouts = self.workouts.lock().unwrap();
        let before = workouts.len();
        workouts.retain(|w| w.id != workout_id);
        if workouts.len() == before {
            return Err(AppError::NotFound("Workout not found".to_string()));
        }
        Ok(())
    }

    async fn add_exercises_to_workout(
        &self,
        workout_id: i64,
        exercises: &[PlannedExercise],
    ) -> Result<(), AppError> {
        if Self::fails(&self.fail_add_exercises) {
            return Err(AppError::BadRequest("Exercise 999 not found".to_string()));
        }
        self.attached
            .lock()
            .unwrap()
            .push((workout_id, exercises.to_vec()));
        let mut workouts = self.workouts.lock().unwrap();
        if let Some(w) = workouts.iter_mut().find(|w| w.id == workout_id) {
            for planned in exercises {
                w.workout_exercises.push(entry(
                    planned.exercise_id,
                    planned.planned_sets.unwrap_or(1),
                    planned.rest_seconds,
                ));
            }
        }
        Ok(())
    }

    async fn todays_workout(&self, _user_id: i64) -> Result<Option<Workout>, AppError> {
        self.today_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.today_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            self.today_started.notify_one();
            gate.notified().await;
        }

        let response = self.today.lock().unwrap().clone();
        match response {
            TodayResponse::Plan(workout) => Ok(workout),
            TodayResponse::NotFound => Err(AppError::NotFound("No workout today".to_string())),
            TodayResponse::ServerError => Err(server_error()),
        }
    }

    async fn search_exercises(&self, query: &str) -> Result<Vec<Exercise>, AppError> {
        self.search_calls.lock().unwrap().push(query.to_string());
        if Self::fails(&self.fail_search) {
            return Err(server_error());
        }
        Ok(vec![exercise(1, &format!("{} press", query))])
    }

    async fn create_log(&self, _user_id: i64, log: &SetLog) -> Result<(), AppError> {
        // The outcome is decided when the request goes out.
        let fail = Self::fails(&self.fail_create_log);

        let gate = self.log_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.log_started.notify_one();
            gate.notified().await;
        }

        if fail {
            return Err(AppError::Network("connection reset".to_string()));
        }
        self.created_logs.lock().unwrap().push(log.clone());
        Ok(())
    }

    async fn add_logs_to_workout(
        &self,
        user_id: i64,
        workout_id: i64,
        logs: &[SetLog],
    ) -> Result<(), AppError> {
        if Self::fails(&self.fail_batch) {
            return Err(server_error());
        }
        self.batches
            .lock()
            .unwrap()
            .push((user_id, workout_id, logs.to_vec()));
        Ok(())
    }

    async fn dashboard(&self, _user_id: i64) -> Result<DashboardData, AppError> {
        if Self::fails(&self.fail_dashboard) {
            return Err(server_error());
        }
        Ok(self.dashboard.lock().unwrap().clone())
    }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn user(id: i64, email: &str) -> User {
    User {
        id,
        username: "lifter".to_string(),
        email: email.to_string(),
        gender: None,
        birthdate: None,
        height_cm: None,
        weight_kg: None,
        body_fat_percentage: None,
        activity_level: None,
        goal: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn exercise(id: i64, name: &str) -> Exercise {
    Exercise {
        id: Some(id),
        name: name.to_string(),
        description: None,
        muscle_group: None,
        equipment: None,
        difficulty: None,
        is_cardio: false,
        default_rest_seconds: None,
    }
}

pub fn entry(exercise_id: i64, planned_sets: u32, rest_seconds: Option<u32>) -> WorkoutExercise {
    WorkoutExercise {
        id: None,
        exercise: exercise(exercise_id, &format!("Exercise {}", exercise_id)),
        planned_sets: Some(planned_sets),
        planned_reps: Some(10),
        planned_weight: Some(40.0),
        rest_seconds,
        notes: None,
    }
}

/// Workout whose exercises have ids 10, 11, ... with the given set counts
/// and rest durations.
pub fn workout(id: i64, plan: &[(u32, Option<u32>)]) -> Workout {
    Workout {
        id,
        name: format!("Workout {}", id),
        date: None,
        notes: None,
        user_id: Some(1),
        workout_exercises: plan
            .iter()
            .enumerate()
            .map(|(i, &(sets, rest))| entry(10 + i as i64, sets, rest))
            .collect(),
    }
}

/// Session handle already logged in as user 1.
pub fn logged_in() -> SessionHandle {
    let session = SessionHandle::new();
    session.set(
        Some("test-token".to_string()),
        Some(user(1, "lifter@example.com")),
    );
    session
}

/// Everything a live-session test needs to poke at.
#[allow(dead_code)]
pub struct Harness {
    pub api: Arc<FakeApi>,
    pub storage: Arc<MemoryStore>,
    pub scheduler: ManualScheduler,
    pub session: SessionHandle,
    pub live: LiveWorkout,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(api: Arc<FakeApi>) -> Self {
        Self::with_storage(api, Arc::new(MemoryStore::new()))
    }

    pub fn with_storage(api: Arc<FakeApi>, storage: Arc<MemoryStore>) -> Self {
        let scheduler = ManualScheduler::new();
        let session = logged_in();
        let live = LiveWorkout::restore(
            api.clone(),
            session.clone(),
            Arc::new(scheduler.clone()) as Arc<dyn Scheduler>,
            storage.clone() as Arc<dyn KeyValueStore>,
            60,
        );
        Self {
            api,
            storage,
            scheduler,
            session,
            live,
        }
    }

    /// Position (status, exercise index, set index).
    pub fn position(
        &self,
    ) -> (
        gym_session_client::services::SessionStatus,
        usize,
        usize,
    ) {
        let s = self.live.snapshot();
        (s.status, s.current_exercise_index, s.current_set_index)
    }
}

/// Client context over the fake backend and in-memory storage.
#[allow(dead_code)]
pub fn test_context(api: Arc<FakeApi>, storage: Arc<MemoryStore>) -> ClientContext {
    ClientContext::with_parts(
        Config::test_default(),
        api,
        storage,
        Arc::new(ManualScheduler::new()),
        SessionHandle::new(),
    )
}
