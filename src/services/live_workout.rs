// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live workout session state machine.
//!
//! Tracks progression through today's workout (exercise, then set), runs the
//! rest countdown through an injected [`Scheduler`], persists the session
//! after every change, and keeps set logs that failed to send in a backlog
//! for a later batch flush.
//!
//! States: `idle`, `loading`, `error`, `exercising`, `resting`, `finished`.
//! Progression never waits on the network: a set is recorded and the session
//! advances first, and the send outcome only decides backlog membership.
//!
//! Stale responses are dropped using a generation counter that is bumped on
//! every reset and every new fetch.

use crate::db::keys;
use crate::db::local::{load_json, save_json, KeyValueStore};
use crate::error::AppError;
use crate::middleware::auth::SessionHandle;
use crate::models::{PendingLog, SetInput, SetLog, Workout, WorkoutExercise};
use crate::services::api::GymApi;
use crate::services::scheduler::{Scheduler, Tick, TimerHandle};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Error,
    Exercising,
    Resting,
    Finished,
}

impl SessionStatus {
    /// A workout is in progress and must not be clobbered.
    pub fn is_active(self) -> bool {
        matches!(self, SessionStatus::Exercising | SessionStatus::Resting)
    }
}

/// Persisted session snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    pub workout: Option<Workout>,
    pub status: SessionStatus,
    pub current_exercise_index: usize,
    pub current_set_index: usize,
    /// Seconds of rest remaining
    pub rest_timer: u32,
    /// Set logs not yet confirmed by the backend
    pub logs: Vec<PendingLog>,
}

impl Session {
    pub fn current_exercise(&self) -> Option<&WorkoutExercise> {
        self.workout
            .as_ref()?
            .workout_exercises
            .get(self.current_exercise_index)
    }

    fn exercise_count(&self) -> usize {
        self.workout
            .as_ref()
            .map_or(0, |w| w.workout_exercises.len())
    }

    /// Move past the current set: next set of this exercise, else first set
    /// of the next exercise, else `finished`.
    fn advance(&mut self) {
        let sets = self.current_exercise().map_or(1, |e| e.set_count());
        if self.current_set_index + 1 < sets {
            self.current_set_index += 1;
        } else {
            self.current_exercise_index += 1;
            self.current_set_index = 0;
        }

        self.status = if self.current_exercise_index >= self.exercise_count() {
            SessionStatus::Finished
        } else {
            SessionStatus::Exercising
        };
    }

    /// Add to the backlog, replacing any pending entry for the same set.
    fn push_log(&mut self, log: SetLog) -> Uuid {
        let entry = PendingLog::new(log);
        let id = entry.id;
        match self.logs.iter_mut().find(|p| p.log.same_set(&entry.log)) {
            Some(existing) => *existing = entry,
            None => self.logs.push(entry),
        }
        id
    }

    fn reset(&mut self) {
        *self = Session::default();
    }
}

struct Machine {
    session: Session,
    timer: Option<TimerHandle>,
    /// Identifies the live countdown; older timers stop on their next tick.
    timer_id: u64,
    generation: u64,
}

impl Machine {
    fn cancel_timer(&mut self) {
        self.timer = None;
    }
}

struct Shared {
    machine: Mutex<Machine>,
    storage: Arc<dyn KeyValueStore>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Machine> {
        self.machine.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = save_json(self.storage.as_ref(), keys::LIVE_WORKOUT, session) {
            tracing::warn!(error = %e, "Failed to persist live workout session");
        }
    }

    fn tick(&self, timer_id: u64) -> Tick {
        let mut machine = self.lock();
        if machine.timer_id != timer_id
            || machine.timer.is_none()
            || machine.session.status != SessionStatus::Resting
        {
            return Tick::Stop;
        }

        machine.session.rest_timer = machine.session.rest_timer.saturating_sub(1);
        let done = machine.session.rest_timer == 0;
        if done {
            machine.cancel_timer();
        }
        self.persist(&machine.session);

        if done {
            Tick::Stop
        } else {
            Tick::Continue
        }
    }
}

/// The live workout session.
pub struct LiveWorkout {
    api: Arc<dyn GymApi>,
    auth: SessionHandle,
    scheduler: Arc<dyn Scheduler>,
    shared: Arc<Shared>,
    default_rest_secs: u32,
}

impl LiveWorkout {
    /// Rehydrate the persisted session (if any) and re-arm a countdown that
    /// was running when it was saved.
    pub fn restore(
        api: Arc<dyn GymApi>,
        auth: SessionHandle,
        scheduler: Arc<dyn Scheduler>,
        storage: Arc<dyn KeyValueStore>,
        default_rest_secs: u32,
    ) -> Self {
        let mut session: Session = load_json(storage.as_ref(), keys::LIVE_WORKOUT).unwrap_or_default();
        // A fetch cannot survive a restart.
        if session.status == SessionStatus::Loading {
            session.status = SessionStatus::Idle;
        }

        let live = Self {
            api,
            auth,
            scheduler,
            shared: Arc::new(Shared {
                machine: Mutex::new(Machine {
                    session,
                    timer: None,
                    timer_id: 0,
                    generation: 0,
                }),
                storage,
            }),
            default_rest_secs,
        };
        live.resume_rest();
        live
    }

    /// Run `f` on the machine and persist the resulting session.
    fn update<R>(&self, f: impl FnOnce(&mut Machine) -> R) -> R {
        let mut machine = self.shared.lock();
        let result = f(&mut machine);
        self.shared.persist(&machine.session);
        result
    }

    /// Start a fresh countdown, cancelling any previous one first.
    fn arm_countdown(&self, machine: &mut Machine) {
        machine.cancel_timer();
        machine.timer_id += 1;
        let timer_id = machine.timer_id;
        let shared = Arc::clone(&self.shared);
        let handle = self
            .scheduler
            .every_second(Box::new(move || shared.tick(timer_id)));
        machine.timer = Some(handle);
    }

    // ─── Read access ─────────────────────────────────────────────

    pub fn snapshot(&self) -> Session {
        self.shared.lock().session.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.shared.lock().session.status
    }

    pub fn current_exercise(&self) -> Option<WorkoutExercise> {
        self.shared.lock().session.current_exercise().cloned()
    }

    pub fn pending_logs(&self) -> usize {
        self.shared.lock().session.logs.len()
    }

    /// True while a countdown timer is armed.
    pub fn is_counting_down(&self) -> bool {
        self.shared.lock().timer.is_some()
    }

    // ─── Transitions ─────────────────────────────────────────────

    /// Load today's workout from the backend.
    ///
    /// Not-found is the valid "no plan today" state and lands in `idle`;
    /// any other failure lands in `error`.
    pub async fn fetch_todays_workout(&self) -> SessionStatus {
        let generation = self.update(|m| {
            m.generation += 1;
            m.session.status = SessionStatus::Loading;
            m.generation
        });

        let Some(user_id) = self.auth.user_id() else {
            tracing::warn!("Cannot fetch today's workout without an authenticated user");
            return self.update(|m| {
                m.session.workout = None;
                m.session.status = SessionStatus::Error;
                m.session.status
            });
        };

        let result = self.api.todays_workout(user_id).await;

        self.update(|m| {
            if m.generation != generation {
                tracing::debug!(user_id, "Discarding stale today's workout response");
                return m.session.status;
            }

            m.cancel_timer();
            m.session.rest_timer = 0;
            match result {
                Ok(workout) => {
                    tracing::info!(
                        user_id,
                        workout_id = ?workout.as_ref().map(|w| w.id),
                        "Fetched today's workout"
                    );
                    m.session.workout = workout;
                    m.session.status = SessionStatus::Idle;
                }
                Err(e) if e.is_not_found() => {
                    tracing::info!(user_id, "No workout scheduled today");
                    m.session.workout = None;
                    m.session.status = SessionStatus::Idle;
                }
                Err(e) => {
                    tracing::error!(user_id, error = %e, "Failed to fetch today's workout");
                    m.session.workout = None;
                    m.session.status = SessionStatus::Error;
                }
            }
            m.session.status
        })
    }

    /// Begin the workout at its first set.
    pub fn start_workout(&self) -> Result<(), AppError> {
        self.update(|m| {
            let exercises = m.session.exercise_count();
            if m.session.workout.is_none() {
                return Err(AppError::InvalidState("No workout loaded".to_string()));
            }
            if exercises == 0 {
                return Err(AppError::InvalidState(
                    "Workout has no exercises".to_string(),
                ));
            }
            if m.session.status == SessionStatus::Loading {
                return Err(AppError::InvalidState(
                    "Workout is still loading".to_string(),
                ));
            }

            m.cancel_timer();
            m.session.current_exercise_index = 0;
            m.session.current_set_index = 0;
            m.session.rest_timer = 0;
            m.session.status = SessionStatus::Exercising;
            Ok(())
        })
    }

    /// Start resting for the current exercise's configured duration.
    pub fn start_rest(&self) -> Result<(), AppError> {
        let mut machine = self.shared.lock();
        if !machine.session.status.is_active() {
            return Err(AppError::InvalidState(format!(
                "Cannot rest while {:?}",
                machine.session.status
            )));
        }
        let rest = machine
            .session
            .current_exercise()
            .map(|e| e.rest_secs(self.default_rest_secs))
            .ok_or_else(|| AppError::InvalidState("No current exercise".to_string()))?;

        machine.session.status = SessionStatus::Resting;
        machine.session.rest_timer = rest;
        self.arm_countdown(&mut machine);
        self.shared.persist(&machine.session);
        Ok(())
    }

    /// Re-arm the countdown from the remaining rest, e.g. after a reload.
    /// Replaces any countdown already running. No-op unless resting with
    /// time left.
    pub fn resume_rest(&self) {
        let mut machine = self.shared.lock();
        if machine.session.status == SessionStatus::Resting && machine.session.rest_timer > 0 {
            tracing::debug!(
                rest_timer = machine.session.rest_timer,
                "Resuming rest countdown"
            );
            self.arm_countdown(&mut machine);
        }
    }

    /// Record the current set and advance.
    ///
    /// The log is sent immediately; if the send fails the record stays in the
    /// backlog for [`LiveWorkout::flush_logs`]. The session advances either way.
    pub async fn save_log_and_continue(&self, input: SetInput) -> Result<SessionStatus, AppError> {
        let (entry_id, log, status) = self.update(|m| {
            if !m.session.status.is_active() {
                return Err(AppError::InvalidState(format!(
                    "Cannot log a set while {:?}",
                    m.session.status
                )));
            }
            let workout_id = m
                .session
                .workout
                .as_ref()
                .map(|w| w.id)
                .ok_or_else(|| AppError::InvalidState("No workout loaded".to_string()))?;
            let exercise_id = m
                .session
                .current_exercise()
                .ok_or_else(|| AppError::InvalidState("No current exercise".to_string()))?
                .exercise
                .id
                .ok_or_else(|| AppError::InvalidState("Exercise has no id".to_string()))?;

            let log = SetLog {
                exercise_id,
                workout_id,
                set_number: m.session.current_set_index as u32 + 1,
                reps: input.reps,
                weight: input.weight,
            };
            let entry_id = m.session.push_log(log.clone());

            m.cancel_timer();
            m.session.rest_timer = 0;
            m.session.advance();
            Ok((entry_id, log, m.session.status))
        })?;

        self.send_log(entry_id, &log).await;
        Ok(status)
    }

    async fn send_log(&self, entry_id: Uuid, log: &SetLog) {
        let Some(user_id) = self.auth.user_id() else {
            tracing::warn!(
                workout_id = log.workout_id,
                "No authenticated user, set log kept in backlog"
            );
            return;
        };

        match self.api.create_log(user_id, log).await {
            Ok(()) => self.update(|m| m.session.logs.retain(|p| p.id != entry_id)),
            Err(e) => tracing::warn!(
                user_id,
                workout_id = log.workout_id,
                exercise_id = log.exercise_id,
                set_number = log.set_number,
                error = %e,
                "Failed to send set log, kept in backlog"
            ),
        }
    }

    /// While resting: end the rest early. While exercising: log a zero set
    /// and advance. Otherwise a no-op.
    pub async fn skip_to_next(&self) -> Result<SessionStatus, AppError> {
        let prior = self.update(|m| {
            let prior = m.session.status;
            if prior == SessionStatus::Resting {
                m.cancel_timer();
                m.session.rest_timer = 0;
                m.session.status = SessionStatus::Exercising;
            }
            prior
        });

        match prior {
            SessionStatus::Resting => Ok(SessionStatus::Exercising),
            SessionStatus::Exercising => self.save_log_and_continue(SetInput::default()).await,
            other => Ok(other),
        }
    }

    /// Jump to the next exercise without logging the remaining sets.
    pub fn next_exercise_now(&self) -> Result<SessionStatus, AppError> {
        self.update(|m| {
            if !m.session.status.is_active() {
                return Err(AppError::InvalidState(format!(
                    "Cannot skip an exercise while {:?}",
                    m.session.status
                )));
            }
            m.cancel_timer();
            m.session.rest_timer = 0;
            m.session.current_set_index = 0;
            if m.session.current_exercise_index + 1 < m.session.exercise_count() {
                m.session.current_exercise_index += 1;
                m.session.status = SessionStatus::Exercising;
            } else {
                m.session.current_exercise_index = m.session.exercise_count();
                m.session.status = SessionStatus::Finished;
            }
            Ok(m.session.status)
        })
    }

    /// Full reset: no timer, no workout, idle, empty backlog.
    pub fn stop_workout(&self) {
        self.update(|m| {
            m.cancel_timer();
            m.generation += 1;
            m.session.reset();
        });
        tracing::info!("Live workout stopped");
    }

    /// Retry the whole backlog as one batch call. Returns how many logs were
    /// delivered; on failure the backlog is left as it was.
    pub async fn flush_logs(&self) -> Result<usize, AppError> {
        let batch: Vec<PendingLog> = self.shared.lock().session.logs.clone();
        if batch.is_empty() {
            return Ok(0);
        }

        let user_id = self.auth.user_id().ok_or(AppError::Unauthorized)?;
        let workout_id = batch[0].log.workout_id;
        let logs: Vec<SetLog> = batch.iter().map(|p| p.log.clone()).collect();

        if let Err(e) = self
            .api
            .add_logs_to_workout(user_id, workout_id, &logs)
            .await
        {
            tracing::error!(
                user_id,
                workout_id,
                pending = logs.len(),
                error = %e,
                "Failed to flush log backlog"
            );
            return Err(e);
        }

        self.update(|m| {
            m.session
                .logs
                .retain(|p| !batch.iter().any(|sent| sent.id == p.id));
        });
        tracing::info!(user_id, workout_id, sent = logs.len(), "Flushed log backlog");
        Ok(logs.len())
    }

    /// Reconcile the persisted session with the backend's "today" workout.
    ///
    /// Leaves an in-progress session untouched. Otherwise, if the workout
    /// identity changed, the stale session is discarded and the fresh
    /// workout adopted at `idle`. No plan today always lands in `idle`.
    pub async fn validate_todays_workout(&self) {
        let generation = {
            let machine = self.shared.lock();
            if machine.session.status.is_active() {
                tracing::debug!("Workout in progress, keeping session");
                return;
            }
            machine.generation
        };

        let Some(user_id) = self.auth.user_id() else {
            self.update(|m| {
                m.session.status = SessionStatus::Idle;
                m.session.workout = None;
            });
            return;
        };

        let result = self.api.todays_workout(user_id).await;

        self.update(|m| {
            if m.generation != generation || m.session.status.is_active() {
                tracing::debug!(user_id, "Session changed during revalidation, ignoring");
                return;
            }

            let fresh = match result {
                Ok(fresh) => fresh,
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Error fetching today's workout");
                    m.session.status = SessionStatus::Idle;
                    m.session.workout = None;
                    return;
                }
            };

            let current_id = m.session.workout.as_ref().map(|w| w.id);
            let fresh_id = fresh.as_ref().map(|w| w.id);
            match (current_id, fresh_id) {
                (Some(current), Some(latest)) if current == latest => return,
                (None, None) => {
                    // No plan today; leaves `error` too.
                    m.session.status = SessionStatus::Idle;
                    return;
                }
                _ => {}
            }

            tracing::info!(
                user_id,
                stale = ?current_id,
                fresh = ?fresh_id,
                "Replacing stale live workout session"
            );
            m.cancel_timer();
            m.generation += 1;
            m.session.reset();
            m.session.workout = fresh;
        });
    }
}

impl Drop for LiveWorkout {
    fn drop(&mut self) {
        // A running countdown keeps the shared state alive.
        self.shared.lock().cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Exercise;

    fn workout(sets: &[u32]) -> Workout {
        Workout {
            id: 1,
            name: "Test".to_string(),
            date: None,
            notes: None,
            user_id: Some(1),
            workout_exercises: sets
                .iter()
                .enumerate()
                .map(|(i, &n)| WorkoutExercise {
                    id: None,
                    exercise: Exercise {
                        id: Some(i as i64 + 10),
                        name: format!("Exercise {}", i),
                        description: None,
                        muscle_group: None,
                        equipment: None,
                        difficulty: None,
                        is_cardio: false,
                        default_rest_seconds: None,
                    },
                    planned_sets: Some(n),
                    planned_reps: Some(8),
                    planned_weight: None,
                    rest_seconds: None,
                    notes: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_advance_walks_sets_then_exercises() {
        let mut session = Session {
            workout: Some(workout(&[2, 1])),
            status: SessionStatus::Exercising,
            ..Session::default()
        };

        session.advance();
        assert_eq!(
            (session.status, session.current_exercise_index, session.current_set_index),
            (SessionStatus::Exercising, 0, 1)
        );
        session.advance();
        assert_eq!(
            (session.status, session.current_exercise_index, session.current_set_index),
            (SessionStatus::Exercising, 1, 0)
        );
        session.advance();
        assert_eq!(session.status, SessionStatus::Finished);
        assert_eq!(session.current_exercise_index, 2);
    }

    #[test]
    fn test_push_log_replaces_same_set() {
        let mut session = Session::default();
        let log = SetLog {
            exercise_id: 10,
            workout_id: 1,
            set_number: 1,
            reps: 5,
            weight: 50.0,
        };
        let first = session.push_log(log.clone());
        let second = session.push_log(SetLog { reps: 6, ..log.clone() });
        session.push_log(SetLog { set_number: 2, ..log });

        assert_ne!(first, second);
        assert_eq!(session.logs.len(), 2);
        assert_eq!(session.logs[0].id, second);
        assert_eq!(session.logs[0].log.reps, 6);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Exercising).unwrap();
        assert_eq!(json, "\"exercising\"");
    }
}
