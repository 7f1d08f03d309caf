// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-second repeating timers, injected into the live session.
//!
//! The session never touches a clock directly. Production code uses
//! [`TokioScheduler`]; tests and headless drivers use [`ManualScheduler`] and
//! advance time explicitly.

use crate::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Returned by a tick callback to keep or stop its timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop,
}

/// Callback run once per second.
pub type TickFn = Box<dyn FnMut() -> Tick + Send + 'static>;

/// Source of repeating one-second timers.
pub trait Scheduler: Send + Sync {
    /// Start calling `tick` every second until it returns [`Tick::Stop`] or
    /// the returned handle is dropped.
    fn every_second(&self, tick: TickFn) -> TimerHandle;
}

/// Owning handle for a running timer. Dropping it cancels the timer.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel explicitly. Equivalent to dropping the handle.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Timers on a tokio runtime via `tokio::time::interval`.
#[derive(Clone)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }

    /// Bind to the runtime the caller is running on.
    pub fn current() -> Result<Self, AppError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            AppError::Internal(anyhow::anyhow!("No tokio runtime for timers: {}", e))
        })?;
        Ok(Self::new(runtime))
    }
}

impl Scheduler for TokioScheduler {
    fn every_second(&self, mut tick: TickFn) -> TimerHandle {
        let task = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // First tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tick() == Tick::Stop {
                    break;
                }
            }
        });

        let abort = task.abort_handle();
        TimerHandle::new(move || abort.abort())
    }
}

struct ManualTimer {
    tick: TickFn,
    live: Arc<AtomicBool>,
}

/// Scheduler driven by explicit [`ManualScheduler::advance`] calls.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    timers: Arc<Mutex<Vec<ManualTimer>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn timers(&self) -> MutexGuard<'_, Vec<ManualTimer>> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of timers still running.
    pub fn active_count(&self) -> usize {
        self.timers()
            .iter()
            .filter(|t| t.live.load(Ordering::SeqCst))
            .count()
    }

    /// Fire every live timer once per elapsed second.
    pub fn advance(&self, seconds: u32) {
        for _ in 0..seconds {
            // Run callbacks outside the lock; they may arm new timers.
            let mut running = std::mem::take(&mut *self.timers());
            for timer in running.iter_mut() {
                if timer.live.load(Ordering::SeqCst) && (timer.tick)() == Tick::Stop {
                    timer.live.store(false, Ordering::SeqCst);
                }
            }
            running.retain(|t| t.live.load(Ordering::SeqCst));

            let mut timers = self.timers();
            running.append(&mut timers);
            *timers = running;
        }
    }
}

impl Scheduler for ManualScheduler {
    fn every_second(&self, tick: TickFn) -> TimerHandle {
        let live = Arc::new(AtomicBool::new(true));
        self.timers().push(ManualTimer {
            tick,
            live: Arc::clone(&live),
        });
        TimerHandle::new(move || live.store(false, Ordering::SeqCst))
    }
}
