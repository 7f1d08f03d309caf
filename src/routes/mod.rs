// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application routes and the authentication guard run before navigation.
//!
//! Pure logic: no rendering, no history API.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Workouts,
    NewWorkout,
    WorkoutEdit(i64),
    History,
    Profile,
    Stats,
    LiveWorkout,
    /// Any path that matches no route
    NotFound,
}

/// Result of the navigation guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Route),
}

impl Route {
    /// Parse a URL path. `/` is the login page.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/login" => Self::Login,
            "/home" => Self::Home,
            "/workouts" => Self::Workouts,
            "/new-workout" => Self::NewWorkout,
            "/history" => Self::History,
            "/profile" => Self::Profile,
            "/stats" => Self::Stats,
            "/liveworkout" => Self::LiveWorkout,
            other => other
                .strip_prefix("/workouts/edit/")
                .and_then(|id| id.parse().ok())
                .map(Self::WorkoutEdit)
                .unwrap_or(Self::NotFound),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/home".to_string(),
            Self::Login => "/login".to_string(),
            Self::Workouts => "/workouts".to_string(),
            Self::NewWorkout => "/new-workout".to_string(),
            Self::WorkoutEdit(id) => format!("/workouts/edit/{}", id),
            Self::History => "/history".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Stats => "/stats".to_string(),
            Self::LiveWorkout => "/liveworkout".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::NotFound)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Decide whether navigation to `to` may proceed.
pub fn guard(to: Route, authenticated: bool) -> Navigation {
    match to {
        Route::NotFound if authenticated => Navigation::Redirect(Route::Home),
        Route::NotFound => Navigation::Redirect(Route::Login),
        Route::Login if authenticated => Navigation::Redirect(Route::Home),
        route if route.requires_auth() && !authenticated => Navigation::Redirect(Route::Login),
        _ => Navigation::Proceed,
    }
}

/// Resolve a path to the route that will actually be shown.
pub fn resolve(path: &str, authenticated: bool) -> Route {
    let route = Route::from_path(path);
    match guard(route, authenticated) {
        Navigation::Proceed => route,
        Navigation::Redirect(target) => target,
    }
}
