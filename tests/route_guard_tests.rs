// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Navigation guard tests.

use gym_session_client::db::MemoryStore;
use gym_session_client::routes::{guard, resolve, Navigation, Route};
use std::sync::Arc;

mod common;
use common::{test_context, FakeApi};

const PROTECTED: &[&str] = &[
    "/home",
    "/workouts",
    "/new-workout",
    "/workouts/edit/3",
    "/history",
    "/profile",
    "/stats",
    "/liveworkout",
];

#[test]
fn test_protected_routes_redirect_to_login() {
    for path in PROTECTED {
        assert_eq!(resolve(path, false), Route::Login, "path {}", path);
    }
}

#[test]
fn test_protected_routes_proceed_when_authenticated() {
    for path in PROTECTED {
        let route = Route::from_path(path);
        assert_eq!(guard(route, true), Navigation::Proceed, "path {}", path);
        assert_eq!(resolve(path, true), route);
    }
}

#[test]
fn test_login_redirects_home_when_authenticated() {
    assert_eq!(resolve("/login", true), Route::Home);
    assert_eq!(resolve("/", true), Route::Home);
    assert_eq!(resolve("/login", false), Route::Login);
}

#[test]
fn test_unknown_path_falls_back() {
    assert_eq!(
        guard(Route::from_path("/does/not/exist"), false),
        Navigation::Redirect(Route::Login)
    );
    assert_eq!(resolve("/does/not/exist", true), Route::Home);
}

#[tokio::test]
async fn test_guard_follows_auth_store() {
    let ctx = test_context(FakeApi::new(), Arc::new(MemoryStore::new()));
    assert_eq!(resolve("/liveworkout", ctx.auth.is_authenticated()), Route::Login);

    ctx.auth.login("a@b.com", "hunter22").await.unwrap();
    assert_eq!(
        resolve("/liveworkout", ctx.auth.is_authenticated()),
        Route::LiveWorkout
    );

    ctx.auth.logout().unwrap();
    assert_eq!(resolve("/stats", ctx.auth.is_authenticated()), Route::Login);
}
