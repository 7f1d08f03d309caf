// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared auth session and bearer-token request decoration.

use crate::models::User;
use reqwest::RequestBuilder;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
}

/// Current token and user, shared between the auth store and the API client.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.read().user.as_ref().map(|u| u.id)
    }

    /// A session is authenticated as soon as it holds a token.
    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn set(&self, token: Option<String>, user: Option<User>) {
        let mut state = self.write();
        state.token = token;
        state.user = user;
    }

    pub fn set_user(&self, user: User) {
        self.write().user = Some(user);
    }

    pub fn clear(&self) {
        self.set(None, None);
    }
}

/// Attach `Authorization: Bearer <token>` when the session holds a token.
pub fn with_bearer(request: RequestBuilder, session: &SessionHandle) -> RequestBuilder {
    match session.token() {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}
