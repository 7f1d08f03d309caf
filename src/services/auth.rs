// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth session store: login/register/logout mirrored into local storage.

use crate::db::keys;
use crate::db::local::{load_json, save_json, KeyValueStore};
use crate::error::AppError;
use crate::middleware::auth::SessionHandle;
use crate::models::{NewUser, User};
use crate::services::api::GymApi;
use std::sync::Arc;
use validator::Validate;

const REGISTER_FAILED: &str = "Registration failed";

/// Holds the current token/user and keeps them in persisted storage.
#[derive(Clone)]
pub struct AuthStore {
    api: Arc<dyn GymApi>,
    storage: Arc<dyn KeyValueStore>,
    session: SessionHandle,
}

impl AuthStore {
    /// Create the store, rehydrating any persisted token and user into
    /// `session`.
    pub fn new(
        api: Arc<dyn GymApi>,
        storage: Arc<dyn KeyValueStore>,
        session: SessionHandle,
    ) -> Self {
        let token: Option<String> = load_json(storage.as_ref(), keys::TOKEN);
        let user: Option<User> = load_json(storage.as_ref(), keys::USER);
        if token.is_some() {
            tracing::debug!(user_id = ?user.as_ref().map(|u| u.id), "Restored auth session");
        }
        session.set(token, user);

        Self {
            api,
            storage,
            session,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.session.user_id()
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    /// Log in and persist the resulting token and user.
    ///
    /// Failures come back as [`AppError::InvalidCredentials`] carrying a
    /// message fit for display.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let response = match self.api.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                return Err(AppError::InvalidCredentials(failure_message(
                    &e,
                    AppError::GENERIC_MESSAGE,
                )));
            }
        };

        self.session
            .set(Some(response.access_token.clone()), Some(response.user.clone()));
        self.persist()?;

        tracing::info!(user_id = response.user.id, "Logged in");
        Ok(response.user)
    }

    /// Register a new account, then log in with the same credentials.
    pub async fn register(&self, new_user: NewUser) -> Result<User, AppError> {
        if let Err(errors) = new_user.validate() {
            return Err(AppError::InvalidCredentials(validation_message(&errors)));
        }

        if let Err(e) = self.api.register(&new_user).await {
            tracing::warn!(error = %e, "Registration failed");
            return Err(AppError::InvalidCredentials(failure_message(&e, REGISTER_FAILED)));
        }

        self.login(&new_user.email, &new_user.password).await
    }

    /// Drop the session from memory and storage.
    pub fn logout(&self) -> Result<(), AppError> {
        self.session.clear();
        self.storage.remove(keys::TOKEN)?;
        self.storage.remove(keys::USER)?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Re-read the current user from `GET /api/users/me`.
    pub async fn refresh_user(&self) -> Result<User, AppError> {
        let user = self.api.current_user().await?;
        self.session.set_user(user.clone());
        save_json(self.storage.as_ref(), keys::USER, &user)?;
        Ok(user)
    }

    fn persist(&self) -> Result<(), AppError> {
        if let Some(token) = self.session.token() {
            save_json(self.storage.as_ref(), keys::TOKEN, &token)?;
        }
        if let Some(user) = self.session.user() {
            save_json(self.storage.as_ref(), keys::USER, &user)?;
        }
        Ok(())
    }
}

/// Backend detail when it sent one, else `fallback`.
fn failure_message(err: &AppError, fallback: &str) -> String {
    match err {
        AppError::BadRequest(detail) | AppError::NotFound(detail) if !detail.is_empty() => {
            detail.clone()
        }
        AppError::Api { detail, .. } if !detail.is_empty() => detail.clone(),
        AppError::Unauthorized => "Incorrect email or password".to_string(),
        _ => fallback.to_string(),
    }
}

fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
