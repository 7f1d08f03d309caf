// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types and the outcome shape reported to calling UI code.

use serde::Serialize;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("API error (HTTP {status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Fallback message when the backend gives no detail.
    pub const GENERIC_MESSAGE: &'static str = "An error occurred";

    /// True for "resource not found", which callers treat as an empty state.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Message suitable for showing to a user.
    ///
    /// Prefers the backend's `detail` text, falling back to a generic string
    /// for transport and internal failures.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidCredentials(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Api { detail, .. } if !detail.is_empty() => detail.clone(),
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::InvalidState(msg) => msg.clone(),
            _ => Self::GENERIC_MESSAGE.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("JSON error: {}", err))
    }
}

/// Boolean-success result with an optional message, for CRUD actions whose
/// failures are logged and left to the UI to present.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionOutcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
}

impl<T> ActionOutcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            success: true,
            message: None,
            value: Some(value),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            value: None,
        }
    }
}

impl<T> From<Result<T>> for ActionOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(err) => Self::failed(err.user_message()),
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AppError>;
