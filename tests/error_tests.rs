// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use gym_session_client::error::{ActionOutcome, AppError};

#[test]
fn test_is_not_found_matches() {
    let err = AppError::NotFound("No workout scheduled for today".to_string());
    assert!(err.is_not_found());
}

#[test]
fn test_is_not_found_no_match() {
    let err = AppError::Api {
        status: 500,
        detail: "Internal Server Error".to_string(),
    };
    assert!(!err.is_not_found());

    assert!(!AppError::Unauthorized.is_not_found());
    assert!(!AppError::BadRequest("Not found".to_string()).is_not_found());
}

#[test]
fn test_invalid_credentials_displays_message_only() {
    let err = AppError::InvalidCredentials("Incorrect email or password".to_string());
    assert_eq!(err.to_string(), "Incorrect email or password");
    assert_eq!(err.user_message(), "Incorrect email or password");
}

#[test]
fn test_json_error_is_storage_error() {
    let parse = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let err: AppError = parse.into();
    assert!(matches!(err, AppError::Storage(_)));
    assert_eq!(err.user_message(), AppError::GENERIC_MESSAGE);
}

#[test]
fn test_failed_outcome_serializes_without_value() {
    let outcome: ActionOutcome<i64> = ActionOutcome::failed("User not authenticated.");
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"success": false, "message": "User not authenticated."})
    );
}
