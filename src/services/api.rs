// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gym backend REST client.
//!
//! Handles:
//! - Bearer-token authorization on every call except login
//! - Form-encoded login, JSON everywhere else
//! - Mapping HTTP statuses and FastAPI `detail` bodies onto [`AppError`]

use crate::error::AppError;
use crate::middleware::auth::{with_bearer, SessionHandle};
use crate::models::{
    DashboardData, Exercise, LoginResponse, NewUser, NewWorkout, PlannedExercise, SetLog, User,
    Workout, WorkoutList, WorkoutUpdate,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// One method per backend endpoint.
#[async_trait]
pub trait GymApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError>;
    async fn register(&self, user: &NewUser) -> Result<User, AppError>;
    async fn current_user(&self) -> Result<User, AppError>;

    async fn list_workouts(&self, user_id: i64) -> Result<WorkoutList, AppError>;
    async fn get_workout(&self, workout_id: i64) -> Result<Workout, AppError>;
    async fn create_workout(&self, workout: &NewWorkout) -> Result<Workout, AppError>;
    async fn update_workout(
        &self,
        workout_id: i64,
        update: &WorkoutUpdate,
    ) -> Result<Workout, AppError>;
    async fn delete_workout(&self, workout_id: i64) -> Result<(), AppError>;
    async fn add_exercises_to_workout(
        &self,
        workout_id: i64,
        exercises: &[PlannedExercise],
    ) -> Result<(), AppError>;
    /// `None` when the backend has no plan for today.
    async fn todays_workout(&self, user_id: i64) -> Result<Option<Workout>, AppError>;

    async fn search_exercises(&self, query: &str) -> Result<Vec<Exercise>, AppError>;

    async fn create_log(&self, user_id: i64, log: &SetLog) -> Result<(), AppError>;
    /// Batch endpoint used to flush the live-session backlog.
    async fn add_logs_to_workout(
        &self,
        user_id: i64,
        workout_id: i64,
        logs: &[SetLog],
    ) -> Result<(), AppError>;

    async fn dashboard(&self, user_id: i64) -> Result<DashboardData, AppError>;
}

/// `reqwest`-backed [`GymApi`] implementation.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
}

#[derive(Serialize)]
struct ExercisesPayload<'a> {
    exercises: &'a [PlannedExercise],
}

#[derive(Serialize)]
struct LogsPayload<'a> {
    logs: &'a [SetLog],
}

impl ApiClient {
    /// Create a client for `base_url` sharing `session` for bearer tokens.
    pub fn new(
        base_url: impl Into<String>,
        session: SessionHandle,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let request = self.http.get(self.url(path)).query(query);
        let response = with_bearer(request, &self.session)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        check_response_json(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<reqwest::Response, AppError> {
        let request = self
            .http
            .request(method, self.url(path))
            .query(query)
            .json(body);

        let response = with_bearer(request, &self.session)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        check_response(response).await
    }
}

#[async_trait]
impl GymApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        // No bearer header: login establishes the token.
        let response = self
            .http
            .post(self.url("/api/users/login"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Login request failed: {}", e)))?;

        check_response_json(response).await
    }

    async fn register(&self, user: &NewUser) -> Result<User, AppError> {
        let response = self
            .send_json(reqwest::Method::POST, "/api/users/", &[], user)
            .await?;
        parse_json(response).await
    }

    async fn current_user(&self) -> Result<User, AppError> {
        self.get_json("/api/users/me", &[]).await
    }

    async fn list_workouts(&self, user_id: i64) -> Result<WorkoutList, AppError> {
        self.get_json("/api/workouts/", &[("user_id", user_id.to_string())])
            .await
    }

    async fn get_workout(&self, workout_id: i64) -> Result<Workout, AppError> {
        self.get_json(&format!("/api/workouts/{}", workout_id), &[])
            .await
    }

    async fn create_workout(&self, workout: &NewWorkout) -> Result<Workout, AppError> {
        let response = self
            .send_json(reqwest::Method::POST, "/api/workouts/", &[], workout)
            .await?;
        parse_json(response).await
    }

    async fn update_workout(
        &self,
        workout_id: i64,
        update: &WorkoutUpdate,
    ) -> Result<Workout, AppError> {
        let path = format!("/api/workouts/{}", workout_id);
        let response = self
            .send_json(reqwest::Method::PUT, &path, &[], update)
            .await?;
        parse_json(response).await
    }

    async fn delete_workout(&self, workout_id: i64) -> Result<(), AppError> {
        let request = self
            .http
            .delete(self.url(&format!("/api/workouts/{}", workout_id)));
        let response = with_bearer(request, &self.session)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        check_response(response).await?;
        Ok(())
    }

    async fn add_exercises_to_workout(
        &self,
        workout_id: i64,
        exercises: &[PlannedExercise],
    ) -> Result<(), AppError> {
        let path = format!("/api/workouts/{}/exercises", workout_id);
        self.send_json(
            reqwest::Method::POST,
            &path,
            &[],
            &ExercisesPayload { exercises },
        )
        .await?;
        Ok(())
    }

    async fn todays_workout(&self, user_id: i64) -> Result<Option<Workout>, AppError> {
        self.get_json("/api/workouts/today/", &[("user_id", user_id.to_string())])
            .await
    }

    async fn search_exercises(&self, query: &str) -> Result<Vec<Exercise>, AppError> {
        let path = format!("/api/exercises/search/{}", urlencoding::encode(query));
        self.get_json(&path, &[]).await
    }

    async fn create_log(&self, user_id: i64, log: &SetLog) -> Result<(), AppError> {
        self.send_json(
            reqwest::Method::POST,
            "/api/logs/",
            &[("user_id", user_id.to_string())],
            log,
        )
        .await?;
        Ok(())
    }

    async fn add_logs_to_workout(
        &self,
        user_id: i64,
        workout_id: i64,
        logs: &[SetLog],
    ) -> Result<(), AppError> {
        let path = format!("/api/workouts/{}/logs", workout_id);
        self.send_json(
            reqwest::Method::POST,
            &path,
            &[("user_id", user_id.to_string())],
            &LogsPayload { logs },
        )
        .await?;
        Ok(())
    }

    async fn dashboard(&self, user_id: i64) -> Result<DashboardData, AppError> {
        self.get_json(&format!("/api/dashboard/{}", user_id), &[])
            .await
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body);

    match status.as_u16() {
        401 => Err(AppError::Unauthorized),
        404 => Err(AppError::NotFound(detail)),
        400 | 409 | 422 => Err(AppError::BadRequest(detail)),
        code => {
            tracing::warn!(status = code, detail = %detail, "Backend request failed");
            Err(AppError::Api {
                status: code,
                detail,
            })
        }
    }
}

/// Check response and parse JSON body.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let response = check_response(response).await?;
    parse_json(response).await
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
    response
        .json()
        .await
        .map_err(|e| AppError::Network(format!("JSON parse error: {}", e)))
}

/// Pull the human-readable `detail` out of a FastAPI error body.
///
/// `detail` is either a string or a list of validation errors; anything else
/// falls back to the raw body.
pub fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    match value.get("detail") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail":"Incorrect email or password"}"#),
            "Incorrect email or password"
        );
    }

    #[test]
    fn test_extract_detail_validation_list() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address"},{"loc":["body","password"],"msg":"too short"}]}"#;
        assert_eq!(
            extract_detail(body),
            "value is not a valid email address; too short"
        );
    }

    #[test]
    fn test_extract_detail_plain_body() {
        assert_eq!(extract_detail("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(extract_detail(r#"{"error":"x"}"#), r#"{"error":"x"}"#);
    }
}
