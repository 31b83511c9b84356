//! HTTP handlers for goals, progress entries and journal entries.

pub mod goals;
pub mod journal;
pub mod progress;

use crate::error::AppError;
use crate::service::{RequestValidator, ValidationRule};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub type JsonBody = Result<Json<Value>, JsonRejection>;

fn body_to_map(body: JsonBody) -> Result<Map<String, Value>, AppError> {
    match body {
        Ok(Json(Value::Object(m))) => Ok(m),
        Ok(_) => Err(AppError::BadRequest("body must be a JSON object".into())),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}

/// Validate the body against `rules`, then decode it. Nulls are dropped first so they read as absent.
fn parse_body<T: DeserializeOwned>(body: JsonBody, rules: &[ValidationRule]) -> Result<T, AppError> {
    let mut map = body_to_map(body)?;
    RequestValidator::validate(&map, rules)?;
    map.retain(|_, v| !v.is_null());
    serde_json::from_value(Value::Object(map)).map_err(|e| AppError::BadRequest(e.to_string()))
}
