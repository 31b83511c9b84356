//! Success response helpers. Entities are returned bare, not wrapped in an envelope.

use axum::{http::StatusCode, Json};
use serde::Serialize;

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<Vec<T>>) {
    (StatusCode::OK, Json(data))
}

pub fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}
