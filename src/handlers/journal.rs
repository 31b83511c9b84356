//! Journal handlers. One entry per week: creation checks for an existing entry first.
//! The check and the insert are separate storage calls, so two concurrent creates for
//! the same week can both pass the check on a backend without a unique constraint.

use super::{body_to_map, parse_body, JsonBody};
use crate::error::AppError;
use crate::model::{JournalPatch, NewJournalEntry};
use crate::response::{no_content, success_many, success_one, success_one_ok};
use crate::service::schema::{JOURNAL_CREATE, JOURNAL_PATCH};
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::Value;

pub const DUPLICATE_WEEK: &str = "entry already exists for this week";

/// GET /api/journal
pub async fn list_journal(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = state.storage.list_journal_entries().await?;
    Ok(success_many(entries))
}

/// GET /api/journal/:week_start
pub async fn get_journal_for_week(
    State(state): State<AppState>,
    Path(week_start): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state
        .storage
        .get_journal_entry_by_week(&week_start)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no journal entry for week {}", week_start)))?;
    Ok(success_one_ok(entry))
}

/// POST /api/journal
pub async fn create_journal(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let input: NewJournalEntry = parse_body(body, JOURNAL_CREATE)?;
    if state
        .storage
        .get_journal_entry_by_week(&input.week_start)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(DUPLICATE_WEEK.into()));
    }
    let entry = state.storage.create_journal_entry(input).await?;
    tracing::info!(id = %entry.id, week_start = %entry.week_start, "journal entry created");
    Ok(success_one(entry))
}

/// PATCH /api/journal/:id — replaces content.
pub async fn update_journal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let map = body_to_map(body)?;
    if matches!(map.get("content"), None | Some(Value::Null)) {
        return Err(AppError::BadRequest("content is required".into()));
    }
    RequestValidator::validate(&map, JOURNAL_PATCH)?;
    let patch: JournalPatch = serde_json::from_value(Value::Object(map))
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let entry = state
        .storage
        .update_journal_entry(&id, patch.content)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("journal entry {}", id)))?;
    Ok(success_one_ok(entry))
}

/// DELETE /api/journal/:id
pub async fn delete_journal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.storage.delete_journal_entry(&id).await? {
        return Err(AppError::NotFound(format!("journal entry {}", id)));
    }
    tracing::info!(id = %id, "journal entry deleted");
    Ok(no_content())
}
