//! Goal handlers: list by week, create, partial update, delete.

use super::{parse_body, JsonBody};
use crate::error::AppError;
use crate::model::{GoalPatch, NewGoal};
use crate::response::{no_content, success_many, success_one, success_one_ok};
use crate::service::schema::{GOAL_CREATE, GOAL_PATCH};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

/// GET /api/goals/:week_start
pub async fn list_goals(
    State(state): State<AppState>,
    Path(week_start): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let goals = state.storage.list_goals(&week_start).await?;
    Ok(success_many(goals))
}

/// POST /api/goals
pub async fn create_goal(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let input: NewGoal = parse_body(body, GOAL_CREATE)?;
    let goal = state.storage.create_goal(input).await?;
    tracing::info!(id = %goal.id, week_start = %goal.week_start, priority = goal.priority, "goal created");
    Ok(success_one(goal))
}

/// PATCH /api/goals/:id
pub async fn update_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let patch: GoalPatch = parse_body(body, GOAL_PATCH)?;
    let goal = state
        .storage
        .update_goal(&id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("goal {}", id)))?;
    Ok(success_one_ok(goal))
}

/// DELETE /api/goals/:id
pub async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.storage.delete_goal(&id).await? {
        return Err(AppError::NotFound(format!("goal {}", id)));
    }
    tracing::info!(id = %id, "goal deleted");
    Ok(no_content())
}
