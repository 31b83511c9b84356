//! Entity routes. A single parameterized segment per collection: GET reads it as a
//! week or date, PATCH and DELETE read it as an id.

use crate::handlers::goals::{create_goal, delete_goal, list_goals, update_goal};
use crate::handlers::journal::{
    create_journal, delete_journal, get_journal_for_week, list_journal, update_journal,
};
use crate::handlers::progress::{get_progress, list_progress, upsert_progress};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/goals", post(create_goal))
        .route("/goals/:key", get(list_goals).patch(update_goal).delete(delete_goal))
        .route("/progress", get(list_progress).post(upsert_progress))
        .route("/progress/:date", get(get_progress))
        .route("/journal", get(list_journal).post(create_journal))
        .route(
            "/journal/:key",
            get(get_journal_for_week).patch(update_journal).delete(delete_journal),
        )
        .with_state(state)
}
