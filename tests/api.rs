//! HTTP-level tests against a fresh in-memory store per test.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use weekly_focus::{
    router, AppState, Goal, GoalPatch, JournalEntry, MemStorage, NewGoal, NewJournalEntry,
    NewProgressEntry, ProgressEntry, ServerConfig, Storage, StorageError,
};

fn app() -> Router {
    router(AppState::in_memory(), &ServerConfig::default())
}

fn app_with(storage: Arc<MemStorage>) -> Router {
    router(AppState::new(storage), &ServerConfig::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string())),
        None => builder.body(Body::empty()),
    };
    let request = match request {
        Ok(r) => r,
        Err(err) => panic!("failed to build request: {err}"),
    };
    let response = match app.clone().oneshot(request).await {
        Ok(r) => r,
        Err(err) => panic!("request failed: {err}"),
    };
    let status = response.status();
    let bytes = match to_bytes(response.into_body(), 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(err) => panic!("failed to read response body: {err}"),
    };
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn violation_fields(body: &Value) -> Vec<String> {
    body["error"]["details"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v["field"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn health_and_version() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, body) = send(&app, "GET", "/api/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/api/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "weekly-focus");
}

#[tokio::test]
async fn goal_lifecycle_end_to_end() {
    let app = app();
    let (status, goal) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({"title": "Ship v1", "priority": 1, "weekStart": "2024-06-03"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(goal["completed"], false);
    assert_eq!(goal["title"], "Ship v1");
    assert_eq!(goal["weekStart"], "2024-06-03");
    let id = goal["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());

    let (status, list) = send(&app, "GET", "/api/goals/2024-06-03", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([goal.clone()]));

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/goals/{id}"),
        Some(json!({"completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "Ship v1");
    assert_eq!(updated["priority"], 1);
    assert_eq!(updated["weekStart"], "2024-06-03");

    let (status, body) = send(&app, "DELETE", &format!("/api/goals/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, "DELETE", &format!("/api/goals/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn goals_are_listed_per_week_only() {
    let app = app();
    for (title, week) in [("a", "2024-06-03"), ("b", "2024-06-10"), ("c", "2024-06-03")] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/goals",
            Some(json!({"title": title, "priority": 2, "weekStart": week})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, list) = send(&app, "GET", "/api/goals/2024-06-03", None).await;
    let titles: Vec<_> = list
        .as_array()
        .map(|a| a.iter().filter_map(|g| g["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["a", "c"]);

    let (status, list) = send(&app, "GET", "/api/goals/2024-01-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn invalid_goal_never_reaches_storage() {
    let storage = Arc::new(MemStorage::new());
    let app = app_with(storage.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({"title": "", "priority": 4, "weekStart": "2024-06-03"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(violation_fields(&body), vec!["title", "priority"]);
    assert_eq!(body["error"]["details"][0]["message"], "Goal cannot be empty");

    let (status, body) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({"title": "x".repeat(201), "priority": 0, "weekStart": "next monday"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(violation_fields(&body), vec!["title", "priority", "weekStart"]);
    assert_eq!(body["error"]["details"][0]["message"], "Goal is too long");

    let (status, body) = send(&app, "POST", "/api/goals", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(violation_fields(&body), vec!["title", "priority", "weekStart"]);

    let stored = storage.list_goals("2024-06-03").await.unwrap_or_default();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let service = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/goals")
        .header("content-type", "application/json")
        .body(Body::from("{not json"));
    let request = match request {
        Ok(r) => r,
        Err(err) => panic!("failed to build request: {err}"),
    };
    let response = match service.clone().oneshot(request).await {
        Ok(r) => r,
        Err(err) => panic!("request failed: {err}"),
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&service, "POST", "/api/goals", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn patch_goal_validates_and_reports_unknown_id() {
    let app = app();
    let (_, goal) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({"title": "Read", "priority": 3, "weekStart": "2024-06-03", "completed": true})),
    )
    .await;
    assert_eq!(goal["completed"], true);
    let id = goal["id"].as_str().unwrap_or_default().to_string();

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/goals/{id}"),
        Some(json!({"completed": false, "priority": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], false);
    assert_eq!(updated["priority"], 1);
    assert_eq!(updated["title"], "Read");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/goals/{id}"),
        Some(json!({"priority": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(violation_fields(&body), vec!["priority"]);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/goals/does-not-exist",
        Some(json!({"completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn progress_upsert_keeps_one_entry_per_date() {
    let app = app();
    let (status, first) = send(
        &app,
        "POST",
        "/api/progress",
        Some(json!({"date": "2024-06-04", "goalsCompleted": 1, "totalGoals": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, second) = send(
        &app,
        "POST",
        "/api/progress",
        Some(json!({"date": "2024-06-04", "goalsCompleted": 3, "totalGoals": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["goalsCompleted"], 3);

    let (status, list) = send(&app, "GET", "/api/progress", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([second.clone()]));

    let (status, fetched) = send(&app, "GET", "/api/progress/2024-06-04", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, second);

    let (status, _) = send(&app, "GET", "/api/progress/2024-06-05", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn progress_out_of_range_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/progress",
        Some(json!({"date": "2024-06-04", "goalsCompleted": 4, "totalGoals": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(violation_fields(&body), vec!["goalsCompleted"]);

    let (status, body) = send(
        &app,
        "POST",
        "/api/progress",
        Some(json!({"date": "2024-06-04", "goalsCompleted": 0, "totalGoals": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(violation_fields(&body), vec!["totalGoals"]);

    let (_, list) = send(&app, "GET", "/api/progress", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn progress_total_goals_defaults_to_three() {
    let app = app();
    let (status, entry) = send(
        &app,
        "POST",
        "/api/progress",
        Some(json!({"date": "2024-06-06", "goalsCompleted": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["totalGoals"], 3);
}

#[tokio::test]
async fn journal_duplicate_week_is_rejected_end_to_end() {
    let app = app();
    let payload = json!({"weekStart": "2024-06-03", "content": "Good week"});
    let (status, created) = send(&app, "POST", "/api/journal", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["content"], "Good week");

    let (status, body) = send(
        &app,
        "POST",
        "/api/journal",
        Some(json!({"weekStart": "2024-06-03", "content": "Overwrite attempt"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["message"], "entry already exists for this week");

    let (status, body) = send(&app, "POST", "/api/journal", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "conflict");

    let (status, fetched) = send(&app, "GET", "/api/journal/2024-06-03", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (_, list) = send(&app, "GET", "/api/journal", None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn journal_update_and_delete() {
    let app = app();
    let (_, created) = send(
        &app,
        "POST",
        "/api/journal",
        Some(json!({"weekStart": "2024-06-10", "content": "Draft"})),
    )
    .await;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(&app, "PATCH", &format!("/api/journal/{id}"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/journal/{id}"),
        Some(json!({"content": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["message"], "Journal entry cannot be empty");

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/journal/{id}"),
        Some(json!({"content": "Final"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "Final");
    assert_eq!(updated["weekStart"], "2024-06-10");
    assert_eq!(updated["id"], created["id"]);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/journal/unknown",
        Some(json!({"content": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/api/journal/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/api/journal/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/api/journal/2024-06-10", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn journal_content_bounds() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/journal",
        Some(json!({"weekStart": "2024-06-17", "content": "x".repeat(5001)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["message"], "Entry is too long");

    let (status, _) = send(
        &app,
        "POST",
        "/api/journal",
        Some(json!({"weekStart": "2024-06-17", "content": "x".repeat(5000)})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn malformed_path_dates_read_as_absent() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/goals/not-a-date", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, "GET", "/api/journal/not-a-date", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = send(&app, "GET", "/api/progress/2024-02-30", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn year_zero_is_not_a_storable_date() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({"title": "Year zero", "priority": 1, "weekStart": "0000-01-03"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(violation_fields(&body), vec!["weekStart"]);

    let (status, _) = send(
        &app,
        "POST",
        "/api/progress",
        Some(json!({"date": "0000-12-31", "goalsCompleted": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Backend whose every call fails the way an exhausted pool does.
struct UnavailableStorage;

fn pool_timeout<T>() -> Result<T, StorageError> {
    Err(StorageError::Db(sqlx::Error::PoolTimedOut))
}

#[async_trait::async_trait]
impl Storage for UnavailableStorage {
    async fn list_goals(&self, _week_start: &str) -> Result<Vec<Goal>, StorageError> {
        pool_timeout()
    }

    async fn get_goal(&self, _id: &str) -> Result<Option<Goal>, StorageError> {
        pool_timeout()
    }

    async fn create_goal(&self, _goal: NewGoal) -> Result<Goal, StorageError> {
        pool_timeout()
    }

    async fn update_goal(&self, _id: &str, _patch: GoalPatch) -> Result<Option<Goal>, StorageError> {
        pool_timeout()
    }

    async fn delete_goal(&self, _id: &str) -> Result<bool, StorageError> {
        pool_timeout()
    }

    async fn list_progress_entries(&self) -> Result<Vec<ProgressEntry>, StorageError> {
        pool_timeout()
    }

    async fn get_progress_entry(&self, _date: &str) -> Result<Option<ProgressEntry>, StorageError> {
        pool_timeout()
    }

    async fn upsert_progress_entry(
        &self,
        _entry: NewProgressEntry,
    ) -> Result<ProgressEntry, StorageError> {
        pool_timeout()
    }

    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, StorageError> {
        pool_timeout()
    }

    async fn get_journal_entry_by_week(
        &self,
        _week_start: &str,
    ) -> Result<Option<JournalEntry>, StorageError> {
        pool_timeout()
    }

    async fn get_journal_entry_by_id(&self, _id: &str) -> Result<Option<JournalEntry>, StorageError> {
        pool_timeout()
    }

    async fn create_journal_entry(
        &self,
        _entry: NewJournalEntry,
    ) -> Result<JournalEntry, StorageError> {
        pool_timeout()
    }

    async fn update_journal_entry(
        &self,
        _id: &str,
        _content: String,
    ) -> Result<Option<JournalEntry>, StorageError> {
        pool_timeout()
    }

    async fn delete_journal_entry(&self, _id: &str) -> Result<bool, StorageError> {
        pool_timeout()
    }

    async fn ping(&self) -> Result<(), StorageError> {
        pool_timeout()
    }
}

fn assert_generic_internal_error(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "internal_error");
    assert_eq!(body["error"]["message"], "internal server error");
    let text = body.to_string().to_lowercase();
    assert!(!text.contains("pool"), "backend detail leaked: {text}");
    assert!(!text.contains("timed out"), "backend detail leaked: {text}");
}

#[tokio::test]
async fn backend_faults_are_opaque_500s() {
    let app = router(
        AppState::new(Arc::new(UnavailableStorage)),
        &ServerConfig::default(),
    );

    let (status, body) = send(&app, "GET", "/api/goals/2024-06-03", None).await;
    assert_generic_internal_error(status, &body);

    let (status, body) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({"title": "Ship v1", "priority": 1, "weekStart": "2024-06-03"})),
    )
    .await;
    assert_generic_internal_error(status, &body);

    let (status, body) = send(&app, "GET", "/api/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");

    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}
