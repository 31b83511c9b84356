//! Weekly Focus: REST backend for weekly goals, daily progress and weekly reflections.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod storage;

pub use config::{init_tracing, ServerConfig};
pub use error::{AppError, ConfigError, FieldViolation, StorageError};
pub use model::{
    Goal, GoalPatch, JournalEntry, JournalPatch, NewGoal, NewJournalEntry, NewProgressEntry,
    ProgressEntry,
};
pub use routes::{api_routes, common_routes, router};
pub use state::AppState;
pub use storage::{ensure_database_exists, MemStorage, PgStorage, Storage};
