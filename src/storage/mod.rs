//! Storage contract and its backends. Storage owns all entity state and knows nothing
//! about how entities relate; cross-entity rules live in the handlers.

mod memory;
mod postgres;

pub use memory::MemStorage;
pub use postgres::{ensure_database_exists, PgStorage};

use crate::error::StorageError;
use crate::model::{
    Goal, GoalPatch, JournalEntry, NewGoal, NewJournalEntry, NewProgressEntry, ProgressEntry,
};
use async_trait::async_trait;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Goals whose `week_start` equals `week_start` exactly, in insertion order.
    async fn list_goals(&self, week_start: &str) -> Result<Vec<Goal>, StorageError>;
    async fn get_goal(&self, id: &str) -> Result<Option<Goal>, StorageError>;
    /// Assigns a fresh id; `completed` defaults to false.
    async fn create_goal(&self, input: NewGoal) -> Result<Goal, StorageError>;
    /// Merges only the fields present in `patch`. `None` if the id is unknown.
    async fn update_goal(&self, id: &str, patch: GoalPatch) -> Result<Option<Goal>, StorageError>;
    /// True if a record existed and was removed.
    async fn delete_goal(&self, id: &str) -> Result<bool, StorageError>;

    async fn list_progress_entries(&self) -> Result<Vec<ProgressEntry>, StorageError>;
    async fn get_progress_entry(&self, date: &str) -> Result<Option<ProgressEntry>, StorageError>;
    /// Keyed by `date`: an existing record keeps its id and gets the new counts.
    async fn upsert_progress_entry(
        &self,
        input: NewProgressEntry,
    ) -> Result<ProgressEntry, StorageError>;

    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, StorageError>;
    async fn get_journal_entry_by_week(
        &self,
        week_start: &str,
    ) -> Result<Option<JournalEntry>, StorageError>;
    async fn get_journal_entry_by_id(&self, id: &str)
        -> Result<Option<JournalEntry>, StorageError>;
    /// Does not check for an existing entry in the same week; callers do.
    async fn create_journal_entry(
        &self,
        input: NewJournalEntry,
    ) -> Result<JournalEntry, StorageError>;
    async fn update_journal_entry(
        &self,
        id: &str,
        content: String,
    ) -> Result<Option<JournalEntry>, StorageError>;
    async fn delete_journal_entry(&self, id: &str) -> Result<bool, StorageError>;

    /// Backend reachability, used by the readiness check.
    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
