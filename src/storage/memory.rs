//! Volatile in-memory backend. Each collection sits behind its own lock, so every
//! operation is atomic with respect to that collection.

use super::Storage;
use crate::error::StorageError;
use crate::model::{
    new_id, Goal, GoalPatch, JournalEntry, NewGoal, NewJournalEntry, NewProgressEntry,
    ProgressEntry,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

trait Record: Clone {
    fn id(&self) -> &str;
}

impl Record for Goal {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for ProgressEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for JournalEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Records keyed by id, iterated in insertion order.
struct Collection<T> {
    by_id: HashMap<String, T>,
    order: Vec<String>,
}

impl<T: Record> Collection<T> {
    fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.by_id.get_mut(id)
    }

    fn insert(&mut self, record: T) {
        let id = record.id().to_string();
        if self.by_id.insert(id.clone(), record).is_none() {
            self.order.push(id);
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        if self.by_id.remove(id).is_none() {
            return false;
        }
        self.order.retain(|k| k != id);
        true
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    fn find(&self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        self.iter().find(|r| pred(*r))
    }
}

pub struct MemStorage {
    goals: RwLock<Collection<Goal>>,
    progress: RwLock<Collection<ProgressEntry>>,
    journal: RwLock<Collection<JournalEntry>>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            goals: RwLock::new(Collection::new()),
            progress: RwLock::new(Collection::new()),
            journal: RwLock::new(Collection::new()),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn list_goals(&self, week_start: &str) -> Result<Vec<Goal>, StorageError> {
        let goals = self.goals.read().await;
        Ok(goals
            .iter()
            .filter(|g| g.week_start == week_start)
            .cloned()
            .collect())
    }

    async fn get_goal(&self, id: &str) -> Result<Option<Goal>, StorageError> {
        Ok(self.goals.read().await.get(id).cloned())
    }

    async fn create_goal(&self, input: NewGoal) -> Result<Goal, StorageError> {
        let goal = Goal {
            id: new_id(),
            title: input.title,
            priority: input.priority,
            week_start: input.week_start,
            completed: input.completed.unwrap_or(false),
        };
        self.goals.write().await.insert(goal.clone());
        tracing::debug!(id = %goal.id, week_start = %goal.week_start, "goal stored");
        Ok(goal)
    }

    async fn update_goal(&self, id: &str, patch: GoalPatch) -> Result<Option<Goal>, StorageError> {
        let mut goals = self.goals.write().await;
        Ok(goals.get_mut(id).map(|goal| {
            patch.apply(goal);
            goal.clone()
        }))
    }

    async fn delete_goal(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.goals.write().await.remove(id))
    }

    async fn list_progress_entries(&self) -> Result<Vec<ProgressEntry>, StorageError> {
        Ok(self.progress.read().await.iter().cloned().collect())
    }

    async fn get_progress_entry(&self, date: &str) -> Result<Option<ProgressEntry>, StorageError> {
        Ok(self.progress.read().await.find(|e| e.date == date).cloned())
    }

    async fn upsert_progress_entry(
        &self,
        input: NewProgressEntry,
    ) -> Result<ProgressEntry, StorageError> {
        let mut progress = self.progress.write().await;
        let existing = progress.find(|e| e.date == input.date).map(|e| e.id.clone());
        if let Some(id) = existing {
            if let Some(entry) = progress.get_mut(&id) {
                entry.goals_completed = input.goals_completed;
                entry.total_goals = input.total_goals;
                tracing::debug!(id = %entry.id, date = %entry.date, "progress entry updated");
                return Ok(entry.clone());
            }
        }
        let entry = ProgressEntry {
            id: new_id(),
            date: input.date,
            goals_completed: input.goals_completed,
            total_goals: input.total_goals,
        };
        progress.insert(entry.clone());
        tracing::debug!(id = %entry.id, date = %entry.date, "progress entry created");
        Ok(entry)
    }

    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, StorageError> {
        Ok(self.journal.read().await.iter().cloned().collect())
    }

    async fn get_journal_entry_by_week(
        &self,
        week_start: &str,
    ) -> Result<Option<JournalEntry>, StorageError> {
        Ok(self
            .journal
            .read()
            .await
            .find(|e| e.week_start == week_start)
            .cloned())
    }

    async fn get_journal_entry_by_id(
        &self,
        id: &str,
    ) -> Result<Option<JournalEntry>, StorageError> {
        Ok(self.journal.read().await.get(id).cloned())
    }

    async fn create_journal_entry(
        &self,
        input: NewJournalEntry,
    ) -> Result<JournalEntry, StorageError> {
        let entry = JournalEntry {
            id: new_id(),
            week_start: input.week_start,
            content: input.content,
        };
        self.journal.write().await.insert(entry.clone());
        tracing::debug!(id = %entry.id, week_start = %entry.week_start, "journal entry stored");
        Ok(entry)
    }

    async fn update_journal_entry(
        &self,
        id: &str,
        content: String,
    ) -> Result<Option<JournalEntry>, StorageError> {
        let mut journal = self.journal.write().await;
        Ok(journal.get_mut(id).map(|entry| {
            entry.content = content;
            entry.clone()
        }))
    }

    async fn delete_journal_entry(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.journal.write().await.remove(id))
    }
}
