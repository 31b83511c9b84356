//! PostgreSQL backend. Uniqueness of progress dates and journal weeks is enforced by
//! UNIQUE constraints; a duplicate journal week surfaces as `StorageError::Conflict`.

use super::Storage;
use crate::error::StorageError;
use crate::model::{
    new_id, Goal, GoalPatch, JournalEntry, NewGoal, NewJournalEntry, NewProgressEntry,
    ProgressEntry,
};
use crate::service::parse_date;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const GOAL_COLUMNS: &str = "id, title, priority, week_start, completed";
const PROGRESS_COLUMNS: &str = "id, date, goals_completed, total_goals";
const JOURNAL_COLUMNS: &str = "id, week_start, content";

type GoalRow = (String, String, i32, NaiveDate, bool);
type ProgressRow = (String, NaiveDate, i32, i32);
type JournalRow = (String, NaiveDate, String);

fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Date for an INSERT. Handlers validate first, so failure means a caller skipped validation.
fn input_date(s: &str) -> Result<NaiveDate, StorageError> {
    parse_date(s).ok_or_else(|| StorageError::InvalidDate(s.to_string()))
}

fn goal_from_row((id, title, priority, week_start, completed): GoalRow) -> Goal {
    Goal {
        id,
        title,
        priority,
        week_start: format_date(week_start),
        completed,
    }
}

fn progress_from_row((id, date, goals_completed, total_goals): ProgressRow) -> ProgressEntry {
    ProgressEntry {
        id,
        date: format_date(date),
        goals_completed,
        total_goals,
    }
}

fn journal_from_row((id, week_start, content): JournalRow) -> JournalEntry {
    JournalEntry {
        id,
        week_start: format_date(week_start),
        content,
    }
}

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool to `database_url` and create the tables if they do not exist.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let storage = Self::new(pool);
        storage.ensure_tables().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_tables(&self) -> Result<(), StorageError> {
        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS goals (
                id TEXT PRIMARY KEY,
                seq BIGSERIAL NOT NULL,
                title TEXT NOT NULL,
                priority INTEGER NOT NULL,
                week_start DATE NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT FALSE
            )
            "#,
            "CREATE INDEX IF NOT EXISTS goals_week_start_idx ON goals (week_start)",
            r#"
            CREATE TABLE IF NOT EXISTS progress_entries (
                id TEXT PRIMARY KEY,
                date DATE NOT NULL UNIQUE,
                goals_completed INTEGER NOT NULL DEFAULT 0,
                total_goals INTEGER NOT NULL DEFAULT 3
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS journal_entries (
                id TEXT PRIMARY KEY,
                week_start DATE NOT NULL UNIQUE,
                content TEXT NOT NULL
            )
            "#,
        ];
        for sql in ddl {
            sqlx::query(sql).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn list_goals(&self, week_start: &str) -> Result<Vec<Goal>, StorageError> {
        // A key that is not a date cannot match any stored week.
        let Some(week_start) = parse_date(week_start) else {
            return Ok(Vec::new());
        };
        let sql = format!(
            "SELECT {} FROM goals WHERE week_start = $1 ORDER BY seq",
            GOAL_COLUMNS
        );
        let rows: Vec<GoalRow> = sqlx::query_as(&sql)
            .bind(week_start)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(goal_from_row).collect())
    }

    async fn get_goal(&self, id: &str) -> Result<Option<Goal>, StorageError> {
        let sql = format!("SELECT {} FROM goals WHERE id = $1", GOAL_COLUMNS);
        let row: Option<GoalRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(goal_from_row))
    }

    async fn create_goal(&self, input: NewGoal) -> Result<Goal, StorageError> {
        let week_start = input_date(&input.week_start)?;
        let sql = format!(
            "INSERT INTO goals (id, title, priority, week_start, completed) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            GOAL_COLUMNS
        );
        let row: GoalRow = sqlx::query_as(&sql)
            .bind(new_id())
            .bind(&input.title)
            .bind(input.priority)
            .bind(week_start)
            .bind(input.completed.unwrap_or(false))
            .fetch_one(&self.pool)
            .await?;
        Ok(goal_from_row(row))
    }

    async fn update_goal(&self, id: &str, patch: GoalPatch) -> Result<Option<Goal>, StorageError> {
        let sql = format!(
            r#"
            UPDATE goals SET
                title = COALESCE($2, title),
                completed = COALESCE($3, completed),
                priority = COALESCE($4, priority)
            WHERE id = $1
            RETURNING {}
            "#,
            GOAL_COLUMNS
        );
        let row: Option<GoalRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.completed)
            .bind(patch.priority)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(goal_from_row))
    }

    async fn delete_goal(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_progress_entries(&self) -> Result<Vec<ProgressEntry>, StorageError> {
        let sql = format!("SELECT {} FROM progress_entries ORDER BY date", PROGRESS_COLUMNS);
        let rows: Vec<ProgressRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(progress_from_row).collect())
    }

    async fn get_progress_entry(&self, date: &str) -> Result<Option<ProgressEntry>, StorageError> {
        let Some(date) = parse_date(date) else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT {} FROM progress_entries WHERE date = $1",
            PROGRESS_COLUMNS
        );
        let row: Option<ProgressRow> = sqlx::query_as(&sql)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(progress_from_row))
    }

    async fn upsert_progress_entry(
        &self,
        input: NewProgressEntry,
    ) -> Result<ProgressEntry, StorageError> {
        let date = input_date(&input.date)?;
        let sql = format!(
            r#"
            INSERT INTO progress_entries (id, date, goals_completed, total_goals)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (date)
            DO UPDATE SET goals_completed = $3, total_goals = $4
            RETURNING {}
            "#,
            PROGRESS_COLUMNS
        );
        let row: ProgressRow = sqlx::query_as(&sql)
            .bind(new_id())
            .bind(date)
            .bind(input.goals_completed)
            .bind(input.total_goals)
            .fetch_one(&self.pool)
            .await?;
        Ok(progress_from_row(row))
    }

    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, StorageError> {
        let sql = format!("SELECT {} FROM journal_entries ORDER BY week_start", JOURNAL_COLUMNS);
        let rows: Vec<JournalRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(journal_from_row).collect())
    }

    async fn get_journal_entry_by_week(
        &self,
        week_start: &str,
    ) -> Result<Option<JournalEntry>, StorageError> {
        let Some(week_start) = parse_date(week_start) else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT {} FROM journal_entries WHERE week_start = $1",
            JOURNAL_COLUMNS
        );
        let row: Option<JournalRow> = sqlx::query_as(&sql)
            .bind(week_start)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(journal_from_row))
    }

    async fn get_journal_entry_by_id(
        &self,
        id: &str,
    ) -> Result<Option<JournalEntry>, StorageError> {
        let sql = format!("SELECT {} FROM journal_entries WHERE id = $1", JOURNAL_COLUMNS);
        let row: Option<JournalRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(journal_from_row))
    }

    async fn create_journal_entry(
        &self,
        input: NewJournalEntry,
    ) -> Result<JournalEntry, StorageError> {
        let week_start = input_date(&input.week_start)?;
        let sql = format!(
            "INSERT INTO journal_entries (id, week_start, content) VALUES ($1, $2, $3) RETURNING {}",
            JOURNAL_COLUMNS
        );
        let row: JournalRow = sqlx::query_as(&sql)
            .bind(new_id())
            .bind(week_start)
            .bind(&input.content)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StorageError::Conflict("entry already exists for this week".into())
                }
                other => StorageError::Db(other),
            })?;
        Ok(journal_from_row(row))
    }

    async fn update_journal_entry(
        &self,
        id: &str,
        content: String,
    ) -> Result<Option<JournalEntry>, StorageError> {
        let sql = format!(
            "UPDATE journal_entries SET content = $2 WHERE id = $1 RETURNING {}",
            JOURNAL_COLUMNS
        );
        let row: Option<JournalRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(content)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(journal_from_row))
    }

    async fn delete_journal_entry(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before [`PgStorage::connect`].
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StorageError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StorageError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name_from_url() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/focus?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "focus");
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
