use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::{SqlitePoolOptions, SqliteRow}, Pool, Row, Sqlite};

use crate::domain::{
    repository::TaskRepository,
    task::{
        CreateTask, Task, TaskFilter, TaskId, TaskStats, UpdateTask, STATUS_COMPLETED,
        STATUS_IN_PROGRESS, STATUS_PENDING,
    },
};

#[derive(Clone)]
pub struct SqliteTaskRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTaskRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool: Arc::new(pool) })
    }

    async fn count_by_status(&self, status: &str) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE status = ?1")
            .bind(status)
            .fetch_one(&*self.pool)
            .await?;
        Ok(count)
    }
}

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, created_at, updated_at, due_date";

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'pending',
                priority TEXT NOT NULL DEFAULT 'medium',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                due_date TEXT
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn create(&self, input: CreateTask) -> Result<Task> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tasks (title, description, status, priority, created_at, updated_at, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.status)
        .bind(&input.priority)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(input.due_date.map(|d| d.to_rfc3339()))
        .execute(&*self.pool)
        .await?;
        Ok(Task {
            id: TaskId(result.last_insert_rowid()),
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            created_at: now,
            updated_at: now,
            due_date: input.due_date,
        })
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.map(row_to_task))
    }

    async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks");
        let mut clauses = Vec::new();
        if filter.status.is_some() { clauses.push("status = ?"); }
        if filter.priority.is_some() { clauses.push("priority = ?"); }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(status) = &filter.status { query = query.bind(status); }
        if let Some(priority) = &filter.priority { query = query.bind(priority); }
        let rows = query.fetch_all(&*self.pool).await?;
        Ok(rows.into_iter().map(row_to_task).collect())
    }

    async fn update(&self, id: TaskId, input: UpdateTask) -> Result<Option<Task>> {
        // Fetch existing
        let existing = self.get(id).await?;
        let Some(mut task) = existing else { return Ok(None) };

        if let Some(t) = input.title { task.title = t; }
        if let Some(d) = input.description { task.description = d; }
        if let Some(s) = input.status { task.status = s; }
        if let Some(p) = input.priority { task.priority = p; }
        // An absent due date keeps the stored one; it cannot be cleared here.
        if let Some(due) = input.due_date { task.due_date = Some(due); }
        task.updated_at = Utc::now();

        sqlx::query(
            "UPDATE tasks SET title = ?2, description = ?3, status = ?4, priority = ?5,
             updated_at = ?6, due_date = ?7 WHERE id = ?1",
        )
        .bind(task.id.0)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(&task.priority)
        .bind(task.updated_at.to_rfc3339())
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .execute(&*self.pool)
        .await?;

        Ok(Some(task))
    }

    async fn delete(&self, id: TaskId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> Result<TaskStats> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&*self.pool)
            .await?;
        // Independent counts: a row with an unknown status lands in total only.
        let completed = self.count_by_status(STATUS_COMPLETED).await?;
        let pending = self.count_by_status(STATUS_PENDING).await?;
        let in_progress = self.count_by_status(STATUS_IN_PROGRESS).await?;
        Ok(TaskStats { total, completed, pending, in_progress })
    }
}

fn row_to_task(row: SqliteRow) -> Task {
    let due_date: Option<String> = row.get("due_date");
    Task {
        id: TaskId(row.get("id")),
        title: row.get("title"),
        description: row.get("description"),
        status: row.get("status"),
        priority: row.get("priority"),
        created_at: parse_timestamp(row.get("created_at")),
        updated_at: parse_timestamp(row.get("updated_at")),
        due_date: due_date.map(parse_timestamp),
    }
}

fn parse_timestamp(value: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&value).unwrap().with_timezone(&Utc)
}
