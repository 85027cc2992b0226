//! Task CRUD and column reordering.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;

use crate::db::{format_timestamp, parse_label, parse_timestamp, Database};
use crate::error::{Error, Result};
use crate::models::*;

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, created_at, completed_at, position";

#[derive(Clone)]
pub struct TaskRepository {
    db: Database,
}

impl TaskRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a task and return it as read back from the store, so that
    /// store-assigned values (`id`, `created_at`) are reflected.
    pub fn create(&self, input: CreateTaskInput) -> Result<Task> {
        let title = match input.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => return Err(Error::validation("Title is required")),
        };

        let status = input.status.unwrap_or_default();
        let priority = input.priority.unwrap_or_default();
        let id = {
            let conn = self.db.lock();
            conn.execute(
                "INSERT INTO tasks (title, description, status, priority, position)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    title,
                    input.description,
                    status.as_str(),
                    priority.as_str(),
                    input.position.unwrap_or(0),
                ],
            )?;
            conn.last_insert_rowid()
        };

        tracing::debug!(task_id = id, "Created task");
        self.get(id)
    }

    pub fn get(&self, id: i64) -> Result<Task> {
        let conn = self.db.lock();
        conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            [id],
            row_to_task,
        )
        .optional()?
        .ok_or_else(|| Error::task_not_found(id))
    }

    /// All tasks by `position`, newest first among equal positions.
    pub fn list_all(&self) -> Result<Vec<Task>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY position ASC, created_at DESC, id DESC"
        ))?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// Apply a partial update. Unsupplied fields keep their stored values.
    ///
    /// `completed_at` is stamped only on a transition into `done` from another
    /// status; otherwise the stored value is carried over unchanged.
    pub fn update(&self, id: i64, input: UpdateTaskInput) -> Result<Task> {
        let existing = self.get(id)?;

        if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Error::validation("Title cannot be empty"));
        }

        let title = input.title.unwrap_or(existing.title);
        let description = input.description.or(existing.description);
        let status = input.status.unwrap_or(existing.status);
        let priority = input.priority.unwrap_or(existing.priority);
        let position = input.position.unwrap_or(existing.position);
        let completed_at = if status == TaskStatus::Done && existing.status != TaskStatus::Done {
            Some(Utc::now())
        } else {
            existing.completed_at
        };

        {
            let conn = self.db.lock();
            conn.execute(
                "UPDATE tasks SET title = ?1, description = ?2, status = ?3, priority = ?4,
                 completed_at = ?5, position = ?6 WHERE id = ?7",
                params![
                    title,
                    description,
                    status.as_str(),
                    priority.as_str(),
                    completed_at.map(format_timestamp),
                    position,
                    id,
                ],
            )?;
        }

        tracing::debug!(task_id = id, status = status.as_str(), "Updated task");
        self.get(id)
    }

    /// Write each `(id, position)` pair in submitted order.
    ///
    /// Ids that do not exist are silent no-ops. Pairs are applied one
    /// statement at a time: a store failure partway through leaves the
    /// earlier writes in place and aborts the rest.
    pub fn reorder(&self, items: &[ReorderItem]) -> Result<()> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare("UPDATE tasks SET position = ?1 WHERE id = ?2")?;
        for item in items {
            stmt.execute(params![item.position, item.id])?;
        }
        tracing::debug!(count = items.len(), "Reordered tasks");
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.db.lock();
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        if rows == 0 {
            return Err(Error::task_not_found(id));
        }
        tracing::debug!(task_id = id, "Deleted task");
        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.db.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?)
    }
}

/// Validate a reorder request body of the form `{"tasks": [{"id", "position"}, ...]}`.
pub fn parse_reorder_request(body: &Value) -> Result<Vec<ReorderItem>> {
    let Some(tasks) = body.get("tasks").and_then(Value::as_array) else {
        return Err(Error::validation("tasks must be an array"));
    };

    tasks
        .iter()
        .map(|entry| {
            serde_json::from_value::<ReorderItem>(entry.clone()).map_err(|_| {
                Error::validation("each task entry needs an integer id and position")
            })
        })
        .collect()
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: parse_label(3, &row.get::<_, String>(3)?, TaskStatus::from_str)?,
        priority: parse_label(4, &row.get::<_, String>(4)?, TaskPriority::from_str)?,
        created_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
        completed_at: row
            .get::<_, Option<String>>(6)?
            .map(|s| parse_timestamp(6, &s))
            .transpose()?,
        position: row.get(7)?,
    })
}
