use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::bookmarks::BookmarkStore;
use crate::error::AppError;
use crate::models::SavedCourse;

pub async fn find_saved_by_key(
    db: &SqlitePool,
    user_id: i64,
    course_id: i64,
) -> Result<Option<SavedCourse>, sqlx::Error> {
    sqlx::query_as::<_, SavedCourse>(
        "SELECT id, user_id, course_id, notes, created_at FROM saved_courses WHERE user_id = ? AND course_id = ?"
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(db)
    .await
}

pub async fn find_saved_by_id(
    db: &SqlitePool,
    id: i64,
) -> Result<Option<SavedCourse>, sqlx::Error> {
    sqlx::query_as::<_, SavedCourse>(
        "SELECT id, user_id, course_id, notes, created_at FROM saved_courses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_saved(
    db: &SqlitePool,
    user_id: i64,
    course_id: i64,
    notes: Option<String>,
) -> Result<SavedCourse, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        "INSERT INTO saved_courses (user_id, course_id, notes, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(&notes)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(SavedCourse {
        id: result.last_insert_rowid(),
        user_id,
        course_id,
        notes,
        created_at: now,
    })
}

pub async fn update_saved_notes(
    db: &SqlitePool,
    id: i64,
    notes: Option<String>,
) -> Result<Option<SavedCourse>, sqlx::Error> {
    let mut current = match find_saved_by_id(db, id).await? {
        Some(row) => row,
        None => return Ok(None),
    };

    sqlx::query("UPDATE saved_courses SET notes = ? WHERE id = ?")
        .bind(&notes)
        .bind(id)
        .execute(db)
        .await?;

    current.notes = notes;
    Ok(Some(current))
}

pub async fn delete_saved_by_key(
    db: &SqlitePool,
    user_id: i64,
    course_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM saved_courses WHERE user_id = ? AND course_id = ?")
        .bind(user_id)
        .bind(course_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_saved_by_id(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM saved_courses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn fetch_saved_for_user(
    db: &SqlitePool,
    user_id: i64,
) -> Result<Vec<SavedCourse>, sqlx::Error> {
    sqlx::query_as::<_, SavedCourse>(
        "SELECT id, user_id, course_id, notes, created_at FROM saved_courses WHERE user_id = ? ORDER BY created_at ASC, id ASC"
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}

/// An unreachable pool is a transient adapter failure the caller may retry;
/// everything else stays an opaque database error.
fn map_store_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AppError::AdapterUnavailable(e.to_string())
        }
        other => AppError::Database(other),
    }
}

/// [`BookmarkStore`] backed by the saved_courses table. The unique index on
/// `(user_id, course_id)` enforces the one-row-per-key invariant.
pub struct SqliteBookmarkStore {
    db: SqlitePool,
}

impl SqliteBookmarkStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookmarkStore for SqliteBookmarkStore {
    async fn find_by_key(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<SavedCourse>, AppError> {
        find_saved_by_key(&self.db, user_id, course_id)
            .await
            .map_err(map_store_error)
    }

    async fn insert(
        &self,
        user_id: i64,
        course_id: i64,
        notes: Option<String>,
    ) -> Result<SavedCourse, AppError> {
        insert_saved(&self.db, user_id, course_id, notes)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!(
                        "course {} already saved for user {}",
                        course_id, user_id
                    ))
                } else {
                    map_store_error(e)
                }
            })
    }

    async fn update_notes(&self, id: i64, notes: Option<String>) -> Result<SavedCourse, AppError> {
        update_saved_notes(&self.db, id, notes)
            .await
            .map_err(map_store_error)?
            .ok_or(AppError::NotFound)
    }

    async fn delete_by_key(&self, user_id: i64, course_id: i64) -> Result<bool, AppError> {
        delete_saved_by_key(&self.db, user_id, course_id)
            .await
            .map_err(map_store_error)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        delete_saved_by_id(&self.db, id)
            .await
            .map_err(map_store_error)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<SavedCourse>, AppError> {
        fetch_saved_for_user(&self.db, user_id)
            .await
            .map_err(map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        // One connection only: every pooled connection to sqlite::memory:
        // gets its own database.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test db");

        sqlx::query(
            r#"
            CREATE TABLE saved_courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                course_id INTEGER NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .expect("Failed to create saved_courses table");

        sqlx::query(
            "CREATE UNIQUE INDEX idx_saved_courses_user_course ON saved_courses(user_id, course_id)",
        )
        .execute(&pool)
        .await
        .expect("Failed to create unique index");

        pool
    }

    #[tokio::test]
    async fn test_insert_and_find_by_key() {
        let pool = setup_test_db().await;

        let row = insert_saved(&pool, 7, 1, Some("check deadline".to_string()))
            .await
            .expect("Failed to insert saved course");
        assert!(row.id > 0);
        assert_eq!(row.user_id, 7);
        assert_eq!(row.course_id, 1);

        let found = find_saved_by_key(&pool, 7, 1)
            .await
            .expect("Failed to look up saved course")
            .expect("Row should exist");
        assert_eq!(found, row);

        assert!(find_saved_by_key(&pool, 7, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_key_is_a_unique_violation() {
        let pool = setup_test_db().await;

        insert_saved(&pool, 7, 1, None).await.expect("first insert");
        let err = insert_saved(&pool, 7, 1, None)
            .await
            .expect_err("second insert must fail");
        assert!(is_unique_violation(&err));

        // Same course for another user is fine.
        insert_saved(&pool, 8, 1, None).await.expect("other user");
    }

    #[tokio::test]
    async fn test_update_notes_full_replace() {
        let pool = setup_test_db().await;

        let row = insert_saved(&pool, 7, 1, Some("old".to_string()))
            .await
            .unwrap();

        let updated = update_saved_notes(&pool, row.id, Some("new".to_string()))
            .await
            .unwrap()
            .expect("row exists");
        assert_eq!(updated.notes.as_deref(), Some("new"));

        let cleared = update_saved_notes(&pool, row.id, None).await.unwrap().unwrap();
        assert_eq!(cleared.notes, None);

        assert!(update_saved_notes(&pool, 9999, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_key_and_id() {
        let pool = setup_test_db().await;

        let row = insert_saved(&pool, 7, 1, None).await.unwrap();
        assert!(delete_saved_by_id(&pool, row.id).await.unwrap());
        assert!(!delete_saved_by_id(&pool, row.id).await.unwrap());

        let row = insert_saved(&pool, 7, 1, None).await.unwrap();
        assert!(delete_saved_by_key(&pool, 7, 1).await.unwrap());
        assert!(!delete_saved_by_key(&pool, 7, 1).await.unwrap());
        assert!(find_saved_by_id(&pool, row.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_for_user_in_creation_order() {
        let pool = setup_test_db().await;

        let first = insert_saved(&pool, 7, 3, None).await.unwrap();
        let second = insert_saved(&pool, 7, 1, None).await.unwrap();
        insert_saved(&pool, 8, 2, None).await.unwrap();

        let rows = fetch_saved_for_user(&pool, 7).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
