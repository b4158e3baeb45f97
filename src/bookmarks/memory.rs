//! In-memory [`BookmarkStore`] for tests and offline runs.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::AppError;
use crate::models::SavedCourse;

use super::BookmarkStore;

struct Inner {
    next_id: i64,
    rows: Vec<SavedCourse>,
}

pub struct MemoryBookmarkStore {
    inner: RwLock<Inner>,
}

impl MemoryBookmarkStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                rows: Vec::new(),
            }),
        }
    }
}

impl Default for MemoryBookmarkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookmarkStore for MemoryBookmarkStore {
    async fn find_by_key(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<SavedCourse>, AppError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .rows
            .iter()
            .find(|r| r.user_id == user_id && r.course_id == course_id)
            .cloned())
    }

    async fn insert(
        &self,
        user_id: i64,
        course_id: i64,
        notes: Option<String>,
    ) -> Result<SavedCourse, AppError> {
        let mut inner = self.inner.write().unwrap();
        if inner
            .rows
            .iter()
            .any(|r| r.user_id == user_id && r.course_id == course_id)
        {
            return Err(AppError::Conflict(format!(
                "course {} already saved for user {}",
                course_id, user_id
            )));
        }

        let row = SavedCourse {
            id: inner.next_id,
            user_id,
            course_id,
            notes,
            created_at: Utc::now().to_rfc3339(),
        };
        inner.next_id += 1;
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn update_notes(&self, id: i64, notes: Option<String>) -> Result<SavedCourse, AppError> {
        let mut inner = self.inner.write().unwrap();
        match inner.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.notes = notes;
                Ok(row.clone())
            }
            None => Err(AppError::NotFound),
        }
    }

    async fn delete_by_key(&self, user_id: i64, course_id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.rows.len();
        inner
            .rows
            .retain(|r| !(r.user_id == user_id && r.course_id == course_id));
        Ok(inner.rows.len() < before)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.rows.len();
        inner.rows.retain(|r| r.id != id);
        Ok(inner.rows.len() < before)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<SavedCourse>, AppError> {
        let inner = self.inner.read().unwrap();
        // Rows are appended in creation order, so a filter keeps that order.
        Ok(inner
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}
