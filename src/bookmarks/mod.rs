//! Storage boundary for saved courses.
//!
//! The lifecycle manager depends on this capability trait only; the
//! `(user_id, course_id)` uniqueness guarantee lives in the implementation
//! (a unique index for sqlite, a key scan for the in-memory store) and is the
//! sole coordination mechanism for concurrent toggles.

pub mod memory;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::SavedCourse;

#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn find_by_key(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<SavedCourse>, AppError>;

    /// Fails with [`AppError::Conflict`] when the natural key already exists.
    async fn insert(
        &self,
        user_id: i64,
        course_id: i64,
        notes: Option<String>,
    ) -> Result<SavedCourse, AppError>;

    /// Full replace of `notes`. Fails with [`AppError::NotFound`] when no row
    /// with that id exists.
    async fn update_notes(&self, id: i64, notes: Option<String>) -> Result<SavedCourse, AppError>;

    /// Returns true when a row was deleted.
    async fn delete_by_key(&self, user_id: i64, course_id: i64) -> Result<bool, AppError>;

    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError>;

    /// All rows for the user, creation time ascending.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<SavedCourse>, AppError>;
}
