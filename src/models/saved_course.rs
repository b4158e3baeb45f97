use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Course;

/// One bookmark row. `(user_id, course_id)` is the natural key and the store
/// enforces at most one row per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SavedCourse {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub notes: Option<String>,
    pub created_at: String,
}

/// A saved course joined with its catalog detail, as returned to clients.
/// `course` is absent when the catalog no longer carries the course id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCourseDetails {
    #[serde(flatten)]
    pub saved: SavedCourse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
}
