use axum::Json;
use axum::extract::Path;
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::models::{SavedCourse, SavedCourseDetails};
use crate::services::{BookmarkService, BookmarkStatus, SearchHit, SearchService, ToggleOutcome};
use crate::state::AppState;

/// Response envelope shared by every endpoint. The failure shape (success
/// false, error + message, no data) is produced by [`AppError`]'s
/// `IntoResponse`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/simple-search/courses", post(search_courses))
        .route("/api/saved-courses/toggle", post(toggle_bookmark))
        .route(
            "/api/saved-courses/check/{user_id}/{course_id}",
            get(check_bookmark),
        )
        .route(
            "/api/saved-courses/{id}",
            get(list_saved_courses).delete(remove_bookmark),
        )
        .route("/api/saved-courses/{id}/notes", put(update_bookmark_notes))
        .with_state(state)
}

fn bookmark_service(state: &AppState) -> BookmarkService {
    BookmarkService::new(
        state.bookmarks.clone(),
        state.catalog.clone(),
        state.normalize.clone(),
    )
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "coursefinder backend is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "search": "/api/simple-search/courses",
            "savedCourses": "/api/saved-courses/{userId}",
            "toggle": "/api/saved-courses/toggle",
            "check": "/api/saved-courses/check/{userId}/{courseId}",
            "notes": "/api/saved-courses/{bookmarkId}/notes"
        }
    }))
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchCoursesRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    user_qualifications: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    pub courses: Vec<SearchHit>,
    pub total: usize,
    pub query: String,
}

async fn search_courses(
    State(state): State<AppState>,
    Json(req): Json<SearchCoursesRequest>,
) -> Result<Json<Envelope<SearchData>>, AppError> {
    if req.user_qualifications.is_some() {
        // Accepted for wire compatibility; matching is substring-only.
        debug!("ignoring userQualifications in search request");
    }

    let query = req.query.unwrap_or_default();
    let service = SearchService::new(
        state.bookmarks.clone(),
        state.catalog.clone(),
        state.normalize.clone(),
    );
    let courses = service.search(&query, req.user_id).await?;

    Ok(Json(Envelope::ok(SearchData {
        total: courses.len(),
        courses,
        query,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToggleRequest {
    user_id: i64,
    course_id: i64,
}

async fn toggle_bookmark(
    State(state): State<AppState>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<Envelope<ToggleOutcome>>, AppError> {
    let outcome = bookmark_service(&state)
        .toggle(req.user_id, req.course_id)
        .await?;

    let message = if outcome.bookmarked {
        "Course saved"
    } else {
        "Course removed"
    };
    Ok(Json(Envelope::ok_with_message(outcome, message)))
}

async fn check_bookmark(
    State(state): State<AppState>,
    Path((user_id, course_id)): Path<(i64, i64)>,
) -> Result<Json<Envelope<BookmarkStatus>>, AppError> {
    let status = bookmark_service(&state)
        .check_status(user_id, course_id)
        .await?;
    Ok(Json(Envelope::ok(status)))
}

async fn list_saved_courses(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Envelope<Vec<SavedCourseDetails>>>, AppError> {
    let saved = bookmark_service(&state).list_for_user(user_id).await?;
    Ok(Json(Envelope::ok(saved)))
}

#[derive(Debug, Deserialize)]
struct NotesRequest {
    notes: Option<String>,
}

async fn update_bookmark_notes(
    State(state): State<AppState>,
    Path(bookmark_id): Path<i64>,
    Json(req): Json<NotesRequest>,
) -> Result<Json<Envelope<SavedCourse>>, AppError> {
    let updated = bookmark_service(&state)
        .update_notes(bookmark_id, req.notes)
        .await?;
    Ok(Json(Envelope::ok_with_message(updated, "Notes updated")))
}

async fn remove_bookmark(
    State(state): State<AppState>,
    Path(bookmark_id): Path<i64>,
) -> Result<Json<Envelope<()>>, AppError> {
    bookmark_service(&state).remove(bookmark_id).await?;
    Ok(Json(Envelope {
        success: true,
        data: None,
        error: None,
        message: Some("Bookmark removed".to_string()),
    }))
}
