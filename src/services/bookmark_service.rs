use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::bookmarks::BookmarkStore;
use crate::catalog::{CatalogSource, NormalizeOptions, normalize_catalog};
use crate::error::AppError;
use crate::models::{Course, SavedCourse, SavedCourseDetails};

/// Lifecycle manager for saved courses.
///
/// Per `(user_id, course_id)` key the state machine is
/// `ABSENT -> BOOKMARKED -> ABSENT`; a notes update is a self-transition on
/// `BOOKMARKED`. The manager takes no locks: concurrent toggles on the same
/// key are serialized by the store's natural-key uniqueness, and an insert
/// conflict is read back instead of surfaced.
pub struct BookmarkService {
    store: Arc<dyn BookmarkStore>,
    catalog: Arc<dyn CatalogSource>,
    options: NormalizeOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub bookmarked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkStatus {
    pub is_bookmarked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl BookmarkService {
    pub fn new(
        store: Arc<dyn BookmarkStore>,
        catalog: Arc<dyn CatalogSource>,
        options: NormalizeOptions,
    ) -> Self {
        Self {
            store,
            catalog,
            options,
        }
    }

    /// Save the course when it is not saved, unsave it when it is.
    pub async fn toggle(&self, user_id: i64, course_id: i64) -> Result<ToggleOutcome, AppError> {
        if self.store.find_by_key(user_id, course_id).await?.is_some() {
            self.store.delete_by_key(user_id, course_id).await?;
            info!("user {} unsaved course {}", user_id, course_id);
            return Ok(ToggleOutcome {
                bookmarked: false,
                id: None,
            });
        }

        match self.store.insert(user_id, course_id, None).await {
            Ok(row) => {
                info!("user {} saved course {}", user_id, course_id);
                Ok(ToggleOutcome {
                    bookmarked: true,
                    id: Some(row.id),
                })
            }
            Err(AppError::Conflict(_)) => {
                // A concurrent toggle created the row between our read and
                // insert. The surviving row wins; report it instead of the
                // storage conflict.
                match self.store.find_by_key(user_id, course_id).await? {
                    Some(row) => Ok(ToggleOutcome {
                        bookmarked: true,
                        id: Some(row.id),
                    }),
                    None => {
                        let row = self.store.insert(user_id, course_id, None).await?;
                        Ok(ToggleOutcome {
                            bookmarked: true,
                            id: Some(row.id),
                        })
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Pure lookup, no side effects.
    pub async fn check_status(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<BookmarkStatus, AppError> {
        let row = self.store.find_by_key(user_id, course_id).await?;
        Ok(BookmarkStatus {
            is_bookmarked: row.is_some(),
            id: row.map(|r| r.id),
        })
    }

    /// Full replace of the notes on an existing bookmark.
    pub async fn update_notes(
        &self,
        bookmark_id: i64,
        notes: Option<String>,
    ) -> Result<SavedCourse, AppError> {
        self.store.update_notes(bookmark_id, notes).await
    }

    /// Remove by id. A stale id is reported as [`AppError::NotFound`] rather
    /// than swallowed, so callers can tell "already gone" from "just removed".
    pub async fn remove(&self, bookmark_id: i64) -> Result<(), AppError> {
        if self.store.delete_by_id(bookmark_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    /// Saved courses in creation order, joined with catalog detail.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<SavedCourseDetails>, AppError> {
        let rows = self.store.list_by_user(user_id).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let raws = self.catalog.fetch_courses().await?;
        let by_id: HashMap<i64, Course> = normalize_catalog(raws, &self.options)
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(rows
            .into_iter()
            .map(|saved| {
                let course = by_id.get(&saved.course_id).cloned();
                SavedCourseDetails { saved, course }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::memory::MemoryBookmarkStore;
    use crate::catalog::StaticCatalogSource;
    use async_trait::async_trait;

    fn service_with(store: Arc<dyn BookmarkStore>) -> BookmarkService {
        BookmarkService::new(
            store,
            Arc::new(StaticCatalogSource::seeded()),
            NormalizeOptions::default(),
        )
    }

    #[tokio::test]
    async fn toggle_flips_between_saved_and_unsaved() {
        let service = service_with(Arc::new(MemoryBookmarkStore::new()));

        let first = service.toggle(7, 1).await.unwrap();
        assert!(first.bookmarked);
        let first_id = first.id.expect("saving returns the new id");

        let second = service.toggle(7, 1).await.unwrap();
        assert!(!second.bookmarked);
        assert_eq!(second.id, None);

        // Saving again creates a fresh row; the old id is gone for good.
        let third = service.toggle(7, 1).await.unwrap();
        assert!(third.bookmarked);
        assert_ne!(third.id.unwrap(), first_id);
    }

    #[tokio::test]
    async fn at_most_one_row_per_key_after_any_toggle_sequence() {
        let store = Arc::new(MemoryBookmarkStore::new());
        let service = service_with(store.clone());

        for _ in 0..5 {
            service.toggle(7, 1).await.unwrap();
            let rows = store.list_by_user(7).await.unwrap();
            assert!(rows.iter().filter(|r| r.course_id == 1).count() <= 1);
        }
    }

    #[tokio::test]
    async fn check_status_reflects_toggle() {
        let service = service_with(Arc::new(MemoryBookmarkStore::new()));

        let status = service.check_status(7, 1).await.unwrap();
        assert!(!status.is_bookmarked);
        assert_eq!(status.id, None);

        let saved = service.toggle(7, 1).await.unwrap();
        let status = service.check_status(7, 1).await.unwrap();
        assert!(status.is_bookmarked);
        assert_eq!(status.id, saved.id);
    }

    #[tokio::test]
    async fn update_notes_on_removed_bookmark_is_not_found() {
        let service = service_with(Arc::new(MemoryBookmarkStore::new()));

        let saved = service.toggle(7, 1).await.unwrap();
        let id = saved.id.unwrap();

        let updated = service
            .update_notes(id, Some("check deadline".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("check deadline"));

        service.remove(id).await.unwrap();
        let err = service.update_notes(id, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn remove_of_stale_id_is_not_found() {
        let service = service_with(Arc::new(MemoryBookmarkStore::new()));

        let saved = service.toggle(7, 1).await.unwrap();
        let id = saved.id.unwrap();
        service.remove(id).await.unwrap();

        let err = service.remove(id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn list_joins_catalog_detail_in_creation_order() {
        let service = service_with(Arc::new(MemoryBookmarkStore::new()));

        service.toggle(7, 2).await.unwrap();
        service.toggle(7, 1).await.unwrap();
        // Course 999 is not in the seed catalog.
        service.toggle(7, 999).await.unwrap();

        let listed = service.list_for_user(7).await.unwrap();
        let course_ids: Vec<i64> = listed.iter().map(|d| d.saved.course_id).collect();
        assert_eq!(course_ids, vec![2, 1, 999]);

        assert_eq!(
            listed[0].course.as_ref().map(|c| c.name.as_str()),
            Some("Business Administration")
        );
        assert!(listed[2].course.is_none());
    }

    /// Store double that simulates losing the insert race: the insert fails
    /// with a conflict while the competing row lands in the backing store.
    struct RacingStore {
        inner: MemoryBookmarkStore,
    }

    #[async_trait]
    impl BookmarkStore for RacingStore {
        async fn find_by_key(
            &self,
            user_id: i64,
            course_id: i64,
        ) -> Result<Option<SavedCourse>, AppError> {
            self.inner.find_by_key(user_id, course_id).await
        }

        async fn insert(
            &self,
            user_id: i64,
            course_id: i64,
            _notes: Option<String>,
        ) -> Result<SavedCourse, AppError> {
            self.inner.insert(user_id, course_id, None).await?;
            Err(AppError::Conflict("lost the race".to_string()))
        }

        async fn update_notes(
            &self,
            id: i64,
            notes: Option<String>,
        ) -> Result<SavedCourse, AppError> {
            self.inner.update_notes(id, notes).await
        }

        async fn delete_by_key(&self, user_id: i64, course_id: i64) -> Result<bool, AppError> {
            self.inner.delete_by_key(user_id, course_id).await
        }

        async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
            self.inner.delete_by_id(id).await
        }

        async fn list_by_user(&self, user_id: i64) -> Result<Vec<SavedCourse>, AppError> {
            self.inner.list_by_user(user_id).await
        }
    }

    #[tokio::test]
    async fn toggle_absorbs_insert_conflict_and_reports_surviving_row() {
        let store = Arc::new(RacingStore {
            inner: MemoryBookmarkStore::new(),
        });
        let service = service_with(store.clone());

        let outcome = service.toggle(7, 1).await.unwrap();
        assert!(outcome.bookmarked);

        let surviving = store.find_by_key(7, 1).await.unwrap().unwrap();
        assert_eq!(outcome.id, Some(surviving.id));
    }
}
