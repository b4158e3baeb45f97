use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::bookmarks::BookmarkStore;
use crate::catalog::{CatalogSource, NormalizeOptions, normalize_catalog};
use crate::error::AppError;
use crate::models::Course;
use crate::search::search_catalog;
use crate::services::BookmarkStatus;

/// Catalog search in front of the pure matcher: fetch, reconcile, match,
/// and annotate hits with bookmark status when a user context is present.
/// The catalog is re-fetched per call; callers wanting a fixed snapshot use
/// [`search_catalog`] directly.
pub struct SearchService {
    store: Arc<dyn BookmarkStore>,
    catalog: Arc<dyn CatalogSource>,
    options: NormalizeOptions,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub course: Course,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<BookmarkStatus>,
}

impl SearchService {
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

    pub async fn search(
        &self,
        query: &str,
        user_id: Option<i64>,
    ) -> Result<Vec<SearchHit>, AppError> {
        let raws = self.catalog.fetch_courses().await?;
        let catalog = normalize_catalog(raws, &self.options);
        let matches = search_catalog(&catalog, query);

        let saved_by_course: HashMap<i64, i64> = match user_id {
            Some(uid) => self
                .store
                .list_by_user(uid)
                .await?
                .into_iter()
                .map(|r| (r.course_id, r.id))
                .collect(),
            None => HashMap::new(),
        };

        Ok(matches
            .into_iter()
            .map(|course| {
                let bookmark = user_id.map(|_| {
                    let id = saved_by_course.get(&course.id).copied();
                    BookmarkStatus {
                        is_bookmarked: id.is_some(),
                        id,
                    }
                });
                SearchHit { course, bookmark }
            })
            .collect())
    }
}
