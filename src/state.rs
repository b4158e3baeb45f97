use std::sync::Arc;

use sqlx::SqlitePool;

use crate::bookmarks::BookmarkStore;
use crate::catalog::{CatalogSource, NormalizeOptions};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub bookmarks: Arc<dyn BookmarkStore>,
    pub catalog: Arc<dyn CatalogSource>,
    pub normalize: NormalizeOptions,
}
