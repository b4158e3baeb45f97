pub mod repository;

pub use repository::SqliteBookmarkStore;
