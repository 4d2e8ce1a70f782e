//! Record storage behind the access layer.
//!
//! Every delete is delete-if-exists and reports whether something was
//! removed, so multi-step deletions can be re-run after a partial failure.

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CodeExecution, ExecutionCursor, NewComment, NewExecution, NewSnippet, Snippet, SnippetComment, Star, User,
    UserProfile,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Repository: Send + Sync {
    // users
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>>;
    /// Inserts the user, or refreshes name/email of an existing one.
    async fn upsert_user(&self, profile: &UserProfile) -> StoreResult<User>;
    async fn set_pro(&self, user_id: &str, since: DateTime<Utc>) -> StoreResult<Option<User>>;

    // executions
    async fn insert_execution(&self, execution: NewExecution) -> StoreResult<CodeExecution>;
    /// All executions of a user, oldest first.
    async fn list_executions(&self, user_id: &str) -> StoreResult<Vec<CodeExecution>>;
    /// Up to `limit` executions newest first, strictly after `after`.
    async fn page_executions(
        &self,
        user_id: &str,
        after: Option<&ExecutionCursor>,
        limit: usize,
    ) -> StoreResult<Vec<CodeExecution>>;

    // snippets
    async fn insert_snippet(&self, snippet: NewSnippet) -> StoreResult<Snippet>;
    async fn get_snippet(&self, id: Uuid) -> StoreResult<Option<Snippet>>;
    /// Newest first.
    async fn list_snippets(&self) -> StoreResult<Vec<Snippet>>;
    async fn delete_snippet(&self, id: Uuid) -> StoreResult<bool>;

    // comments
    async fn insert_comment(&self, comment: NewComment) -> StoreResult<SnippetComment>;
    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<SnippetComment>>;
    /// Newest first.
    async fn list_comments(&self, snippet_id: Uuid) -> StoreResult<Vec<SnippetComment>>;
    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool>;
    async fn delete_comments_for_snippet(&self, snippet_id: Uuid) -> StoreResult<u64>;

    // stars
    async fn find_star(&self, user_id: &str, snippet_id: Uuid) -> StoreResult<Option<Star>>;
    async fn insert_star(&self, user_id: &str, snippet_id: Uuid, at: DateTime<Utc>) -> StoreResult<Star>;
    async fn delete_star(&self, id: Uuid) -> StoreResult<bool>;
    async fn delete_stars_for_snippet(&self, snippet_id: Uuid) -> StoreResult<u64>;
    async fn list_stars_by_user(&self, user_id: &str) -> StoreResult<Vec<Star>>;
    async fn count_stars(&self, snippet_id: Uuid) -> StoreResult<i64>;
}
