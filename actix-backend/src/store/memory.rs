use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Repository, StoreResult};
use crate::models::{
    CodeExecution, ExecutionCursor, NewComment, NewExecution, NewSnippet, Snippet, SnippetComment, Star, User,
    UserProfile,
};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    // Kept in insertion order.
    executions: Vec<CodeExecution>,
    snippets: Vec<Snippet>,
    comments: Vec<SnippetComment>,
    stars: Vec<Star>,
}

/// Process-local repository for tests and `STORAGE=memory` development runs.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(mut rows: Vec<T>, key: impl Fn(&T) -> (DateTime<Utc>, Uuid)) -> Vec<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn upsert_user(&self, profile: &UserProfile) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .entry(profile.user_id.clone())
            .and_modify(|user| {
                user.email = profile.email.clone();
                user.name = profile.name.clone();
            })
            .or_insert_with(|| User {
                user_id: profile.user_id.clone(),
                email: profile.email.clone(),
                name: profile.name.clone(),
                is_pro: false,
                pro_since: None,
                created_at: profile.created_at,
            });
        Ok(user.clone())
    }

    async fn set_pro(&self, user_id: &str, since: DateTime<Utc>) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(user_id).map(|user| {
            user.is_pro = true;
            user.pro_since = Some(since);
            user.clone()
        }))
    }

    async fn insert_execution(&self, execution: NewExecution) -> StoreResult<CodeExecution> {
        let record = CodeExecution {
            id: Uuid::new_v4(),
            user_id: execution.user_id,
            language: execution.language,
            code: execution.code,
            output: execution.output,
            error: execution.error,
            created_at: execution.created_at,
        };
        self.tables.write().await.executions.push(record.clone());
        Ok(record)
    }

    async fn list_executions(&self, user_id: &str) -> StoreResult<Vec<CodeExecution>> {
        let tables = self.tables.read().await;
        let mut records: Vec<CodeExecution> = tables
            .executions
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by_key(|e| e.created_at);
        Ok(records)
    }

    async fn page_executions(
        &self,
        user_id: &str,
        after: Option<&ExecutionCursor>,
        limit: usize,
    ) -> StoreResult<Vec<CodeExecution>> {
        let tables = self.tables.read().await;
        let records: Vec<CodeExecution> = tables
            .executions
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| after.map_or(true, |cursor| cursor.precedes(e)))
            .cloned()
            .collect();
        Ok(newest_first(records, |e| (e.created_at, e.id)).into_iter().take(limit).collect())
    }

    async fn insert_snippet(&self, snippet: NewSnippet) -> StoreResult<Snippet> {
        let record = Snippet {
            id: Uuid::new_v4(),
            user_id: snippet.user_id,
            user_name: snippet.user_name,
            title: snippet.title,
            language: snippet.language,
            code: snippet.code,
            created_at: snippet.created_at,
        };
        self.tables.write().await.snippets.push(record.clone());
        Ok(record)
    }

    async fn get_snippet(&self, id: Uuid) -> StoreResult<Option<Snippet>> {
        Ok(self.tables.read().await.snippets.iter().find(|s| s.id == id).cloned())
    }

    async fn list_snippets(&self) -> StoreResult<Vec<Snippet>> {
        let snippets = self.tables.read().await.snippets.clone();
        Ok(newest_first(snippets, |s| (s.created_at, s.id)))
    }

    async fn delete_snippet(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.snippets.len();
        tables.snippets.retain(|s| s.id != id);
        Ok(tables.snippets.len() != before)
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<SnippetComment> {
        let record = SnippetComment {
            id: Uuid::new_v4(),
            snippet_id: comment.snippet_id,
            user_id: comment.user_id,
            user_name: comment.user_name,
            content: comment.content,
            created_at: comment.created_at,
        };
        self.tables.write().await.comments.push(record.clone());
        Ok(record)
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<SnippetComment>> {
        Ok(self.tables.read().await.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, snippet_id: Uuid) -> StoreResult<Vec<SnippetComment>> {
        let tables = self.tables.read().await;
        let comments: Vec<SnippetComment> = tables
            .comments
            .iter()
            .filter(|c| c.snippet_id == snippet_id)
            .cloned()
            .collect();
        Ok(newest_first(comments, |c| (c.created_at, c.id)))
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() != before)
    }

    async fn delete_comments_for_snippet(&self, snippet_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.snippet_id != snippet_id);
        Ok((before - tables.comments.len()) as u64)
    }

    async fn find_star(&self, user_id: &str, snippet_id: Uuid) -> StoreResult<Option<Star>> {
        let tables = self.tables.read().await;
        Ok(tables
            .stars
            .iter()
            .find(|s| s.user_id == user_id && s.snippet_id == snippet_id)
            .cloned())
    }

    async fn insert_star(&self, user_id: &str, snippet_id: Uuid, at: DateTime<Utc>) -> StoreResult<Star> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .stars
            .iter()
            .find(|s| s.user_id == user_id && s.snippet_id == snippet_id)
        {
            return Ok(existing.clone());
        }
        let star = Star {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            snippet_id,
            created_at: at,
        };
        tables.stars.push(star.clone());
        Ok(star)
    }

    async fn delete_star(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.stars.len();
        tables.stars.retain(|s| s.id != id);
        Ok(tables.stars.len() != before)
    }

    async fn delete_stars_for_snippet(&self, snippet_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.stars.len();
        tables.stars.retain(|s| s.snippet_id != snippet_id);
        Ok((before - tables.stars.len()) as u64)
    }

    async fn list_stars_by_user(&self, user_id: &str) -> StoreResult<Vec<Star>> {
        let tables = self.tables.read().await;
        Ok(tables.stars.iter().filter(|s| s.user_id == user_id).cloned().collect())
    }

    async fn count_stars(&self, snippet_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.stars.iter().filter(|s| s.snippet_id == snippet_id).count() as i64)
    }
}
