use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Repository, StoreResult};
use crate::models::{
    CodeExecution, ExecutionCursor, NewComment, NewExecution, NewSnippet, Snippet, SnippetComment, Star, User,
    UserProfile,
};

pub struct PgRepository {
    db: Pool<Postgres>,
}

impl PgRepository {
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn upsert_user(&self, profile: &UserProfile) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, email, name, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
               SET email = EXCLUDED.email,
                   name  = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(&profile.user_id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(profile.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn set_pro(&self, user_id: &str, since: DateTime<Utc>) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET is_pro    = TRUE,
                   pro_since = $2
             WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert_execution(&self, execution: NewExecution) -> StoreResult<CodeExecution> {
        let rec = sqlx::query_as::<_, CodeExecution>(
            r#"
            INSERT INTO code_executions (id, user_id, language, code, output, error, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(execution.user_id)
        .bind(execution.language)
        .bind(execution.code)
        .bind(execution.output)
        .bind(execution.error)
        .bind(execution.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(rec)
    }

    async fn list_executions(&self, user_id: &str) -> StoreResult<Vec<CodeExecution>> {
        let records = sqlx::query_as::<_, CodeExecution>(
            "SELECT * FROM code_executions WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(records)
    }

    async fn page_executions(
        &self,
        user_id: &str,
        after: Option<&ExecutionCursor>,
        limit: usize,
    ) -> StoreResult<Vec<CodeExecution>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM code_executions WHERE user_id = ");
        qb.push_bind(user_id);

        if let Some(cursor) = after {
            qb.push(" AND (created_at, id) < (")
                .push_bind(cursor.created_at)
                .push(", ")
                .push_bind(cursor.id)
                .push(")");
        }

        qb.push(" ORDER BY created_at DESC, id DESC")
            .push(" LIMIT ")
            .push_bind(limit as i64);

        let records: Vec<CodeExecution> = qb.build_query_as().fetch_all(&self.db).await?;
        Ok(records)
    }

    async fn insert_snippet(&self, snippet: NewSnippet) -> StoreResult<Snippet> {
        let rec = sqlx::query_as::<_, Snippet>(
            r#"
            INSERT INTO snippets (id, user_id, user_name, title, language, code, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(snippet.user_id)
        .bind(snippet.user_name)
        .bind(snippet.title)
        .bind(snippet.language)
        .bind(snippet.code)
        .bind(snippet.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(rec)
    }

    async fn get_snippet(&self, id: Uuid) -> StoreResult<Option<Snippet>> {
        let snippet = sqlx::query_as::<_, Snippet>("SELECT * FROM snippets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(snippet)
    }

    async fn list_snippets(&self) -> StoreResult<Vec<Snippet>> {
        let snippets = sqlx::query_as::<_, Snippet>("SELECT * FROM snippets ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.db)
            .await?;
        Ok(snippets)
    }

    async fn delete_snippet(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM snippets WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<SnippetComment> {
        let rec = sqlx::query_as::<_, SnippetComment>(
            r#"
            INSERT INTO snippet_comments (id, snippet_id, user_id, user_name, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(comment.snippet_id)
        .bind(comment.user_id)
        .bind(comment.user_name)
        .bind(comment.content)
        .bind(comment.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(rec)
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<SnippetComment>> {
        let comment = sqlx::query_as::<_, SnippetComment>("SELECT * FROM snippet_comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(comment)
    }

    async fn list_comments(&self, snippet_id: Uuid) -> StoreResult<Vec<SnippetComment>> {
        let comments = sqlx::query_as::<_, SnippetComment>(
            r#"
            SELECT *
              FROM snippet_comments
             WHERE snippet_id = $1
             ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(snippet_id)
        .fetch_all(&self.db)
        .await?;
        Ok(comments)
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM snippet_comments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_comments_for_snippet(&self, snippet_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM snippet_comments WHERE snippet_id = $1")
            .bind(snippet_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_star(&self, user_id: &str, snippet_id: Uuid) -> StoreResult<Option<Star>> {
        let star = sqlx::query_as::<_, Star>(
            r#"
            SELECT *
              FROM stars
             WHERE user_id    = $1
               AND snippet_id = $2
            "#,
        )
        .bind(user_id)
        .bind(snippet_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(star)
    }

    async fn insert_star(&self, user_id: &str, snippet_id: Uuid, at: DateTime<Utc>) -> StoreResult<Star> {
        // A concurrent toggle may have inserted the pair already; hand back that row.
        let star = sqlx::query_as::<_, Star>(
            r#"
            INSERT INTO stars (id, user_id, snippet_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, snippet_id) DO UPDATE
               SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(snippet_id)
        .bind(at)
        .fetch_one(&self.db)
        .await?;
        Ok(star)
    }

    async fn delete_star(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM stars WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_stars_for_snippet(&self, snippet_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM stars WHERE snippet_id = $1")
            .bind(snippet_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_stars_by_user(&self, user_id: &str) -> StoreResult<Vec<Star>> {
        let stars = sqlx::query_as::<_, Star>(
            "SELECT * FROM stars WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(stars)
    }

    async fn count_stars(&self, snippet_id: Uuid) -> StoreResult<i64> {
        let (stars,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stars WHERE snippet_id = $1")
            .bind(snippet_id)
            .fetch_one(&self.db)
            .await?;
        Ok(stars)
    }
}
