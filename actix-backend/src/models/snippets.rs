use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, Utc};

// ______________________________________ Snippets ______________________________________
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: Uuid,
    pub user_id: String,
    // Author name as it was when the snippet was shared.
    pub user_name: String,
    pub title: String,
    pub language: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSnippet {
    pub user_id: String,
    pub user_name: String,
    pub title: String,
    pub language: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

// ______________________________________ Snippet Comments ______________________________________
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnippetComment {
    pub id: Uuid,
    pub snippet_id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub snippet_id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ______________________________________ Stars ______________________________________
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Star {
    pub id: Uuid,
    pub user_id: String,
    pub snippet_id: Uuid,
    pub created_at: DateTime<Utc>,
}
