use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

// ______________________________________ User ______________________________________
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub email: Option<String>,
    pub name: String,
    pub is_pro: bool,
    pub pro_since: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Profile fields refreshed from the identity provider on every sign-in.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user_id: String,
    pub email: Option<String>,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
