use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ______________________________________ Code Executions ______________________________________
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeExecution {
    pub id: Uuid,
    pub user_id: String,
    pub language: String,
    pub code: String,
    pub output: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExecution {
    pub user_id: String,
    pub language: String,
    pub code: String,
    pub output: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Position in a newest-first execution listing: `(created_at, id)` of the
/// last row already handed out. Encoded as `<unix micros>:<uuid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl ExecutionCursor {
    pub fn after(execution: &CodeExecution) -> Self {
        Self {
            created_at: execution.created_at,
            id: execution.id,
        }
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.created_at.timestamp_micros(), self.id)
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (micros, id) = raw.split_once(':')?;
        Some(Self {
            created_at: DateTime::from_timestamp_micros(micros.parse().ok()?)?,
            id: Uuid::parse_str(id).ok()?,
        })
    }

    /// True when `execution` sorts strictly after this cursor in newest-first order.
    pub fn precedes(&self, execution: &CodeExecution) -> bool {
        (execution.created_at, execution.id) < (self.created_at, self.id)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPage {
    pub page: Vec<CodeExecution>,
    pub is_done: bool,
    pub continue_cursor: Option<String>,
}
