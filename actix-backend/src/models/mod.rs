mod user;
pub use user::{User, UserProfile};

mod claims;
pub use claims::{Claims, Identity};

pub mod snippets;
pub use snippets::{NewComment, NewSnippet, Snippet, SnippetComment, Star};

pub mod execution;
pub use execution::{CodeExecution, ExecutionCursor, ExecutionPage, NewExecution};

use chrono::{DateTime, Utc};

/// Current time at the microsecond precision the database keeps.
pub fn timestamp_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}
