use serde::Deserialize;

use crate::{
    languages::FREE_LANGUAGE,
    models::{timestamp_now, CodeExecution, ExecutionCursor, ExecutionPage, Identity, NewExecution},
    store::Repository,
};

use super::{require_identity, AccessError, AccessResult};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct RecordExecution {
    pub language: String,
    pub code: String,
    pub output: Option<String>,
    pub error: Option<String>,
}

/// Appends an execution record for the caller. Every language except the
/// free one needs the caller's pro flag at write time.
pub async fn record_execution(
    repo: &dyn Repository,
    identity: Option<&Identity>,
    request: RecordExecution,
) -> AccessResult<CodeExecution> {
    let identity = require_identity(identity)?;

    if request.language != FREE_LANGUAGE {
        let is_pro = repo
            .find_user(&identity.subject)
            .await?
            .map_or(false, |user| user.is_pro);
        if !is_pro {
            log::warn!("user {} tried to run {} without pro", identity.subject, request.language);
            return Err(AccessError::ProRequired);
        }
    }

    let record = repo
        .insert_execution(NewExecution {
            user_id: identity.subject.clone(),
            language: request.language,
            code: request.code,
            output: request.output,
            error: request.error,
            created_at: timestamp_now(),
        })
        .await?;

    log::debug!("recorded {} execution {} for {}", record.language, record.id, record.user_id);
    Ok(record)
}

/// Newest-first slice of a user's execution history.
pub async fn list_executions(
    repo: &dyn Repository,
    user_id: &str,
    cursor: Option<&str>,
    limit: Option<usize>,
) -> AccessResult<ExecutionPage> {
    let after = match cursor.filter(|raw| !raw.is_empty()) {
        Some(raw) => Some(
            ExecutionCursor::decode(raw).ok_or_else(|| AccessError::Invalid(format!("Invalid cursor: {raw}")))?,
        ),
        None => None,
    };
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    // One extra row tells whether another page exists.
    let mut page = repo.page_executions(user_id, after.as_ref(), limit + 1).await?;
    let is_done = page.len() <= limit;
    page.truncate(limit);

    let continue_cursor = if is_done {
        None
    } else {
        page.last().map(|last| ExecutionCursor::after(last).encode())
    };

    Ok(ExecutionPage { page, is_done, continue_cursor })
}
