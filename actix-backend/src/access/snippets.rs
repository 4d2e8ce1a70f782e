use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    languages,
    models::{timestamp_now, Identity, NewComment, NewSnippet, Snippet, SnippetComment},
    presentation::{distinct_languages, split_comment, CommentSegment, SnippetFilter, POPULAR_LANGUAGES},
    store::Repository,
};

use super::{require_identity, require_text, AccessError, AccessResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSnippet {
    pub title: String,
    pub language: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetList {
    pub snippets: Vec<Snippet>,
    /// Every language present before filtering, first-seen order.
    pub languages: Vec<String>,
    pub popular_languages: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: SnippetComment,
    pub segments: Vec<CommentSegment>,
}

async fn load_snippet(repo: &dyn Repository, snippet_id: Uuid) -> AccessResult<Snippet> {
    repo.get_snippet(snippet_id)
        .await?
        .ok_or_else(|| AccessError::NotFound(format!("No snippet found with id {snippet_id}")))
}

// _______________________________________ Mutations _______________________________________

pub async fn create_snippet(
    repo: &dyn Repository,
    identity: Option<&Identity>,
    request: CreateSnippet,
) -> AccessResult<Snippet> {
    let identity = require_identity(identity)?;
    let user = repo
        .find_user(&identity.subject)
        .await?
        .ok_or(AccessError::UserNotFound)?;

    require_text(&request.title, "title")?;
    if languages::find_language(&request.language).is_none() {
        return Err(AccessError::Invalid(format!("Unsupported language: {}", request.language)));
    }

    let snippet = repo
        .insert_snippet(NewSnippet {
            user_id: user.user_id,
            user_name: user.name,
            title: request.title.trim().to_string(),
            language: request.language,
            code: request.code,
            created_at: timestamp_now(),
        })
        .await?;

    log::info!("snippet {} shared by {}", snippet.id, snippet.user_id);
    Ok(snippet)
}

/// Owner-only. Comments and stars go first, the snippet last; every step is
/// delete-if-exists, so a failed call can simply be repeated.
pub async fn delete_snippet(repo: &dyn Repository, identity: Option<&Identity>, snippet_id: Uuid) -> AccessResult<()> {
    let identity = require_identity(identity)?;
    let snippet = load_snippet(repo, snippet_id).await?;

    if snippet.user_id != identity.subject {
        log::warn!("user {} tried to delete snippet {} of {}", identity.subject, snippet.id, snippet.user_id);
        return Err(AccessError::Forbidden("Not authorized to delete this snippet".into()));
    }

    let comments = repo.delete_comments_for_snippet(snippet_id).await?;
    let stars = repo.delete_stars_for_snippet(snippet_id).await?;
    repo.delete_snippet(snippet_id).await?;

    log::info!("snippet {} deleted with {} comments and {} stars", snippet_id, comments, stars);
    Ok(())
}

/// Flips the caller's star on a snippet and returns whether it is now starred.
pub async fn toggle_star(repo: &dyn Repository, identity: Option<&Identity>, snippet_id: Uuid) -> AccessResult<bool> {
    let identity = require_identity(identity)?;
    load_snippet(repo, snippet_id).await?;

    match repo.find_star(&identity.subject, snippet_id).await? {
        Some(star) => {
            repo.delete_star(star.id).await?;
            Ok(false)
        }
        None => {
            repo.insert_star(&identity.subject, snippet_id, timestamp_now()).await?;
            Ok(true)
        }
    }
}

pub async fn add_comment(
    repo: &dyn Repository,
    identity: Option<&Identity>,
    snippet_id: Uuid,
    content: String,
) -> AccessResult<SnippetComment> {
    let identity = require_identity(identity)?;
    let user = repo
        .find_user(&identity.subject)
        .await?
        .ok_or(AccessError::UserNotFound)?;

    require_text(&content, "content")?;
    load_snippet(repo, snippet_id).await?;

    let comment = repo
        .insert_comment(NewComment {
            snippet_id,
            user_id: user.user_id,
            user_name: user.name,
            content,
            created_at: timestamp_now(),
        })
        .await?;

    log::debug!("comment {} added to snippet {}", comment.id, snippet_id);
    Ok(comment)
}

/// Author-only.
pub async fn delete_comment(repo: &dyn Repository, identity: Option<&Identity>, comment_id: Uuid) -> AccessResult<()> {
    let identity = require_identity(identity)?;
    let comment = repo
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| AccessError::NotFound(format!("No comment found with id {comment_id}")))?;

    if comment.user_id != identity.subject {
        log::warn!("user {} tried to delete comment {} of {}", identity.subject, comment.id, comment.user_id);
        return Err(AccessError::Forbidden("Not authorized to delete this comment".into()));
    }

    repo.delete_comment(comment_id).await?;
    Ok(())
}

// _______________________________________ Queries _______________________________________

pub async fn list_snippets(repo: &dyn Repository, filter: &SnippetFilter) -> AccessResult<SnippetList> {
    let snippets = repo.list_snippets().await?;
    let languages = distinct_languages(&snippets);
    let popular_languages = languages.iter().take(POPULAR_LANGUAGES).cloned().collect();

    Ok(SnippetList {
        snippets: filter.apply(snippets),
        languages,
        popular_languages,
    })
}

pub async fn get_snippet(repo: &dyn Repository, snippet_id: Uuid) -> AccessResult<Snippet> {
    load_snippet(repo, snippet_id).await
}

pub async fn get_comments(repo: &dyn Repository, snippet_id: Uuid) -> AccessResult<Vec<CommentView>> {
    let comments = repo.list_comments(snippet_id).await?;
    Ok(comments
        .into_iter()
        .map(|comment| CommentView {
            segments: split_comment(&comment.content),
            comment,
        })
        .collect())
}

/// False for anonymous callers.
pub async fn is_starred(repo: &dyn Repository, identity: Option<&Identity>, snippet_id: Uuid) -> AccessResult<bool> {
    match identity {
        Some(identity) => Ok(repo.find_star(&identity.subject, snippet_id).await?.is_some()),
        None => Ok(false),
    }
}

pub async fn star_count(repo: &dyn Repository, snippet_id: Uuid) -> AccessResult<i64> {
    Ok(repo.count_stars(snippet_id).await?)
}

/// The caller's starred snippets that still exist; empty for anonymous callers.
pub async fn starred_snippets(repo: &dyn Repository, identity: Option<&Identity>) -> AccessResult<Vec<Snippet>> {
    let Some(identity) = identity else {
        return Ok(Vec::new());
    };

    let mut snippets = Vec::new();
    for star in repo.list_stars_by_user(&identity.subject).await? {
        if let Some(snippet) = repo.get_snippet(star.snippet_id).await? {
            snippets.push(snippet);
        }
    }
    Ok(snippets)
}
