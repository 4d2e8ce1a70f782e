use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    models::{timestamp_now, CodeExecution},
    store::Repository,
};

use super::AccessResult;

/// Placeholder for a language statistic with no data behind it.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_executions: usize,
    pub languages_count: usize,
    pub languages: Vec<String>,
    pub last_24_hours: usize,
    pub favorite_language: String,
    /// Executions per language, in first-used order.
    pub language_stats: IndexMap<String, usize>,
    pub most_starred_language: String,
}

fn count_in_order<'a>(languages: impl IntoIterator<Item = &'a str>) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for language in languages {
        *counts.entry(language.to_string()).or_insert(0) += 1;
    }
    counts
}

/// `executions` must be in creation order; `starred_languages` in star order.
pub fn compute_stats<'a>(
    executions: &[CodeExecution],
    starred_languages: impl IntoIterator<Item = &'a str>,
    now: DateTime<Utc>,
) -> UserStats {
    let since = now - Duration::hours(24);
    let last_24_hours = executions.iter().filter(|e| e.created_at > since).count();

    let language_stats = count_in_order(executions.iter().map(|e| e.language.as_str()));

    // Pairwise "keep the left one only if strictly larger": among equal
    // counts the language used first loses to the later one.
    let favorite_language = language_stats
        .iter()
        .reduce(|best, next| if best.1 > next.1 { best } else { next })
        .map(|(language, _)| language.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    // Highest count wins, ties go to the first language encountered.
    let starred = count_in_order(starred_languages);
    let most_starred_language = starred
        .iter()
        .fold(None::<(&String, usize)>, |best, (language, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((language, count)),
        })
        .map(|(language, _)| language.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    UserStats {
        total_executions: executions.len(),
        languages_count: language_stats.len(),
        languages: language_stats.keys().cloned().collect(),
        last_24_hours,
        favorite_language,
        language_stats,
        most_starred_language,
    }
}

pub async fn get_user_stats(repo: &dyn Repository, user_id: &str) -> AccessResult<UserStats> {
    let executions = repo.list_executions(user_id).await?;

    let mut starred_languages = Vec::new();
    for star in repo.list_stars_by_user(user_id).await? {
        // Stars can briefly outlive a snippet whose deletion is in progress.
        if let Some(snippet) = repo.get_snippet(star.snippet_id).await? {
            starred_languages.push(snippet.language);
        }
    }

    Ok(compute_stats(
        &executions,
        starred_languages.iter().map(String::as_str),
        timestamp_now(),
    ))
}
