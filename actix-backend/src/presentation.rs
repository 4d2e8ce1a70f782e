//! List filtering and comment rendering helpers shared by the snippet views.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::Snippet;

/// How many distinct languages are offered as quick filters.
pub const POPULAR_LANGUAGES: usize = 5;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```([\w-]*)\n([\s\S]*?)\n```").expect("code fence pattern is valid"));

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnippetFilter {
    pub search: Option<String>,
    pub language: Option<String>,
}

impl SnippetFilter {
    /// Case-insensitive substring match on title, language or author, plus
    /// an exact language match when one is selected. The query is used as
    /// typed, surrounding spaces included.
    pub fn matches(&self, snippet: &Snippet) -> bool {
        let matches_search = match self.search.as_deref() {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                [&snippet.title, &snippet.language, &snippet.user_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
            }
            _ => true,
        };

        let matches_language = match self.language.as_deref() {
            Some(language) if !language.is_empty() => snippet.language == language,
            _ => true,
        };

        matches_search && matches_language
    }

    pub fn apply(&self, snippets: Vec<Snippet>) -> Vec<Snippet> {
        snippets.into_iter().filter(|s| self.matches(s)).collect()
    }
}

/// Distinct languages in first-seen order.
pub fn distinct_languages(snippets: &[Snippet]) -> Vec<String> {
    let languages: IndexSet<&str> = snippets.iter().map(|s| s.language.as_str()).collect();
    languages.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommentSegment {
    Text { text: String },
    Code { language: String, code: String },
}

/// Splits comment content into plain text and fenced code blocks
/// (```` ```lang\n...\n``` ````), in order. Empty text between blocks is dropped.
pub fn split_comment(content: &str) -> Vec<CommentSegment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for captures in CODE_FENCE.captures_iter(content) {
        let Some(whole) = captures.get(0) else { continue };
        push_text(&mut segments, &content[last..whole.start()]);
        segments.push(CommentSegment::Code {
            language: captures.get(1).map_or("", |m| m.as_str()).to_string(),
            code: captures.get(2).map_or("", |m| m.as_str()).to_string(),
        });
        last = whole.end();
    }
    push_text(&mut segments, &content[last..]);

    segments
}

fn push_text(segments: &mut Vec<CommentSegment>, text: &str) {
    if !text.is_empty() {
        segments.push(CommentSegment::Text { text: text.to_string() });
    }
}
