//! Client for the remote code execution service (Piston API).
//!
//! The service accepts `{language, version, files: [{content}]}` and answers
//! with the compile and run stages of the program. [`interpret`] turns that
//! answer into the single output-or-error outcome shown to the user.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::languages::Runtime;

pub const DEFAULT_PISTON_URL: &str = "https://emkc.org/api/v2/piston/execute";

/// Shown when the execution service could not be reached or answered garbage.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "An error occurred while running the code";

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("execution service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("execution service answered with status {0}")]
    Status(u16),
}

#[derive(Debug, Serialize)]
pub struct ExecuteRequest<'a> {
    pub language: &'a str,
    pub version: &'a str,
    pub files: Vec<SourceFile<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SourceFile<'a> {
    pub content: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageResult {
    pub code: Option<i64>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

impl StageResult {
    fn failed(&self) -> bool {
        self.code != Some(0)
    }

    /// stderr, or stdout/combined output when stderr is empty.
    fn failure_text(&self) -> String {
        [&self.stderr, &self.stdout, &self.output]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
            .cloned()
            .unwrap_or_default()
    }

    fn success_text(&self) -> &str {
        self.output
            .as_deref()
            .or(self.stdout.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteResponse {
    pub message: Option<String>,
    pub compile: Option<StageResult>,
    pub run: Option<StageResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { output: String },
    Failed { error: String },
}

/// Reads a service answer in priority order: service message, compile stage,
/// run stage, then the trimmed run output. An answer without a run stage is
/// reported like a transport failure.
pub fn interpret(response: &ExecuteResponse) -> Outcome {
    if let Some(message) = response.message.as_deref() {
        if !message.is_empty() {
            return Outcome::Failed { error: message.to_string() };
        }
    }

    if let Some(compile) = response.compile.as_ref().filter(|stage| stage.failed()) {
        return Outcome::Failed { error: compile.failure_text() };
    }

    match &response.run {
        Some(run) if run.failed() => Outcome::Failed { error: run.failure_text() },
        Some(run) => Outcome::Succeeded { output: run.success_text().trim().to_string() },
        // No run stage means the answer is not one we can read.
        None => Outcome::Failed { error: TRANSPORT_FAILURE_MESSAGE.to_string() },
    }
}

/// Seam over the execution service so the editor store can be driven by a fake.
#[async_trait]
pub trait CodeRunner {
    async fn execute(&self, runtime: &Runtime, source: &str) -> Result<ExecuteResponse, RunnerError>;
}

pub struct PistonClient {
    client: Client,
    url: String,
}

impl PistonClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CodeRunner for PistonClient {
    async fn execute(&self, runtime: &Runtime, source: &str) -> Result<ExecuteResponse, RunnerError> {
        let body = ExecuteRequest {
            language: runtime.language,
            version: runtime.version,
            files: vec![SourceFile { content: source }],
        };

        let response = self.client.post(&self.url).json(&body).send().await?;

        // Piston reports bad runtimes as 400 with a `message` body, which
        // `interpret` surfaces; anything else non-JSON is a transport failure.
        let status = response.status();
        match response.json::<ExecuteResponse>().await {
            Ok(parsed) => {
                log::debug!("execution service answered {} for {}", status, runtime.language);
                Ok(parsed)
            }
            Err(_) if !status.is_success() => Err(RunnerError::Status(status.as_u16())),
            Err(err) => Err(err.into()),
        }
    }
}
