//! Editor state store: language/theme/font-size selection, the attached
//! editor buffer, per-language code caching and the run lifecycle
//! (`idle -> running -> succeeded | failed`).

pub mod storage;

use serde::Serialize;
use thiserror::Error;

use crate::{
    languages::{self, LanguageConfig, Runtime, DEFAULT_THEME, FREE_LANGUAGE},
    runner::{interpret, CodeRunner, ExecuteResponse, Outcome, RunnerError, TRANSPORT_FAILURE_MESSAGE},
};
use storage::{code_key, KeyValueStore, StorageError, FONT_SIZE_KEY, LANGUAGE_KEY, THEME_KEY};

pub const MIN_FONT_SIZE: i64 = 12;
pub const MAX_FONT_SIZE: i64 = 24;
pub const DEFAULT_FONT_SIZE: i64 = 16;

pub const EMPTY_CODE_MESSAGE: &str = "Please enter some code";

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("please enter some code")]
    EmptyCode,

    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("run result arrived after the run was superseded")]
    StaleRun,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The text widget the store reads from and writes to.
pub trait EditorHandle {
    fn value(&self) -> String;
    fn set_value(&mut self, text: &str);
}

#[derive(Debug, Default, Clone)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl EditorHandle for TextBuffer {
    fn value(&self) -> String {
        self.text.clone()
    }

    fn set_value(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Snapshot of the last completed run, ready to be recorded as an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub language: String,
    pub code: String,
    pub output: String,
    pub error: Option<String>,
}

/// Issued by [`EditorSession::begin_run`]; only the newest ticket may complete.
#[derive(Debug)]
pub struct RunTicket {
    id: u64,
    pub language: &'static str,
    pub runtime: Runtime,
    pub code: String,
}

pub fn clamp_font_size(size: i64) -> i64 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

pub struct EditorSession<S: KeyValueStore> {
    storage: S,
    language: &'static LanguageConfig,
    theme: &'static str,
    font_size: i64,
    editor: Option<Box<dyn EditorHandle>>,
    output: String,
    error: Option<String>,
    state: RunState,
    in_flight: Option<u64>,
    next_ticket: u64,
    execution_result: Option<ExecutionResult>,
}

impl<S: KeyValueStore> EditorSession<S> {
    /// Restores language, theme and font size saved by a previous session.
    pub fn new(storage: S) -> Self {
        let language = storage
            .get(LANGUAGE_KEY)
            .and_then(|id| languages::find_language(&id))
            .or_else(|| languages::find_language(FREE_LANGUAGE))
            .unwrap_or(&languages::LANGUAGES[0]);
        let theme = storage
            .get(THEME_KEY)
            .and_then(|id| languages::find_theme(&id))
            .map(|theme| theme.id)
            .unwrap_or(DEFAULT_THEME);
        let font_size = storage
            .get(FONT_SIZE_KEY)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(clamp_font_size)
            .unwrap_or(DEFAULT_FONT_SIZE);

        Self {
            storage,
            language,
            theme,
            font_size,
            editor: None,
            output: String::new(),
            error: None,
            state: RunState::Idle,
            in_flight: None,
            next_ticket: 0,
            execution_result: None,
        }
    }

    pub fn language(&self) -> &'static LanguageConfig {
        self.language
    }

    pub fn theme(&self) -> &'static str {
        self.theme
    }

    pub fn font_size(&self) -> i64 {
        self.font_size
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn execution_result(&self) -> Option<&ExecutionResult> {
        self.execution_result.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current editor text; empty when no editor is attached.
    pub fn code(&self) -> String {
        self.editor.as_ref().map(|editor| editor.value()).unwrap_or_default()
    }

    fn saved_or_default_code(&self) -> String {
        self.storage
            .get(&code_key(self.language.id))
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| self.language.default_code.to_string())
    }

    pub fn attach_editor(&mut self, mut editor: Box<dyn EditorHandle>) {
        editor.set_value(&self.saved_or_default_code());
        self.editor = Some(editor);
    }

    /// Mirrors editor edits into the per-language cache.
    pub fn on_editor_change(&mut self, text: &str) -> Result<(), EditorError> {
        if let Some(editor) = self.editor.as_mut() {
            editor.set_value(text);
        }
        if !text.is_empty() {
            self.storage.set(&code_key(self.language.id), text)?;
        }
        Ok(())
    }

    /// Saves the current buffer under the old language, then loads the new
    /// language's saved buffer or its default source.
    pub fn set_language(&mut self, id: &str) -> Result<(), EditorError> {
        let next = languages::find_language(id)
            .ok_or_else(|| EditorError::UnknownLanguage(id.to_string()))?;

        let current = self.code();
        if !current.is_empty() {
            self.storage.set(&code_key(self.language.id), &current)?;
        }
        self.storage.set(LANGUAGE_KEY, next.id)?;

        self.language = next;
        self.output.clear();
        self.error = None;
        if self.in_flight.is_none() {
            self.state = RunState::Idle;
        }

        let restored = self.saved_or_default_code();
        if let Some(editor) = self.editor.as_mut() {
            editor.set_value(&restored);
        }
        log::debug!("editor language switched to {}", next.id);
        Ok(())
    }

    pub fn set_theme(&mut self, id: &str) -> Result<(), EditorError> {
        let theme = languages::find_theme(id).ok_or_else(|| EditorError::UnknownTheme(id.to_string()))?;
        self.storage.set(THEME_KEY, theme.id)?;
        self.theme = theme.id;
        Ok(())
    }

    /// Stores `size` clamped to the supported range and returns the stored value.
    pub fn set_font_size(&mut self, size: i64) -> Result<i64, EditorError> {
        let size = clamp_font_size(size);
        self.storage.set(FONT_SIZE_KEY, &size.to_string())?;
        self.font_size = size;
        Ok(size)
    }

    /// Replaces the buffer with the language default and forgets the saved copy.
    pub fn reset_code(&mut self) -> Result<(), EditorError> {
        if let Some(editor) = self.editor.as_mut() {
            editor.set_value(self.language.default_code);
        }
        self.storage.remove(&code_key(self.language.id))?;
        Ok(())
    }

    pub fn begin_run(&mut self) -> Result<RunTicket, EditorError> {
        if self.in_flight.is_some() {
            return Err(EditorError::AlreadyRunning);
        }

        let code = self.code();
        if code.is_empty() {
            self.error = Some(EMPTY_CODE_MESSAGE.to_string());
            return Err(EditorError::EmptyCode);
        }

        self.next_ticket += 1;
        self.in_flight = Some(self.next_ticket);
        self.state = RunState::Running;
        self.error = None;
        self.output.clear();

        Ok(RunTicket {
            id: self.next_ticket,
            language: self.language.id,
            runtime: self.language.runtime,
            code,
        })
    }

    /// Settles the run identified by `ticket`. The running flag is cleared
    /// whatever the response was.
    pub fn complete_run(
        &mut self,
        ticket: RunTicket,
        response: Result<ExecuteResponse, RunnerError>,
    ) -> Result<&ExecutionResult, EditorError> {
        if self.in_flight != Some(ticket.id) {
            log::debug!("dropping result of superseded run #{}", ticket.id);
            return Err(EditorError::StaleRun);
        }
        self.in_flight = None;

        let outcome = match response {
            Ok(response) => interpret(&response),
            Err(err) => {
                log::warn!("code execution failed: {}", err);
                Outcome::Failed { error: TRANSPORT_FAILURE_MESSAGE.to_string() }
            }
        };

        let (output, error) = match outcome {
            Outcome::Succeeded { output } => {
                self.state = RunState::Succeeded;
                (output, None)
            }
            Outcome::Failed { error } => {
                self.state = RunState::Failed;
                (String::new(), Some(error))
            }
        };
        self.output = output.clone();
        self.error = error.clone();

        Ok(&*self.execution_result.insert(ExecutionResult {
            language: ticket.language.to_string(),
            code: ticket.code,
            output,
            error,
        }))
    }

    pub async fn run_code<R>(&mut self, runner: &R) -> Result<&ExecutionResult, EditorError>
    where
        R: CodeRunner + ?Sized,
    {
        let ticket = self.begin_run()?;
        let response = runner.execute(&ticket.runtime, &ticket.code).await;
        self.complete_run(ticket, response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{storage::MemoryStorage, *};

    struct ScriptedRunner {
        response: Option<ExecuteResponse>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedRunner {
        fn answering(json: &str) -> Self {
            Self {
                response: Some(serde_json::from_str(json).unwrap()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self { response: None, calls: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl CodeRunner for ScriptedRunner {
        async fn execute(&self, runtime: &Runtime, source: &str) -> Result<ExecuteResponse, RunnerError> {
            self.calls
                .lock()
                .unwrap()
                .push((format!("{}@{}", runtime.language, runtime.version), source.to_string()));
            self.response.clone().ok_or(RunnerError::Status(502))
        }
    }

    fn session_with(code: &str) -> EditorSession<MemoryStorage> {
        let mut session = EditorSession::new(MemoryStorage::default());
        session.attach_editor(Box::new(TextBuffer::default()));
        session.on_editor_change(code).unwrap();
        session
    }

    #[test]
    fn fresh_session_uses_defaults() {
        let mut session = EditorSession::new(MemoryStorage::default());
        assert_eq!(session.language().id, "javascript");
        assert_eq!(session.theme(), "vs-dark");
        assert_eq!(session.font_size(), 16);

        session.attach_editor(Box::new(TextBuffer::default()));
        assert_eq!(session.code(), session.language().default_code);
    }

    #[test]
    fn saved_preferences_are_restored() {
        let mut storage = MemoryStorage::default();
        storage.set(LANGUAGE_KEY, "rust").unwrap();
        storage.set(THEME_KEY, "monokai").unwrap();
        storage.set(FONT_SIZE_KEY, "40").unwrap();
        storage.set(&code_key("rust"), "fn main() {}").unwrap();

        let mut session = EditorSession::new(storage);
        session.attach_editor(Box::new(TextBuffer::default()));
        assert_eq!(session.language().id, "rust");
        assert_eq!(session.theme(), "monokai");
        assert_eq!(session.font_size(), 24);
        assert_eq!(session.code(), "fn main() {}");
    }

    #[test]
    fn unknown_saved_language_falls_back() {
        let mut storage = MemoryStorage::default();
        storage.set(LANGUAGE_KEY, "brainfuck").unwrap();
        assert_eq!(EditorSession::new(storage).language().id, FREE_LANGUAGE);
    }

    #[test]
    fn font_size_is_clamped_and_persisted() {
        let mut session = EditorSession::new(MemoryStorage::default());
        for (input, stored) in [(3, 12), (12, 12), (18, 18), (24, 24), (99, 24), (-5, 12)] {
            assert_eq!(session.set_font_size(input).unwrap(), stored);
            assert_eq!(session.font_size(), stored);
            assert_eq!(session.storage().get(FONT_SIZE_KEY), Some(stored.to_string()));
        }
    }

    #[test]
    fn theme_must_be_known() {
        let mut session = EditorSession::new(MemoryStorage::default());
        session.set_theme("github-dark").unwrap();
        assert_eq!(session.storage().get(THEME_KEY).as_deref(), Some("github-dark"));
        assert!(matches!(session.set_theme("neon"), Err(EditorError::UnknownTheme(_))));
        assert_eq!(session.theme(), "github-dark");
    }

    #[test]
    fn switching_language_keeps_buffers_apart() {
        let mut session = session_with("console.log('mine')");

        session.set_language("python").unwrap();
        assert_eq!(
            session.storage().get(&code_key("javascript")).as_deref(),
            Some("console.log('mine')")
        );
        assert_eq!(session.code(), session.language().default_code);
        assert_eq!(session.storage().get(LANGUAGE_KEY).as_deref(), Some("python"));

        session.on_editor_change("print('py')").unwrap();
        session.set_language("javascript").unwrap();
        assert_eq!(session.code(), "console.log('mine')");
        assert_eq!(session.storage().get(&code_key("python")).as_deref(), Some("print('py')"));
    }

    #[test]
    fn switching_language_clears_output() {
        let mut session = session_with("x");
        let ticket = session.begin_run().unwrap();
        session
            .complete_run(ticket, Ok(serde_json::from_str(r#"{"run": {"code": 1, "stderr": "boom"}}"#).unwrap()))
            .unwrap();
        assert_eq!(session.error(), Some("boom"));

        session.set_language("go").unwrap();
        assert_eq!(session.error(), None);
        assert_eq!(session.output(), "");
        assert_eq!(session.state(), RunState::Idle);
        assert!(matches!(session.set_language("cobol"), Err(EditorError::UnknownLanguage(_))));
    }

    #[test]
    fn reset_restores_default_and_forgets_buffer() {
        let mut session = session_with("let x = 1");
        session.reset_code().unwrap();
        assert_eq!(session.code(), session.language().default_code);
        assert_eq!(session.storage().get(&code_key("javascript")), None);
    }

    #[tokio::test]
    async fn empty_editor_is_rejected_locally() {
        let runner = ScriptedRunner::unreachable();
        let mut session = EditorSession::new(MemoryStorage::default());

        assert!(matches!(session.run_code(&runner).await, Err(EditorError::EmptyCode)));
        assert_eq!(session.error(), Some(EMPTY_CODE_MESSAGE));
        assert!(runner.calls.lock().unwrap().is_empty());
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn successful_run_trims_output() {
        let runner = ScriptedRunner::answering(
            r#"{"compile": {"code": 0}, "run": {"code": 0, "stdout": " 7\n", "stderr": "", "output": " 7\n"}}"#,
        );
        let mut session = session_with("console.log(7)");

        let result = session.run_code(&runner).await.unwrap().clone();
        assert_eq!(result.output, "7");
        assert_eq!(result.error, None);
        assert_eq!(result.language, "javascript");
        assert_eq!(session.output(), "7");
        assert_eq!(session.error(), None);
        assert_eq!(session.state(), RunState::Succeeded);
        assert_eq!(
            runner.calls.lock().unwrap().as_slice(),
            &[("javascript@18.15.0".to_string(), "console.log(7)".to_string())]
        );
    }

    #[tokio::test]
    async fn compile_error_is_surfaced() {
        let runner = ScriptedRunner::answering(
            r#"{"compile": {"code": 1, "stdout": "", "stderr": "expected `;`"}, "run": {"code": 0, "output": ""}}"#,
        );
        let mut session = session_with("fn main() { let x = 1 }");
        session.set_language("rust").unwrap();
        session.on_editor_change("fn main() { let x = 1 }").unwrap();

        let result = session.run_code(&runner).await.unwrap().clone();
        assert_eq!(result.error.as_deref(), Some("expected `;`"));
        assert_eq!(result.output, "");
        assert_eq!(session.output(), "");
        assert_eq!(session.state(), RunState::Failed);
    }

    #[tokio::test]
    async fn transport_failure_uses_generic_message() {
        let runner = ScriptedRunner::unreachable();
        let mut session = session_with("1 + 1");

        let result = session.run_code(&runner).await.unwrap().clone();
        assert_eq!(result.error.as_deref(), Some(TRANSPORT_FAILURE_MESSAGE));
        assert!(!session.is_running());
    }

    #[test]
    fn second_run_is_refused_while_first_is_in_flight() {
        let mut session = session_with("1");
        let first = session.begin_run().unwrap();
        assert!(session.is_running());
        assert!(matches!(session.begin_run(), Err(EditorError::AlreadyRunning)));

        session.complete_run(first, Err(RunnerError::Status(500))).unwrap();
        assert!(!session.is_running());
        assert!(session.begin_run().is_ok());
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut session = session_with("1");
        let first = session.begin_run().unwrap();
        let stale = RunTicket { id: first.id + 7, language: first.language, runtime: first.runtime, code: "old".into() };

        assert!(matches!(session.complete_run(stale, Err(RunnerError::Status(500))), Err(EditorError::StaleRun)));
        assert!(session.is_running());
        session
            .complete_run(first, Ok(serde_json::from_str(r#"{"run": {"code": 0, "output": "1\n"}}"#).unwrap()))
            .unwrap();
        assert_eq!(session.output(), "1");
    }
}
