use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use playground::{
    editor::{
        storage::{FileStorage, StorageError},
        EditorError, EditorSession, ExecutionResult, TextBuffer,
    },
    languages::{LANGUAGES, THEMES},
    runner::{PistonClient, DEFAULT_PISTON_URL},
};

#[derive(Debug, Parser)]
#[command(name = "playground-cli", version, about = "Terminal code playground")]
struct Args {
    /// Where editor preferences and per-language buffers are kept.
    #[arg(long)]
    state_file: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_PISTON_URL)]
    piston_url: String,

    /// Backend base URL; runs are recorded there when a token is given too.
    #[arg(long)]
    api_url: Option<String>,

    /// Identity provider token for the backend.
    #[arg(long)]
    token: Option<String>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no data directory available, pass --state-file")]
    NoDataDir,
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Language(&'a str),
    Theme(&'a str),
    FontSize(Option<i64>),
    Run,
    Reset,
    Show,
    Languages,
    Load(&'a str),
    Clear,
    Help,
    Quit,
    Unknown(&'a str),
    Append(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Append(line);
    };
    let (name, arg) = match rest.trim().split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest.trim(), ""),
    };

    match name {
        "lang" | "language" => Command::Language(arg),
        "theme" => Command::Theme(arg),
        "font" => Command::FontSize(arg.parse().ok()),
        "run" => Command::Run,
        "reset" => Command::Reset,
        "show" => Command::Show,
        "langs" => Command::Languages,
        "load" => Command::Load(arg),
        "clear" => Command::Clear,
        "help" => Command::Help,
        "quit" | "q" => Command::Quit,
        other => Command::Unknown(other),
    }
}

const HELP: &str = "\
Lines are appended to the buffer. Commands:
  :lang <id>    switch language (buffer is kept per language)
  :theme <id>   switch theme
  :font <n>     set font size
  :run          run the buffer
  :reset        restore the language's default code
  :show         print the buffer
  :langs        list languages and themes
  :load <file>  replace the buffer with a file
  :clear        empty the buffer
  :quit";

/// Posts a finished run to the backend's execution log.
async fn record(http: &reqwest::Client, api_url: &str, token: &str, result: &ExecutionResult) {
    let url = format!("{}/api/v1/executions", api_url.trim_end_matches('/'));
    match http.post(&url).bearer_auth(token).json(result).send().await {
        Ok(resp) if resp.status().is_success() => log::debug!("recorded {} run", result.language),
        Ok(resp) if resp.status() == reqwest::StatusCode::FORBIDDEN => {
            println!("(not recorded: {} needs a pro subscription)", result.language);
        }
        Ok(resp) => log::warn!("recording the run failed with status {}", resp.status()),
        Err(err) => log::warn!("recording the run failed: {}", err),
    }
}

fn print_result(result: &ExecutionResult) {
    match &result.error {
        Some(error) => println!("--- error ---\n{error}"),
        None => println!("--- output ---\n{}", result.output),
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let state_file = match args.state_file {
        Some(path) => path,
        None => dirs::data_dir().ok_or(CliError::NoDataDir)?.join("playground").join("editor.json"),
    };
    let mut session = EditorSession::new(FileStorage::open(&state_file)?);
    session.attach_editor(Box::new(TextBuffer::default()));

    let runner = PistonClient::new(args.piston_url);
    let http = reqwest::Client::new();
    let recorder = args.api_url.as_deref().zip(args.token.as_deref());

    println!(
        "{} | theme {} | font {} | :help for commands",
        session.language().label,
        session.theme(),
        session.font_size()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let outcome = match parse_command(&line) {
            Command::Append(text) => {
                let mut code = session.code();
                if !code.is_empty() {
                    code.push('\n');
                }
                code.push_str(text);
                session.on_editor_change(&code)
            }
            Command::Language(id) => session.set_language(id).map(|()| {
                println!("{} ready", session.language().label);
            }),
            Command::Theme(id) => session.set_theme(id),
            Command::FontSize(Some(size)) => session.set_font_size(size).map(|size| {
                println!("font size {size}");
            }),
            Command::FontSize(None) => {
                println!("usage: :font <n>");
                Ok(())
            }
            Command::Run => match session.run_code(&runner).await {
                Ok(result) => {
                    print_result(result);
                    if let Some((api_url, token)) = recorder {
                        record(&http, api_url, token, result).await;
                    }
                    Ok(())
                }
                Err(err) => Err(err),
            },
            Command::Reset => session.reset_code(),
            Command::Show => {
                println!("{}", session.code());
                Ok(())
            }
            Command::Languages => {
                for language in LANGUAGES {
                    println!("{:<12} {} {}", language.id, language.label, language.runtime.version);
                }
                let themes: Vec<_> = THEMES.iter().map(|theme| theme.id).collect();
                println!("themes: {}", themes.join(", "));
                Ok(())
            }
            Command::Load(path) => match tokio::fs::read_to_string(path).await {
                Ok(text) => session.on_editor_change(&text),
                Err(err) => {
                    println!("cannot read {path}: {err}");
                    Ok(())
                }
            },
            // Empty text is never cached, so drop the saved copy first.
            Command::Clear => session.reset_code().and_then(|()| session.on_editor_change("")),
            Command::Help => {
                println!("{HELP}");
                Ok(())
            }
            Command::Quit => break,
            Command::Unknown(name) => {
                println!("unknown command :{name}, try :help");
                Ok(())
            }
        };

        if let Err(err) = outcome {
            match err {
                EditorError::Storage(err) => return Err(err.into()),
                other => println!("{other}"),
            }
        }
    }

    Ok(())
}
