//! Interactive page driven by stdin commands
//!
//! Every line is one UI event. Submissions run as spawned tasks so the form
//! stays editable while they are in flight; their completions are applied
//! back on the loop that owns the session, in whatever order they finish.

use std::collections::HashMap;
use std::io::Write;

use backtest_client_core::errors::CoreError;
use backtest_client_core::models::page::Completion;
use backtest_client_core::models::result::BacktestResult;
use backtest_client_core::{BacktestSession, Submission};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{Id, JoinError, JoinSet};

use crate::view;

pub const HELP: &str = "\
Commands:
  method <text>      set the strategy identifier
  years <text>       set the backtest horizon
  investment <text>  set the initial investment
  ticker <text>      type into the ticker box
  add [text]         add the typed ticker (or <text>) to the list
  remove <index>     remove a ticker by its list position
  submit             send the backtest request
  show               print the page
  help               print this help
  quit               leave without waiting for pending submissions
";

/// One user event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Method(String),
    Years(String),
    Investment(String),
    Ticker(String),
    Add(Option<String>),
    Remove(usize),
    Submit,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("invalid index: {0}")]
    InvalidIndex(String),
}

impl Command {
    /// Parse one input line. The argument is everything after the first
    /// whitespace character, kept verbatim so the form sees exactly what
    /// was typed.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            return Err(CommandError::Empty);
        }
        let (name, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg)),
            None => (trimmed, None),
        };

        match name.to_ascii_lowercase().as_str() {
            "method" => Ok(Command::Method(arg.unwrap_or_default().to_string())),
            "years" => Ok(Command::Years(arg.unwrap_or_default().to_string())),
            "investment" => Ok(Command::Investment(arg.unwrap_or_default().to_string())),
            "ticker" => Ok(Command::Ticker(arg.unwrap_or_default().to_string())),
            "add" => Ok(Command::Add(
                arg.filter(|a| !a.trim().is_empty()).map(str::to_string),
            )),
            "remove" => {
                let raw = arg.map(str::trim).ok_or(CommandError::MissingArgument("remove"))?;
                raw.parse()
                    .map(Command::Remove)
                    .map_err(|_| CommandError::InvalidIndex(raw.to_string()))
            }
            "submit" => Ok(Command::Submit),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// What the loop does after a command touched the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Render,
    Help,
    Submit,
    Quit,
}

/// Apply a command's form edits to the session.
pub fn apply(session: &mut BacktestSession, command: Command) -> Action {
    match command {
        Command::Method(text) => {
            session.set_method(text);
            Action::Continue
        }
        Command::Years(text) => {
            session.set_years(text);
            Action::Continue
        }
        Command::Investment(text) => {
            session.set_initial_investment(text);
            Action::Continue
        }
        Command::Ticker(text) => {
            session.set_ticker_input(text);
            Action::Continue
        }
        Command::Add(text) => {
            if let Some(text) = text {
                session.set_ticker_input(text);
            }
            if session.add_ticker() {
                Action::Render
            } else {
                Action::Continue
            }
        }
        Command::Remove(index) => {
            if session.remove_ticker(index).is_some() {
                Action::Render
            } else {
                Action::Continue
            }
        }
        Command::Submit => Action::Submit,
        Command::Show => Action::Render,
        Command::Help => Action::Help,
        Command::Quit => Action::Quit,
    }
}

type Outcome = Result<BacktestResult, CoreError>;

/// Submissions in flight, keyed by the task running them. The ticket stays
/// here so a task that dies still completes its submission.
struct InFlight {
    tasks: JoinSet<Outcome>,
    tickets: HashMap<Id, Submission>,
}

impl InFlight {
    fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            tickets: HashMap::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn spawn(&mut self, session: &mut BacktestSession) {
        let submission = session.begin_submission();
        let request = submission.request().clone();
        let backend = session.backend();
        let handle = self
            .tasks
            .spawn(async move { backend.submit(&request).await });
        self.tickets.insert(handle.id(), submission);
    }

    /// Pair a finished task with its submission. A panicked or cancelled
    /// task becomes a failed outcome.
    fn settle(
        &mut self,
        joined: Result<(Id, Outcome), JoinError>,
    ) -> Option<(Submission, Outcome)> {
        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(err) => {
                tracing::error!(error = %err, "backtest submission task failed");
                (err.id(), Err(CoreError::TaskFailed(err.to_string())))
            }
        };
        let submission = self.tickets.remove(&id)?;
        Some((submission, outcome))
    }

    fn abort_all(&mut self) {
        self.tasks.abort_all();
    }
}

/// Run the page until `quit` or end of input.
///
/// At end of input the loop waits for submissions still in flight so piped
/// scripts see their results; `quit` abandons them.
pub async fn run<R, W>(
    session: &mut BacktestSession,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut pending = InFlight::new();
    let mut input_open = true;

    write!(out, "{}", view::render_page(session))?;

    while input_open || !pending.is_empty() {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(CommandError::Empty) => continue,
                    Err(e) => {
                        writeln!(out, "{e}")?;
                        continue;
                    }
                };
                match apply(session, command) {
                    Action::Continue => {}
                    Action::Render => write!(out, "\n{}", view::render_page(session))?,
                    Action::Help => write!(out, "{HELP}")?,
                    Action::Submit => pending.spawn(session),
                    Action::Quit => {
                        pending.abort_all();
                        break;
                    }
                }
            }
            Some(joined) = pending.tasks.join_next_with_id() => {
                let Some((submission, outcome)) = pending.settle(joined) else {
                    continue;
                };
                if session.complete_submission(submission, outcome) == Completion::Applied {
                    write!(out, "\n{}", view::render_page(session))?;
                }
            }
        }
        out.flush()?;
    }

    Ok(())
}
