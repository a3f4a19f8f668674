mod play;

use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use quiz_core::model::QuizId;
use quiz_core::{LoadOutcome, Phase, QuizSession};
use services::{
    ApiClient, ApiConfig, DeleteOutcome, HistoryService, LoadingMessages, QuizSessionService,
};
use storage::repository::Storage;

use crate::play::NextStep;

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str },
    UnknownArg(String),
    InvalidQuizId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command } => write!(f, "{command} requires a quiz id"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid quiz id: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  wiki-quiz [--api <url>] [play] [<topic or Wikipedia URL>]");
    eprintln!("  wiki-quiz [--api <url>] history");
    eprintln!("  wiki-quiz [--api <url>] show <id>");
    eprintln!("  wiki-quiz [--api <url>] retake <id>");
    eprintln!("  wiki-quiz [--api <url>] delete <id> [--yes]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api {}", services::api::DEFAULT_BASE_URL);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_URL, QUIZ_API_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Play { source: Option<String> },
    History,
    Show(QuizId),
    Retake(QuizId),
    Delete { id: QuizId, confirmed: bool },
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    api_url: Option<String>,
    command: Command,
}

fn parse_id(raw: Option<String>, command: &'static str) -> Result<QuizId, ArgsError> {
    let raw = raw.ok_or(ArgsError::MissingArgument { command })?;
    raw.parse().map_err(|_| ArgsError::InvalidQuizId { raw })
}

impl Args {
    /// `None` when help was requested.
    fn parse(argv: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut api_url = None;
        let mut confirmed = false;
        let mut positional = Vec::new();

        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => api_url = Some(require_value(&mut args, "--api")?),
                "--yes" | "-y" => confirmed = true,
                "--help" | "-h" => return Ok(None),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut rest = positional.into_iter();
        let command = match rest.next().as_deref() {
            None => Command::Play { source: None },
            Some("play") => Command::Play {
                source: join_source(rest),
            },
            Some("history") => Command::History,
            Some("show") => Command::Show(parse_id(rest.next(), "show")?),
            Some("retake") => Command::Retake(parse_id(rest.next(), "retake")?),
            Some("delete") => Command::Delete {
                id: parse_id(rest.next(), "delete")?,
                confirmed,
            },
            // Free text is a topic: `wiki-quiz Quantum Physics`.
            Some(first) => {
                let first = first.to_owned();
                Command::Play {
                    source: join_source(std::iter::once(first).chain(rest)),
                }
            }
        };

        Ok(Some(Self { api_url, command }))
    }
}

fn join_source(words: impl Iterator<Item = String>) -> Option<String> {
    let joined = words.collect::<Vec<_>>().join(" ");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

struct App {
    quizzes: QuizSessionService,
    history: HistoryService,
}

impl App {
    fn new(storage: &Storage) -> Self {
        Self {
            quizzes: QuizSessionService::new(
                Arc::clone(&storage.provider),
                Arc::clone(&storage.history),
            ),
            history: HistoryService::new(Arc::clone(&storage.history)),
        }
    }

    /// Generate a quiz, printing a rotating loading message while waiting.
    async fn generate(
        &self,
        session: &mut QuizSession,
        source: &str,
        out: &mut impl Write,
    ) -> Result<LoadOutcome, Box<dyn std::error::Error>> {
        let mut messages = LoadingMessages::new();
        let mut ticker = tokio::time::interval(Duration::from_secs(3));
        let fetch = self.quizzes.generate(session, source);
        tokio::pin!(fetch);

        loop {
            tokio::select! {
                outcome = &mut fetch => return Ok(outcome?),
                _ = ticker.tick() => {
                    writeln!(out, "{}", messages.next_message())?;
                    out.flush()?;
                }
            }
        }
    }

    async fn play(
        &self,
        mut source: Option<String>,
        retake: Option<QuizId>,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut session = QuizSession::new();

        if let Some(id) = retake {
            self.quizzes.retake(&mut session, id).await?;
        }

        loop {
            if matches!(session.phase(), Phase::Idle | Phase::Error) {
                if let Some(message) = session.error_message() {
                    writeln!(out, "Error: {message}")?;
                }
                let next = match source.take() {
                    Some(source) => Some(source),
                    None => play::prompt_source(input, out)?,
                };
                let Some(next) = next else {
                    return Ok(());
                };
                self.generate(&mut session, &next, out).await?;
                continue;
            }

            match play::run_attempt(&mut session, input, out)? {
                NextStep::Quit => return Ok(()),
                NextStep::NewQuiz => session.restart(),
                NextStep::Retake => {
                    let quiz = session.quiz().cloned();
                    match quiz {
                        Some(quiz) => session.load(quiz)?,
                        None => session.restart(),
                    }
                }
            }
        }
    }

    async fn delete(
        &self,
        id: QuizId,
        confirmed: bool,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut list = self.history.load().await?;
        let title = list
            .get(id)
            .map_or_else(|| format!("quiz {id}"), |entry| format!("{:?}", entry.title));
        if !confirmed
            && !play::confirm(
                input,
                out,
                &format!("Are you sure you want to delete {title}?"),
            )?
        {
            writeln!(out, "Kept {title}.")?;
            return Ok(());
        }

        match self.history.delete(&mut list, id).await? {
            DeleteOutcome::Deleted => writeln!(out, "Deleted {title}.")?,
            DeleteOutcome::NotFound => writeln!(out, "Quiz {id} does not exist.")?,
        }
        debug!("{} quizzes left in history", list.len());
        Ok(())
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = match Args::parse(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return Err(e.into());
        }
    };

    let config = match parsed.api_url.as_deref() {
        Some(url) => ApiConfig::new(url)?,
        None => ApiConfig::from_env()?,
    };
    info!("using quiz API at {}", config.base_url());
    let client = ApiClient::new(config)?;
    let storage = Storage::new(Arc::new(client.clone()), Arc::new(client));
    let app = App::new(&storage);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    match parsed.command {
        Command::Play { source } => app.play(source, None, &mut input, &mut out).await,
        Command::Retake(id) => app.play(None, Some(id), &mut input, &mut out).await,
        Command::History => {
            let list = app.history.load().await?;
            play::render_history(list.entries(), &mut out)
        }
        Command::Show(id) => {
            let quiz = app.history.detail(id).await?;
            play::render_detail(&quiz, &mut out)
        }
        Command::Delete { id, confirmed } => app.delete(id, confirmed, &mut input, &mut out).await,
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, Question, Quiz};
    use std::io::Cursor;
    use storage::repository::InMemoryRepository;

    fn args(raw: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(raw.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn free_text_is_a_topic() {
        let parsed = args(&["Quantum", "Physics"]).unwrap().unwrap();
        assert_eq!(
            parsed.command,
            Command::Play {
                source: Some("Quantum Physics".into())
            }
        );
        assert_eq!(parsed.api_url, None);
    }

    #[test]
    fn parses_subcommands_and_flags() {
        let parsed = args(&["--api", "http://q:8000/api", "delete", "7", "--yes"])
            .unwrap()
            .unwrap();
        assert_eq!(parsed.api_url.as_deref(), Some("http://q:8000/api"));
        assert_eq!(
            parsed.command,
            Command::Delete {
                id: QuizId::new(7),
                confirmed: true
            }
        );
        assert_eq!(
            args(&["play"]).unwrap().unwrap().command,
            Command::Play { source: None }
        );
        assert!(args(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn reports_bad_arguments() {
        assert_eq!(
            args(&["show"]).unwrap_err(),
            ArgsError::MissingArgument { command: "show" }
        );
        assert_eq!(
            args(&["retake", "abc"]).unwrap_err(),
            ArgsError::InvalidQuizId { raw: "abc".into() }
        );
        assert_eq!(
            args(&["--api"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--api" }
        );
        assert!(matches!(
            args(&["--verbose"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    fn seeded_app() -> App {
        let repo = InMemoryRepository::new();
        let question = Question::new(
            "Capital of France?",
            vec!["Paris".into(), "London".into()],
            "Paris",
            Difficulty::Easy,
            "",
        )
        .unwrap();
        repo.insert(Quiz::new(QuizId::new(1), "France", "France", vec![question]).unwrap())
            .unwrap();
        App::new(&Storage::from_repository(repo))
    }

    #[tokio::test]
    async fn play_retakes_and_quits() {
        let app = seeded_app();
        let mut input = Cursor::new("1\n\nr\n2\n\nq\n");
        let mut out = Vec::new();

        app.play(Some("France".into()), None, &mut input, &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("You scored 1 out of 1 (100%)"));
        assert!(text.contains("You scored 0 out of 1 (0%)"));
    }

    #[tokio::test]
    async fn unknown_topic_reports_error_and_asks_again() {
        let app = seeded_app();
        let mut input = Cursor::new("France\n1\n\nq\n");
        let mut out = Vec::new();

        app.play(Some("Atlantis".into()), None, &mut input, &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error: Quiz not found"));
        assert!(text.contains("You scored 1 out of 1 (100%)"));
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let app = seeded_app();
        let mut out = Vec::new();

        app.delete(QuizId::new(1), false, &mut Cursor::new("n\n"), &mut out)
            .await
            .unwrap();
        assert_eq!(app.history.load().await.unwrap().len(), 1);

        app.delete(QuizId::new(1), true, &mut Cursor::new(""), &mut out)
            .await
            .unwrap();
        app.delete(QuizId::new(1), true, &mut Cursor::new(""), &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Kept \"France\"."));
        assert!(text.contains("Deleted \"France\"."));
        assert!(text.contains("Quiz 1 does not exist."));
        assert!(app.history.load().await.unwrap().is_empty());
    }
}
