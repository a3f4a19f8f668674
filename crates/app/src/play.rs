//! Terminal rendering of a quiz attempt.

use std::error::Error;
use std::io::{BufRead, Write};

use quiz_core::model::{HistoryEntry, Quiz};
use quiz_core::{Phase, QuizSession};

pub type PlayResult<T> = Result<T, Box<dyn Error>>;

/// What the user chose once the results were shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Retake,
    NewQuiz,
    Quit,
}

fn read_line(input: &mut impl BufRead) -> PlayResult<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// Ask for a topic or URL. `None` on end of input or an empty answer.
pub fn prompt_source(input: &mut impl BufRead, out: &mut impl Write) -> PlayResult<Option<String>> {
    write!(out, "Type a topic or paste a Wikipedia URL: ")?;
    out.flush()?;
    Ok(read_line(input)?.filter(|line| !line.is_empty()))
}

/// Ask a yes/no question, defaulting to no.
pub fn confirm(input: &mut impl BufRead, out: &mut impl Write, question: &str) -> PlayResult<bool> {
    write!(out, "{question} [y/N] ")?;
    out.flush()?;
    let answer = read_line(input)?.unwrap_or_default();
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Run the session from its current question until results are shown and
/// the user picks what to do next.
pub fn run_attempt(
    session: &mut QuizSession,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> PlayResult<NextStep> {
    if let Some(quiz) = session.quiz() {
        writeln!(out, "\n== {} ==", quiz.title())?;
        if let Some(summary) = quiz.summary() {
            writeln!(out, "{summary}")?;
        }
    }

    loop {
        match session.phase() {
            Phase::Answering => {
                if !answer_current(session, input, out)? {
                    return Ok(NextStep::Quit);
                }
            }
            Phase::Checked => {
                let prompt = if session.is_last_question() {
                    "Press Enter to see your results"
                } else {
                    "Press Enter for the next question"
                };
                write!(out, "{prompt} ")?;
                out.flush()?;
                if read_line(input)?.is_none() {
                    return Ok(NextStep::Quit);
                }
                session.advance()?;
            }
            Phase::Results => {
                render_results(session, out)?;
                return choose_next(input, out);
            }
            Phase::Error => {
                writeln!(
                    out,
                    "Error: {}",
                    session.error_message().unwrap_or("something went wrong")
                )?;
                return Ok(NextStep::NewQuiz);
            }
            Phase::Idle | Phase::Loading => return Ok(NextStep::NewQuiz),
        }
    }
}

/// Returns `false` when input ran out.
fn answer_current(
    session: &mut QuizSession,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> PlayResult<bool> {
    let progress = session.progress();
    let Some(question) = session.current_question().cloned() else {
        return Ok(false);
    };

    writeln!(
        out,
        "\nQuestion {}/{} [{}]",
        session.current_index() + 1,
        progress.total,
        question.difficulty()
    )?;
    writeln!(out, "{}", question.prompt())?;
    for (i, option) in question.options().iter().enumerate() {
        writeln!(out, "  {}) {option}", i + 1)?;
    }

    let choice = loop {
        write!(out, "Your answer (1-{}): ", question.options().len())?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(false);
        };
        match line.parse::<usize>() {
            Ok(n) if (1..=question.options().len()).contains(&n) => break n - 1,
            _ => writeln!(out, "Pick a number between 1 and {}.", question.options().len())?,
        }
    };

    session.select_option(&question.options()[choice])?;
    let record = session.check_answer()?;
    if record.is_correct {
        writeln!(out, "Correct!")?;
    } else {
        writeln!(out, "Incorrect. The answer was: {}", record.correct_option)?;
    }
    if !question.explanation().is_empty() {
        writeln!(out, "{}", question.explanation())?;
    }
    Ok(true)
}

fn render_results(session: &QuizSession, out: &mut impl Write) -> PlayResult<()> {
    let summary = session.summary()?;
    writeln!(out, "\n== Results ==")?;
    writeln!(
        out,
        "You scored {} out of {} ({}%)",
        summary.score, summary.total, summary.percentage
    )?;
    writeln!(out, "{}", summary.feedback())?;
    if let (Some(start), Some(end)) = (session.started_at(), session.completed_at()) {
        writeln!(out, "Time taken: {}s", (end - start).num_seconds())?;
    }

    writeln!(out, "\nReview:")?;
    for item in session.review() {
        let mark = if item.answer.is_correct { "✓" } else { "✗" };
        writeln!(
            out,
            "{mark} {}. {}",
            item.answer.question_index + 1,
            item.question.prompt()
        )?;
        writeln!(out, "    your answer: {}", item.answer.selected_option)?;
        if !item.answer.is_correct {
            writeln!(out, "    correct answer: {}", item.answer.correct_option)?;
        }
    }

    if let Some(quiz) = session.quiz() {
        if !quiz.related_topics().is_empty() {
            writeln!(out, "\nRelated topics: {}", quiz.related_topics().join(", "))?;
        }
    }
    Ok(())
}

fn choose_next(input: &mut impl BufRead, out: &mut impl Write) -> PlayResult<NextStep> {
    loop {
        write!(out, "\n[r]etake, [n]ew quiz, [q]uit: ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(NextStep::Quit);
        };
        match line.to_ascii_lowercase().as_str() {
            "r" | "retake" => return Ok(NextStep::Retake),
            "n" | "new" => return Ok(NextStep::NewQuiz),
            "q" | "quit" | "" => return Ok(NextStep::Quit),
            _ => writeln!(out, "Unknown choice: {line}")?,
        }
    }
}

pub fn render_history(entries: &[HistoryEntry], out: &mut impl Write) -> PlayResult<()> {
    if entries.is_empty() {
        writeln!(out, "No quizzes yet. Generate one to get started.")?;
        return Ok(());
    }
    for entry in entries {
        writeln!(
            out,
            "{:>5}  {}  {}  ({})",
            entry.id.value(),
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.title,
            entry.url
        )?;
    }
    Ok(())
}

pub fn render_detail(quiz: &Quiz, out: &mut impl Write) -> PlayResult<()> {
    writeln!(out, "{} (#{})", quiz.title(), quiz.id())?;
    writeln!(out, "{}", quiz.url())?;
    if let Some(summary) = quiz.summary() {
        writeln!(out, "\n{summary}")?;
    }
    for (i, question) in quiz.questions().iter().enumerate() {
        writeln!(out, "\n{}. {} [{}]", i + 1, question.prompt(), question.difficulty())?;
        for option in question.options() {
            let mark = if option == question.correct_answer() { "*" } else { " " };
            writeln!(out, "  {mark} {option}")?;
        }
        if !question.explanation().is_empty() {
            writeln!(out, "  {}", question.explanation())?;
        }
    }
    Ok(())
}
