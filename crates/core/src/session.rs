//! Headless state machine for a single quiz attempt.
//!
//! ```text
//! Idle --load--> Answering --check--> Checked --advance--> Answering
//!                                     Checked --advance(last)--> Results
//! Idle/Error/Results --begin_loading--> Loading --finish--> Answering
//!                                       Loading --fail--> Error
//! any --restart--> Idle
//! ```
//!
//! Calls made outside their precondition return `SessionError` and leave the
//! state untouched.

use chrono::{DateTime, Utc};
use log::debug;
use std::fmt;
use thiserror::Error;

use crate::model::{AnswerRecord, Question, Quiz, QuizSummary};
use crate::time::Clock;

//
// ─── PHASES & ERRORS ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Loading,
    Error,
    Answering,
    Checked,
    Results,
}

impl Phase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Error => "error",
            Phase::Answering => "answering",
            Phase::Checked => "checked",
            Phase::Results => "results",
        }
    }

    /// Phases from which a fresh quiz may be loaded.
    fn accepts_load(self) -> bool {
        matches!(
            self,
            Phase::Idle | Phase::Loading | Phase::Error | Phase::Results
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Load,
    BeginLoading,
    SelectOption,
    CheckAnswer,
    Advance,
    ComputeSummary,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionAction::Load => "load",
            SessionAction::BeginLoading => "begin_loading",
            SessionAction::SelectOption => "select_option",
            SessionAction::CheckAnswer => "check_answer",
            SessionAction::Advance => "advance",
            SessionAction::ComputeSummary => "compute_summary",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: SessionAction, phase: Phase },

    #[error("no option selected")]
    NoSelection,

    #[error("{option:?} is not an option of the current question")]
    UnknownOption { option: String },
}

//
// ─── LOADING TICKETS ───────────────────────────────────────────────────────────
//

/// Identifies one pending quiz fetch. Only the most recent ticket is honoured;
/// starting a new fetch or restarting makes older tickets stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
    /// The fetch was superseded; its result was discarded.
    Stale,
}

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
}

/// A question paired with the answer given to it, for the results review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionReview<'a> {
    pub question: &'a Question,
    pub answer: &'a AnswerRecord,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

pub struct QuizSession {
    clock: Clock,
    phase: Phase,
    quiz: Option<Quiz>,
    current: usize,
    selected: Option<String>,
    is_checked: bool,
    score: u32,
    answers: Vec<AnswerRecord>,
    error: Option<String>,
    pending: Option<LoadTicket>,
    next_ticket: u64,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Clock::default_clock(),
            phase: Phase::Idle,
            quiz: None,
            current: 0,
            selected: None,
            is_checked: false,
            score: 0,
            answers: Vec::new(),
            error: None,
            pending: None,
            next_ticket: 0,
            started_at: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    // ─── accessors ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.as_ref().and_then(|quiz| quiz.question(self.current))
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.is_checked
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// The answer recorded for the current question, once it has been checked.
    #[must_use]
    pub fn last_answer(&self) -> Option<&AnswerRecord> {
        if self.is_checked {
            self.answers.last()
        } else {
            None
        }
    }

    /// User-visible message of the last failed fetch, while in `Phase::Error`.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.quiz
            .as_ref()
            .is_some_and(|quiz| self.current + 1 == quiz.len())
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.quiz.as_ref().map_or(0, Quiz::len);
        let answered = self.answers.len();
        SessionProgress {
            total,
            answered,
            remaining: total.saturating_sub(answered),
        }
    }

    /// Questions paired with their recorded answers, in question order.
    #[must_use]
    pub fn review(&self) -> Vec<QuestionReview<'_>> {
        let Some(quiz) = self.quiz.as_ref() else {
            return Vec::new();
        };
        self.answers
            .iter()
            .filter_map(|answer| {
                quiz.question(answer.question_index)
                    .map(|question| QuestionReview { question, answer })
            })
            .collect()
    }

    // ─── fetch boundary ────────────────────────────────────────────────────

    /// Enter `Loading` for a new fetch and return its ticket.
    ///
    /// Calling this while already loading replaces the pending fetch.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` mid-attempt.
    pub fn begin_loading(&mut self) -> Result<LoadTicket, SessionError> {
        self.ensure(SessionAction::BeginLoading, self.phase.accepts_load())?;

        if let Some(stale) = self.pending {
            debug!("superseding pending fetch {stale:?}");
        }
        self.reset();
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.pending = Some(ticket);
        self.transition(Phase::Loading);
        Ok(ticket)
    }

    /// Deliver a fetched quiz. Ignored unless `ticket` is the pending one.
    pub fn finish_loading(&mut self, ticket: LoadTicket, quiz: Quiz) -> LoadOutcome {
        if !self.is_pending(ticket) {
            debug!("dropping stale quiz for {ticket:?}");
            return LoadOutcome::Stale;
        }
        self.start(quiz);
        LoadOutcome::Loaded
    }

    /// Record a failed fetch. Ignored unless `ticket` is the pending one.
    pub fn fail_loading(&mut self, ticket: LoadTicket, message: impl Into<String>) -> LoadOutcome {
        if !self.is_pending(ticket) {
            debug!("dropping stale failure for {ticket:?}");
            return LoadOutcome::Stale;
        }
        self.pending = None;
        self.error = Some(message.into());
        self.transition(Phase::Error);
        LoadOutcome::Failed
    }

    fn is_pending(&self, ticket: LoadTicket) -> bool {
        self.phase == Phase::Loading && self.pending == Some(ticket)
    }

    // ─── attempt ───────────────────────────────────────────────────────────

    /// Start a fresh attempt on `quiz`. A pending fetch, if any, is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` while answering or checked;
    /// restart first.
    pub fn load(&mut self, quiz: Quiz) -> Result<(), SessionError> {
        self.ensure(SessionAction::Load, self.phase.accepts_load())?;
        self.start(quiz);
        Ok(())
    }

    fn start(&mut self, quiz: Quiz) {
        self.reset();
        debug!("loaded quiz {} with {} questions", quiz.id(), quiz.len());
        self.quiz = Some(quiz);
        self.started_at = Some(self.clock.now());
        self.transition(Phase::Answering);
    }

    /// Select an option for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Answering` (a checked
    /// answer is locked), or `SessionError::UnknownOption` if `option` does not
    /// belong to the current question.
    pub fn select_option(&mut self, option: &str) -> Result<(), SessionError> {
        self.ensure(SessionAction::SelectOption, self.phase == Phase::Answering)?;
        let known = self
            .current_question()
            .is_some_and(|question| question.has_option(option));
        if !known {
            return Err(SessionError::UnknownOption {
                option: option.to_owned(),
            });
        }
        self.selected = Some(option.to_owned());
        Ok(())
    }

    /// Check the selected option against the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Answering` and
    /// `SessionError::NoSelection` when nothing is selected.
    pub fn check_answer(&mut self) -> Result<&AnswerRecord, SessionError> {
        self.ensure(SessionAction::CheckAnswer, self.phase == Phase::Answering)?;
        let selected = self.selected.as_deref().ok_or(SessionError::NoSelection)?;
        let question = self
            .quiz
            .as_ref()
            .and_then(|quiz| quiz.question(self.current))
            .ok_or(SessionError::InvalidTransition {
                action: SessionAction::CheckAnswer,
                phase: self.phase,
            })?;

        let record = AnswerRecord::new(self.current, selected, question.correct_answer());
        if record.is_correct {
            self.score += 1;
        }
        let index = self.answers.len();
        self.answers.push(record);
        self.is_checked = true;
        self.transition(Phase::Checked);

        Ok(&self.answers[index])
    }

    /// Move past a checked question. Returns the phase entered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the current question
    /// has been checked.
    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        self.ensure(SessionAction::Advance, self.phase == Phase::Checked)?;

        if self.is_last_question() {
            self.completed_at = Some(self.clock.now());
            self.transition(Phase::Results);
        } else {
            self.current += 1;
            self.selected = None;
            self.is_checked = false;
            self.transition(Phase::Answering);
        }
        Ok(self.phase)
    }

    /// Drop the quiz and every bit of attempt state. Any pending fetch becomes stale.
    pub fn restart(&mut self) {
        self.reset();
        self.transition(Phase::Idle);
    }

    /// Final score of the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Results`.
    pub fn summary(&self) -> Result<QuizSummary, SessionError> {
        self.ensure(SessionAction::ComputeSummary, self.phase == Phase::Results)?;
        let total = self.quiz.as_ref().map_or(0, Quiz::len);
        Ok(QuizSummary::from_answers(&self.answers, total))
    }

    fn reset(&mut self) {
        self.quiz = None;
        self.current = 0;
        self.selected = None;
        self.is_checked = false;
        self.score = 0;
        self.answers.clear();
        self.error = None;
        self.pending = None;
        self.started_at = None;
        self.completed_at = None;
    }

    fn ensure(&self, action: SessionAction, allowed: bool) -> Result<(), SessionError> {
        if allowed {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }

    fn transition(&mut self, next: Phase) {
        debug!("session {} -> {}", self.phase, next);
        self.phase = next;
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("phase", &self.phase)
            .field("quiz_id", &self.quiz.as_ref().map(Quiz::id))
            .field("current", &self.current)
            .field("selected", &self.selected)
            .field("score", &self.score)
            .field("answers_len", &self.answers.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
