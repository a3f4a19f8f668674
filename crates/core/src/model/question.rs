use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyPrompt,

    #[error("a question needs at least 2 options, got {count}")]
    TooFewOptions { count: usize },

    #[error("options must not contain duplicates: {option:?}")]
    DuplicateOption { option: String },

    #[error("correct answer {answer:?} is not one of the options")]
    AnswerNotAnOption { answer: String },

    #[error("unknown difficulty: {raw:?}")]
    UnknownDifficulty { raw: String },
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    /// Case-insensitive; generated quizzes are not consistent about casing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(QuestionError::UnknownDifficulty { raw: s.to_owned() }),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
///
/// Options are fixed after construction and `correct_answer` is always one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    difficulty: Difficulty,
    explanation: String,
}

impl Question {
    /// Build a question from its parts.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, there are fewer than two
    /// options, an option repeats, or the correct answer is not an option.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        difficulty: Difficulty,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let correct_answer = correct_answer.into();

        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: options.len(),
            });
        }
        for (i, option) in options.iter().enumerate() {
            if options[..i].contains(option) {
                return Err(QuestionError::DuplicateOption {
                    option: option.clone(),
                });
            }
        }
        if !options.contains(&correct_answer) {
            return Err(QuestionError::AnswerNotAnOption {
                answer: correct_answer,
            });
        }

        Ok(Self {
            prompt,
            options,
            correct_answer,
            difficulty,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// Unvalidated question as the backend sends it.
///
/// Freshly generated quizzes use `question`, stored ones use `question_text`.
/// Both are accepted and `question_text` wins when both are present.
///
/// Every field may be missing or `null`; validation decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionDraft {
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft into a `Question`.
    ///
    /// A missing or unrecognised difficulty is treated as `medium`; it is only
    /// ever displayed.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for any field that fails validation.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.question_text.or(self.question).unwrap_or_default();
        let difficulty = match self.difficulty.as_deref().map(str::parse::<Difficulty>) {
            Some(Ok(difficulty)) => difficulty,
            Some(Err(err)) => {
                warn!("{err}, using medium");
                Difficulty::Medium
            }
            None => Difficulty::Medium,
        };
        Question::new(
            prompt,
            self.options.unwrap_or_default(),
            self.correct_answer.unwrap_or_default(),
            difficulty,
            self.explanation.unwrap_or_default(),
        )
    }
}
