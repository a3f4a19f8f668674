use serde::Serialize;

use crate::model::AnswerRecord;

/// Percentage at or above which a result counts as a pass.
pub const PASS_PERCENTAGE: u32 = 50;

/// Final score of a finished quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
}

impl QuizSummary {
    /// `percentage` is `round(100 * score / total)`, with halves rounded up.
    /// A zero total yields 0% instead of dividing by zero.
    #[must_use]
    pub fn new(score: u32, total: u32) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            let (score, total) = (u64::from(score), u64::from(total));
            let rounded = (200 * score + total) / (2 * total);
            u32::try_from(rounded).unwrap_or(u32::MAX)
        };
        Self {
            score,
            total,
            percentage,
        }
    }

    /// Tally a summary from answer records against the quiz length.
    #[must_use]
    pub fn from_answers(answers: &[AnswerRecord], total: usize) -> Self {
        let score = answers.iter().filter(|a| a.is_correct).count();
        Self::new(
            u32::try_from(score).unwrap_or(u32::MAX),
            u32::try_from(total).unwrap_or(u32::MAX),
        )
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.total > 0 && self.percentage >= PASS_PERCENTAGE
    }

    #[must_use]
    pub fn feedback(&self) -> &'static str {
        if self.passed() {
            "Great job! You really know your stuff."
        } else {
            "Keep going! Every attempt makes you sharper."
        }
    }
}
