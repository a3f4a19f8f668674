mod answer;
mod history;
mod ids;
mod question;
mod quiz;
mod summary;

pub use answer::AnswerRecord;
pub use history::{HistoryEntry, parse_timestamp};
pub use ids::QuizId;
pub use question::{Difficulty, Question, QuestionDraft, QuestionError};
pub use quiz::{Quiz, QuizDraft, QuizError};
pub use summary::{PASS_PERCENTAGE, QuizSummary};
