#![forbid(unsafe_code)]

pub mod model;
pub mod session;
pub mod time;

pub use session::{
    LoadOutcome, LoadTicket, Phase, QuestionReview, QuizSession, SessionAction, SessionError,
    SessionProgress,
};
pub use time::Clock;
