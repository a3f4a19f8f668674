use serde::Serialize;

/// Outcome of one checked question. Records are appended in question order
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub selected_option: String,
    pub correct_option: String,
    pub is_correct: bool,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(
        question_index: usize,
        selected_option: impl Into<String>,
        correct_option: impl Into<String>,
    ) -> Self {
        let selected_option = selected_option.into();
        let correct_option = correct_option.into();
        let is_correct = selected_option == correct_option;
        Self {
            question_index,
            selected_option,
            correct_option,
            is_correct,
        }
    }
}
