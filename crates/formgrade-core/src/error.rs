//! Submission error types.
//!
//! These errors represent the ways a submission can be rejected. Defined in
//! `formgrade-core` so the HTTP boundary can classify failures for status
//! mapping without string matching.

use thiserror::Error;

/// A structural problem with one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerIssue {
    /// The answer's shape belongs to a different question variant.
    #[error("answer shape does not match a {expected} question")]
    KindMismatch { expected: &'static str },

    /// Categorize answer has the wrong number of category slots.
    #[error("expected {expected} category slots, got {got}")]
    CategoryCountMismatch { expected: usize, got: usize },

    /// A placed item does not exist in the question's pool.
    #[error("item '{0}' is not in the question's item pool")]
    UnknownItem(String),

    /// The same item value was placed into more than one category slot.
    #[error("item '{0}' was placed in more than one category")]
    ItemPlacedTwice(String),

    /// Cloze answer carries no blanks at all.
    #[error("at least one blank entry is required")]
    NoBlanks,

    /// Comprehension answer has the wrong number of entries.
    #[error("expected {expected} follow-up answers, got {got}")]
    FollowUpCountMismatch { expected: usize, got: usize },

    /// A non-empty follow-up answer is not one of the offered options.
    #[error("'{0}' is not one of the offered options")]
    NotAnOption(String),

    /// The answer map references a question index the form does not have.
    #[error("form has no question at this index")]
    NoSuchQuestion,
}

/// Errors that can occur while processing a submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No form exists with the requested id.
    #[error("form not found: {0}")]
    FormNotFound(String),

    /// The form exists but is not accepting submissions.
    #[error("form is not accepting responses: {0}")]
    FormInactive(String),

    /// The submission carried no answers at all.
    #[error("answers are required")]
    AnswersMissing,

    /// One answer failed structural validation; nothing was persisted.
    #[error("invalid answer for question {index}: {issue}")]
    InvalidAnswer { index: usize, issue: AnswerIssue },

    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(anyhow::Error),
}

impl SubmitError {
    /// HTTP-equivalent status for this failure.
    pub fn status(&self) -> u16 {
        match self {
            SubmitError::FormNotFound(_) | SubmitError::FormInactive(_) => 404,
            SubmitError::AnswersMissing | SubmitError::InvalidAnswer { .. } => 400,
            SubmitError::Storage(_) => 500,
        }
    }

    /// Returns `true` when the respondent can fix the submission and retry.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SubmitError::AnswersMissing | SubmitError::InvalidAnswer { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(SubmitError::FormNotFound("f1".into()).status(), 404);
        assert_eq!(SubmitError::FormInactive("f1".into()).status(), 404);
        assert_eq!(SubmitError::AnswersMissing.status(), 400);
        assert_eq!(
            SubmitError::InvalidAnswer {
                index: 3,
                issue: AnswerIssue::NoBlanks,
            }
            .status(),
            400
        );
        assert_eq!(
            SubmitError::Storage(anyhow::anyhow!("connection reset")).status(),
            500
        );
    }

    #[test]
    fn invalid_answer_message_names_the_index() {
        let err = SubmitError::InvalidAnswer {
            index: 2,
            issue: AnswerIssue::UnknownItem("Boat".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("question 2"));
        assert!(msg.contains("Boat"));
    }

    #[test]
    fn client_errors_are_retryable_by_the_respondent() {
        assert!(SubmitError::AnswersMissing.is_client_error());
        assert!(!SubmitError::FormNotFound("f1".into()).is_client_error());
        assert!(!SubmitError::Storage(anyhow::anyhow!("io")).is_client_error());
    }
}
