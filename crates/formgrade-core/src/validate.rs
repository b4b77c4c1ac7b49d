//! Structural validation of submitted answers.
//!
//! Validation only checks that an answer has the shape its question variant
//! requires. Wrong answers are not invalid answers; correctness is the
//! scorer's business. Any structural failure rejects the whole submission
//! before anything is persisted.

use std::collections::HashSet;

use crate::error::{AnswerIssue, SubmitError};
use crate::model::{Answer, AnswerSet, FollowUp, Question, QuestionKind};

/// Check one submitted answer against the shape its question requires.
pub fn check_answer(question: &Question, answer: &Answer) -> Result<(), AnswerIssue> {
    match (&question.kind, answer) {
        (
            QuestionKind::Categorize {
                items, categories, ..
            },
            Answer::Categorize { categories: placed },
        ) => check_categorize(items, categories.len(), placed),
        (QuestionKind::Cloze { .. }, Answer::Cloze { blanks }) => {
            if blanks.is_empty() {
                Err(AnswerIssue::NoBlanks)
            } else {
                Ok(())
            }
        }
        (
            QuestionKind::Comprehension {
                follow_up_questions,
                ..
            },
            Answer::Comprehension { follow_up_answers },
        ) => check_comprehension(follow_up_questions, follow_up_answers),
        (kind, _) => Err(AnswerIssue::KindMismatch {
            expected: kind.type_name(),
        }),
    }
}

fn check_categorize(
    pool: &[String],
    expected_slots: usize,
    placed: &[Vec<String>],
) -> Result<(), AnswerIssue> {
    if placed.len() != expected_slots {
        return Err(AnswerIssue::CategoryCountMismatch {
            expected: expected_slots,
            got: placed.len(),
        });
    }

    let pool: HashSet<&str> = pool.iter().map(String::as_str).collect();
    let mut seen_in_slot: Vec<HashSet<&str>> = Vec::with_capacity(placed.len());

    for slot in placed {
        let mut current: HashSet<&str> = HashSet::new();
        for item in slot {
            if !pool.contains(item.as_str()) {
                return Err(AnswerIssue::UnknownItem(item.clone()));
            }
            // The same value twice in one slot is a duplicate placement the
            // scorer's multiset compare will punish; only cross-slot
            // placement is structurally invalid.
            if seen_in_slot.iter().any(|s| s.contains(item.as_str())) {
                return Err(AnswerIssue::ItemPlacedTwice(item.clone()));
            }
            current.insert(item.as_str());
        }
        seen_in_slot.push(current);
    }

    Ok(())
}

fn check_comprehension(follow_ups: &[FollowUp], answers: &[String]) -> Result<(), AnswerIssue> {
    if answers.len() != follow_ups.len() {
        return Err(AnswerIssue::FollowUpCountMismatch {
            expected: follow_ups.len(),
            got: answers.len(),
        });
    }

    for (follow_up, answer) in follow_ups.iter().zip(answers) {
        // Empty string means unanswered, which is allowed.
        if !answer.is_empty() && !follow_up.options.contains(answer) {
            return Err(AnswerIssue::NotAnOption(answer.clone()));
        }
    }

    Ok(())
}

/// Check a whole submission, reporting the lowest offending question index.
///
/// An empty answer map and an index with no corresponding question are both
/// rejected here; partially-valid submissions never proceed.
pub fn check_submission(questions: &[Question], answers: &AnswerSet) -> Result<(), SubmitError> {
    if answers.is_empty() {
        return Err(SubmitError::AnswersMissing);
    }

    for (&index, answer) in answers {
        let Some(question) = questions.get(index) else {
            return Err(SubmitError::InvalidAnswer {
                index,
                issue: AnswerIssue::NoSuchQuestion,
            });
        };
        check_answer(question, answer)
            .map_err(|issue| SubmitError::InvalidAnswer { index, issue })?;
    }

    Ok(())
}
