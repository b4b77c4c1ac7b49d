//! Per-question credit and submission grading.
//!
//! Every function here is pure and deterministic: grading a submission twice
//! with identical inputs yields identical output. Wrong answers never error;
//! degenerate keys (zero categories, zero blanks, zero follow-ups) score 0
//! instead of dividing by zero.

use serde::{Deserialize, Serialize};

use crate::model::{Answer, AnswerSet, Category, FollowUp, Question, QuestionKind};

/// Fractional credit in [0, 1] for one answered question.
///
/// An answer whose shape does not match the question scores 0; the validator
/// rejects such submissions before grading is reached.
pub fn score_question(question: &Question, answer: &Answer) -> f64 {
    match (&question.kind, answer) {
        (
            QuestionKind::Categorize { categories, .. },
            Answer::Categorize { categories: placed },
        ) => score_categorize(categories, placed),
        (QuestionKind::Cloze { correct_answer, .. }, Answer::Cloze { blanks }) => {
            score_cloze(correct_answer, blanks)
        }
        (
            QuestionKind::Comprehension {
                follow_up_questions,
                ..
            },
            Answer::Comprehension { follow_up_answers },
        ) => score_comprehension(follow_up_questions, follow_up_answers),
        _ => 0.0,
    }
}

/// Fraction of categories whose placed items exactly match the key.
///
/// Comparison is multiset equality: order-insensitive but sensitive to
/// duplicate counts. A correctly-empty category counts as a match.
fn score_categorize(categories: &[Category], placed: &[Vec<String>]) -> f64 {
    if categories.is_empty() {
        return 0.0;
    }

    let correct = categories
        .iter()
        .enumerate()
        .filter(|(i, category)| {
            let slot = placed.get(*i).map(Vec::as_slice).unwrap_or(&[]);
            multiset_eq(&category.items, slot)
        })
        .count();

    correct as f64 / categories.len() as f64
}

/// Multiset equality: both sides sorted, then compared element-wise.
fn multiset_eq(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Fraction of blanks filled correctly.
///
/// Blank comparison trims leading/trailing whitespace and ignores case.
/// Blanks beyond the key length are ignored; key entries with no submitted
/// counterpart count as wrong.
fn score_cloze(key: &[String], blanks: &[String]) -> f64 {
    if key.is_empty() {
        return 0.0;
    }

    let correct = key
        .iter()
        .zip(blanks)
        .filter(|(expected, got)| {
            expected.trim().to_lowercase() == got.trim().to_lowercase()
        })
        .count();

    correct as f64 / key.len() as f64
}

/// Fraction of follow-ups answered with the exact correct option.
///
/// Options are closed-choice values, so the comparison is case-sensitive.
fn score_comprehension(follow_ups: &[FollowUp], answers: &[String]) -> f64 {
    if follow_ups.is_empty() {
        return 0.0;
    }

    let correct = follow_ups
        .iter()
        .zip(answers)
        .filter(|(follow_up, answer)| **answer == follow_up.correct_answer)
        .count();

    correct as f64 / follow_ups.len() as f64
}

/// Aggregated grade for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    /// Sum of fractional credit × points over attempted questions.
    pub score: f64,
    /// Sum of points over attempted questions. Can be less than the form's
    /// nominal total when questions were left unattempted.
    pub max_score: f64,
}

impl GradeSummary {
    /// Whole-number percentage, or `None` when nothing was gradeable.
    pub fn percentage(&self) -> Option<u32> {
        if self.max_score == 0.0 {
            return None;
        }
        Some((self.score / self.max_score * 100.0).round() as u32)
    }
}

/// Grade a submission against a form's question list.
///
/// Only attempted questions (indices present in the answer map) contribute
/// to either sum; unattempted questions are skipped entirely rather than
/// counted as zero.
pub fn grade(questions: &[Question], answers: &AnswerSet) -> GradeSummary {
    let mut score = 0.0;
    let mut max_score = 0.0;

    for (index, question) in questions.iter().enumerate() {
        let Some(answer) = answers.get(&index) else {
            continue;
        };
        let points = f64::from(question.points);
        score += score_question(question, answer) * points;
        max_score += points;
    }

    GradeSummary { score, max_score }
}
