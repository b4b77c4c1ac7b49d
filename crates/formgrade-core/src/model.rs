//! Core data model types for formgrade.
//!
//! These are the fundamental types the entire formgrade system uses to
//! represent forms, their typed question variants, author answer keys,
//! and respondent-submitted answers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single question within a form.
///
/// The shared fields live here; the variant payload (including the author's
/// answer key) lives in [`QuestionKind`] and is flattened onto the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier, unique within the owning form.
    pub id: String,
    /// Human-readable title shown to respondents.
    pub title: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: String,
    /// Points this question is worth when the form is graded.
    #[serde(default = "default_points")]
    pub points: u32,
    /// The variant payload, tagged by `type`.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_points() -> u32 {
    1
}

/// The three question variants, tagged by `type` on the wire.
///
/// A closed sum: the validator and scorer dispatch on it with exhaustive
/// matches, so adding a variant is a compile-time-checked change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum QuestionKind {
    /// Drag items from a shared pool into named categories.
    Categorize {
        /// The pool of draggable item tokens.
        items: Vec<String>,
        /// Categories; each category's `items` is the answer key.
        categories: Vec<Category>,
    },
    /// Fill-in-the-blank text. Blank markers are runs of two or more `_`.
    Cloze {
        /// The text containing blank markers.
        text: String,
        /// One key string per blank, in left-to-right order.
        correct_answer: Vec<String>,
    },
    /// A reading passage with closed-choice follow-up questions.
    Comprehension {
        /// The passage respondents read.
        passage: String,
        /// Follow-up questions with their options and keys.
        follow_up_questions: Vec<FollowUp>,
    },
}

impl QuestionKind {
    /// Wire name of the variant, as used in the `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::Categorize { .. } => "categorize",
            QuestionKind::Cloze { .. } => "cloze",
            QuestionKind::Comprehension { .. } => "comprehension",
        }
    }
}

/// A named category with its answer-key item set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Category label shown to respondents.
    pub name: String,
    /// The key: the pool items that belong in this category.
    #[serde(default)]
    pub items: Vec<String>,
}

/// One follow-up question of a comprehension passage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    /// The question text.
    pub question: String,
    /// The closed set of options to choose from.
    pub options: Vec<String>,
    /// The key: must equal one of `options` verbatim.
    pub correct_answer: String,
}

impl Question {
    /// Number of blanks a cloze question presents, derived from its text.
    ///
    /// Always recomputed from `text`, never stored, so it cannot drift when
    /// the author edits the text. `None` for non-cloze variants.
    pub fn blank_count(&self) -> Option<usize> {
        match &self.kind {
            QuestionKind::Cloze { text, .. } => Some(count_blank_runs(text)),
            _ => None,
        }
    }

    /// The author's answer key projected into the submitted-answer shape,
    /// so clients can diff a respondent's answer against it directly.
    pub fn answer_key(&self) -> Answer {
        match &self.kind {
            QuestionKind::Categorize { categories, .. } => Answer::Categorize {
                categories: categories.iter().map(|c| c.items.clone()).collect(),
            },
            QuestionKind::Cloze { correct_answer, .. } => Answer::Cloze {
                blanks: correct_answer.clone(),
            },
            QuestionKind::Comprehension {
                follow_up_questions,
                ..
            } => Answer::Comprehension {
                follow_up_answers: follow_up_questions
                    .iter()
                    .map(|f| f.correct_answer.clone())
                    .collect(),
            },
        }
    }
}

/// Count non-overlapping runs of two or more `_` characters.
///
/// This is the single source of truth for how many blanks a cloze text
/// presents; a lone `_` is ordinary text, not a blank.
pub fn count_blank_runs(text: &str) -> usize {
    let mut runs = 0;
    let mut current = 0usize;
    for ch in text.chars() {
        if ch == '_' {
            current += 1;
        } else {
            if current >= 2 {
                runs += 1;
            }
            current = 0;
        }
    }
    if current >= 2 {
        runs += 1;
    }
    runs
}

/// Whether a form is an ungraded survey or a graded test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    /// Answers are collected; keys are never consulted or exposed.
    #[default]
    Survey,
    /// Submissions are scored against the answer keys.
    Test,
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormMode::Survey => write!(f, "survey"),
            FormMode::Test => write!(f, "test"),
        }
    }
}

impl FromStr for FormMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "survey" => Ok(FormMode::Survey),
            "test" | "quiz" => Ok(FormMode::Test),
            other => Err(format!("unknown form mode: {other}")),
        }
    }
}

/// Per-form behavior toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    /// Whether submissions without respondent identity are accepted.
    /// Enforcement belongs to the authentication layer, not this core.
    #[serde(default = "default_true")]
    pub allow_anonymous: bool,
    /// Whether graded results disclose the answer key to the respondent.
    #[serde(default)]
    pub show_results: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            allow_anonymous: true,
            show_results: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A published form: an ordered list of questions plus settings.
///
/// Question order is significant — the position index is the key that
/// correlates submitted answers with questions. Storage treats a form as
/// frozen once a response references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    /// Storage-assigned identifier.
    pub id: String,
    /// Form title.
    pub title: String,
    /// Optional description shown above the questions.
    #[serde(default)]
    pub description: String,
    /// Survey or test.
    #[serde(default)]
    pub mode: FormMode,
    /// The questions, in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Behavior toggles.
    #[serde(default)]
    pub settings: FormSettings,
    /// Whether the form currently accepts submissions.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Form {
    /// Sum of points over every question in the form.
    ///
    /// This is the form's nominal total. It is not the same thing as a
    /// graded submission's `max_score`, which only counts attempted
    /// questions.
    pub fn nominal_points(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.points)).sum()
    }
}

/// A respondent's answer to one question, distinguished by field name
/// rather than an explicit tag; each variant's payload field is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum Answer {
    /// Items placed per category, parallel to the question's categories.
    Categorize { categories: Vec<Vec<String>> },
    /// One string per blank, left-to-right. Empty string = left blank.
    Cloze { blanks: Vec<String> },
    /// One chosen option per follow-up. Empty string = unanswered.
    Comprehension { follow_up_answers: Vec<String> },
}

/// Submitted answers keyed by question position index.
///
/// A `BTreeMap` keeps iteration in index order, so validation reports the
/// lowest offending index and grading is deterministic. On the wire this is
/// a JSON object with stringified integer keys.
pub type AnswerSet = BTreeMap<usize, Answer>;
