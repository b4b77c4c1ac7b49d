//! Response records and the submission boundary contract.
//!
//! `Response` is what storage persists; `SubmitRequest` and
//! `SubmissionOutcome` are the JSON-shaped contracts the HTTP layer
//! exchanges with respondents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Answer, AnswerSet};

/// A persisted submission. Created exactly once; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Unique response identifier.
    pub id: Uuid,
    /// The form this response belongs to.
    pub form_id: String,
    /// The answers as submitted, keyed by question position index.
    pub answers: AnswerSet,
    /// Earned points. Present iff the form is in test mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Attemptable points for this submission. Present iff test mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    /// Optional submitter identity; `None` for anonymous submissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent: Option<String>,
    /// When the submission was accepted.
    pub submitted_at: DateTime<Utc>,
}

/// A submission as received from the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// The form being answered.
    pub form_id: String,
    /// Answers keyed by question position index.
    #[serde(default)]
    pub answers: AnswerSet,
    /// Optional submitter identity.
    #[serde(default)]
    pub respondent: Option<String>,
}

/// The respondent-facing result of a successful submission.
///
/// Score fields appear only for test-mode forms; `correct_answers` appears
/// only when the form also discloses results. Survey submissions carry none
/// of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    /// Always `true`; failures surface as errors instead.
    pub submitted: bool,
    /// The persisted response's id.
    pub response_id: Uuid,
    /// Earned points (test mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Attemptable points (test mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    /// Whole-number percentage; omitted when `max_score` is zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u32>,
    /// Answer key per question index, for client-side review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<BTreeMap<usize, Answer>>,
}
