//! Submission pipeline orchestrator.
//!
//! Single pass: load the frozen question set, validate every answer, score
//! if the form is a test, persist, and build the respondent-facing outcome.
//! The only side effect is the persist step; every failure path returns
//! before it, so nothing is ever partially stored.

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::SubmitError;
use crate::model::FormMode;
use crate::response::{Response, SubmissionOutcome, SubmitRequest};
use crate::score::grade;
use crate::traits::FormStore;
use crate::validate::check_submission;

/// Processes submissions against a storage collaborator.
///
/// Stateless apart from the store handle: concurrent submissions share
/// nothing mutable, and each one appends an independent response record.
pub struct SubmissionPipeline {
    store: Arc<dyn FormStore>,
}

impl SubmissionPipeline {
    pub fn new(store: Arc<dyn FormStore>) -> Self {
        Self { store }
    }

    /// Process one submission end to end.
    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmissionOutcome, SubmitError> {
        let form = self
            .store
            .get_form(&request.form_id)
            .await
            .map_err(SubmitError::Storage)?
            .ok_or_else(|| SubmitError::FormNotFound(request.form_id.clone()))?;

        if !form.is_active {
            tracing::debug!(form_id = %form.id, "rejecting submission to inactive form");
            return Err(SubmitError::FormInactive(form.id));
        }

        if let Err(e) = check_submission(&form.questions, &request.answers) {
            tracing::warn!(form_id = %form.id, error = %e, "submission failed validation");
            return Err(e);
        }

        // Keys are only consulted for test-mode forms; survey submissions
        // are stored without ever touching them.
        let summary = match form.mode {
            FormMode::Test => Some(grade(&form.questions, &request.answers)),
            FormMode::Survey => None,
        };

        let response = Response {
            id: Uuid::new_v4(),
            form_id: form.id.clone(),
            answers: request.answers,
            score: summary.map(|s| s.score),
            max_score: summary.map(|s| s.max_score),
            respondent: request.respondent,
            submitted_at: chrono::Utc::now(),
        };

        let response_id = self
            .store
            .save_response(&response)
            .await
            .map_err(SubmitError::Storage)?;

        tracing::info!(
            form_id = %form.id,
            response_id = %response_id,
            mode = %form.mode,
            "submission accepted"
        );

        let correct_answers = match (form.mode, form.settings.show_results) {
            (FormMode::Test, true) => Some(
                form.questions
                    .iter()
                    .enumerate()
                    .map(|(index, question)| (index, question.answer_key()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            _ => None,
        };

        Ok(SubmissionOutcome {
            submitted: true,
            response_id,
            score: summary.map(|s| s.score),
            max_score: summary.map(|s| s.max_score),
            percentage: summary.and_then(|s| s.percentage()),
            correct_answers,
        })
    }
}
