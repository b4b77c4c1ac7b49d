//! Storage collaborator trait.
//!
//! Persistence of forms and responses is an external concern; this core
//! only consumes it. Implementations live outside `formgrade-core` (the
//! `formgrade-store` crate ships an in-memory one).

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::Form;
use crate::response::Response;

/// Trait for the document store that owns forms and responses.
#[async_trait]
pub trait FormStore: Send + Sync {
    /// Fetch a form by id, or `None` when no such form exists.
    ///
    /// Implementations must return questions in stable, persisted order
    /// (the position index is what correlates answers with questions) and
    /// must include the form's `is_active` flag.
    async fn get_form(&self, form_id: &str) -> anyhow::Result<Option<Form>>;

    /// Append a new response record and return its id.
    ///
    /// Insert-only: responses are never updated through this core.
    async fn save_response(&self, response: &Response) -> anyhow::Result<Uuid>;
}
