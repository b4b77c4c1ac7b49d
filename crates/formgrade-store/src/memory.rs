//! In-memory form store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use formgrade_core::model::Form;
use formgrade_core::response::Response;
use formgrade_core::traits::FormStore;

/// An in-memory `FormStore` holding forms and an append-only response log.
///
/// Counts are never maintained incrementally; `response_count` aggregates
/// on demand, so concurrent submissions need no coordination beyond the
/// append itself.
pub struct MemoryStore {
    /// Forms by id.
    forms: Mutex<HashMap<String, Form>>,
    /// Append-only response collection.
    responses: Mutex<Vec<Response>>,
    /// Number of save calls made.
    save_count: AtomicU32,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            forms: Mutex::new(HashMap::new()),
            responses: Mutex::new(Vec::new()),
            save_count: AtomicU32::new(0),
        }
    }

    /// Create a store seeded with one form.
    pub fn with_form(form: Form) -> Self {
        let store = Self::new();
        store.insert_form(form);
        store
    }

    /// Insert or replace a form.
    pub fn insert_form(&self, form: Form) {
        self.forms.lock().unwrap().insert(form.id.clone(), form);
    }

    /// All responses recorded for a form, in submission order.
    pub fn responses_for(&self, form_id: &str) -> Vec<Response> {
        self.responses
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.form_id == form_id)
            .cloned()
            .collect()
    }

    /// Number of responses recorded for a form, aggregated on demand.
    pub fn response_count(&self, form_id: &str) -> usize {
        self.responses
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.form_id == form_id)
            .count()
    }

    /// Number of save calls made against this store.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FormStore for MemoryStore {
    async fn get_form(&self, form_id: &str) -> anyhow::Result<Option<Form>> {
        Ok(self.forms.lock().unwrap().get(form_id).cloned())
    }

    async fn save_response(&self, response: &Response) -> anyhow::Result<Uuid> {
        self.save_count.fetch_add(1, Ordering::Relaxed);
        self.responses.lock().unwrap().push(response.clone());
        Ok(response.id)
    }
}
