//! Application state shared across all route handlers.

use std::sync::Arc;

use mediflow_agent::Scheduler;
use mediflow_llm::ChatCompletionService;
use mediflow_store::Stores;

/// Shared application state, cheap to clone across handler tasks.
///
/// The scheduler is absent when no completion service is configured; the
/// conversation endpoint then answers 503 while the store-backed endpoints
/// keep working.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub scheduler: Option<Arc<Scheduler>>,
}

impl AppState {
    pub fn new(stores: Stores, completion: Option<Arc<dyn ChatCompletionService>>) -> Self {
        let scheduler =
            completion.map(|c| Arc::new(Scheduler::new(stores.clone(), c)));
        Self { stores, scheduler }
    }
}
