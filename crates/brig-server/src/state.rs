//! Shared handler state.

use std::sync::Arc;

use brig_db::service::BrigService;
use tokio::sync::{Mutex, MutexGuard};

/// One service, one connection. The mutex keeps each request's transaction
/// from interleaving with another's statements.
#[derive(Clone)]
pub struct AppState {
    service: Arc<Mutex<BrigService>>,
}

impl AppState {
    #[must_use]
    pub fn new(service: BrigService) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
        }
    }

    pub async fn service(&self) -> MutexGuard<'_, BrigService> {
        self.service.lock().await
    }
}
