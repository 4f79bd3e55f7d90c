use std::sync::Arc;

use crate::{config::Settings, service::ServiceContext, storage::ObjectStore};

#[derive(Clone)]
pub struct AppState {
    pub service_context: Arc<ServiceContext>,
    pub store: Arc<dyn ObjectStore>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        store: Arc<dyn ObjectStore>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            service_context,
            store,
            settings,
        }
    }
}
