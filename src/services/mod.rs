//! Business logic services

pub mod buch;
pub mod populate;

use std::sync::Arc;

use crate::repository::BuchRepository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub buecher: buch::BuchService,
}

impl Services {
    /// Create all services on top of the given Record Store
    pub fn new(repository: Arc<dyn BuchRepository>) -> Self {
        Self {
            buecher: buch::BuchService::new(repository),
        }
    }
}
