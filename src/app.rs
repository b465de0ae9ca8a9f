//! Service wiring shared by the HTTP API and the CLI

use std::sync::Arc;

use crate::calendar::{store_offset, Clock, StoreClock};
use crate::directory::Directory;
use crate::errors::Result;
use crate::schedule::ScheduleService;
use crate::schemas::Config;
use crate::store::Store;
use crate::substitution::SubstitutionService;
use crate::workflow::WorkflowCoordinator;

/// Every service over one shared store
pub struct AppServices {
    pub directory: Directory,
    pub schedule: ScheduleService,
    pub substitutions: SubstitutionService,
    pub workflow: WorkflowCoordinator,
}

impl AppServices {
    /// Build services using the store's wall clock
    pub fn new(config: &Config, store: Arc<Store>) -> Result<Self> {
        let clock = StoreClock::from_offset_minutes(config.utc_offset_minutes)?;
        Self::with_clock(config, store, Arc::new(clock))
    }

    /// Build services with an explicit clock
    pub fn with_clock(config: &Config, store: Arc<Store>, clock: Arc<dyn Clock>) -> Result<Self> {
        let offset = store_offset(config.utc_offset_minutes)?;
        Ok(AppServices {
            directory: Directory::new(store.clone()),
            schedule: ScheduleService::new(store.clone(), clock, offset, config.max_template_days),
            substitutions: SubstitutionService::new(store.clone()),
            workflow: WorkflowCoordinator::new(store),
        })
    }
}

/// Shared handle passed to every request handler
pub type AppState = Arc<AppServices>;
