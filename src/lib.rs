//! cloudscope — GCP service-account checks and idle-resource cost reports.
//!
//! Library crate shared by the `cloudscope` binary and the integration
//! tests in `tests/`.

pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod inventory;
pub mod middleware;

use std::sync::Arc;

use credentials::probe::{GcsProbe, IdentityProbe};
use credentials::CredentialValidator;
use inventory::fixture::FixtureInventory;
use inventory::{ResourceInventory, WasteReporter};

/// Shared application state passed to handlers.
pub struct AppState {
    pub config: config::Config,
    pub validator: CredentialValidator,
    pub reporter: WasteReporter,
}

impl AppState {
    pub fn new(
        config: config::Config,
        probe: Arc<dyn IdentityProbe>,
        inventory: Arc<dyn ResourceInventory>,
    ) -> Self {
        let validator = CredentialValidator::new(probe, config.upload_dir.clone());
        Self {
            config,
            validator,
            reporter: WasteReporter::new(inventory),
        }
    }

    /// Production wiring: live GCS probe and the fixture inventory.
    pub fn from_config(config: config::Config) -> anyhow::Result<Self> {
        let probe = GcsProbe::new(
            config.token_endpoint.clone(),
            config.storage_endpoint.clone(),
            config.probe_timeout,
        )?;
        Ok(Self::new(config, Arc::new(probe), Arc::new(FixtureInventory)))
    }
}
