use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{broadcast, RwLock};

use crate::advisor::Advisor;
use crate::audit::AuditLog;
use crate::auth::{CredentialVerifier, SharedSecretVerifier};
use crate::config::Config;
use crate::ids::{IdGenerator, UuidIds};
use crate::models::delivery::{Delivery, DeliveryEvent};
use crate::models::driver::Driver;
use crate::models::store::StoreConfig;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub drivers: DashMap<String, Driver>,
    pub deliveries: DashMap<String, Delivery>,
    pub store_config: RwLock<StoreConfig>,
    pub delivery_events_tx: broadcast::Sender<DeliveryEvent>,
    pub metrics: Metrics,
    pub ids: Arc<dyn IdGenerator>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub audit: AuditLog,
    pub advisor: Advisor,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let (delivery_events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        Self {
            drivers: DashMap::new(),
            deliveries: DashMap::new(),
            store_config: RwLock::new(StoreConfig {
                name: config.store_name.clone(),
                address: config.store_address.clone(),
            }),
            delivery_events_tx,
            metrics: Metrics::new(),
            ids: Arc::new(UuidIds),
            verifier: Arc::new(SharedSecretVerifier::new(config.admin_password.clone())),
            audit: AuditLog::from_config(config),
            advisor: Advisor::from_config(config),
        }
    }

    /// Swaps the id generator, mainly for deterministic ids under test.
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }
}
