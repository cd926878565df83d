use serde::{Deserialize, Serialize};

/// Display name and origin address of the dispatching business.
/// Used as the default origin for new deliveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    pub address: String,
}
