use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Shipped,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    pub customer_name: String,
    pub address: String,
    pub origin_name: Option<String>,
    pub origin_address: Option<String>,
    pub status: DeliveryStatus,
    pub driver_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub destination: Option<Coordinates>,
    pub current_location: Option<Coordinates>,
    pub eta: Option<String>,
    pub is_broadcast: bool,
    pub created_by: Option<String>,
}

/// Published on the broadcast channel whenever a delivery changes state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeliveryEvent {
    Launched { delivery: Delivery },
    Accepted { delivery_id: String, driver_id: String },
    Finished { delivery_id: String, driver_id: Option<String> },
}
