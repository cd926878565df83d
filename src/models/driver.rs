use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Bicycle,
    Motorcycle,
    Car,
    Van,
}

impl VehicleType {
    /// Display label used in AI prompts and the driver surface.
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::Bicycle => "Bicicleta",
            VehicleType::Motorcycle => "Moto",
            VehicleType::Car => "Carro",
            VehicleType::Van => "Van",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DriverStatus {
    Pending,
    Active,
    Inactive,
    OnDelivery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub vehicle: VehicleType,
    pub plate: Option<String>,
    pub status: DriverStatus,
    pub rating: f64,
    pub total_deliveries: u32,
    pub joined_at: DateTime<Utc>,
    pub bio: String,
}
