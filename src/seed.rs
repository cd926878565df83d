use chrono::{TimeZone, Utc};
use tracing::info;

use crate::models::delivery::{Coordinates, Delivery, DeliveryStatus};
use crate::models::driver::{Driver, DriverStatus, VehicleType};
use crate::state::AppState;

/// Loads the demo dataset: two reviewed drivers and one in-flight delivery,
/// enough to walk the dashboard and the driver surface without any setup.
pub fn load_demo_data(state: &AppState) {
    let drivers = [
        Driver {
            id: "1".to_string(),
            name: "Carlos Oliveira".to_string(),
            email: "carlos@loja.com".to_string(),
            phone: "(11) 98888-7777".to_string(),
            password: Some("entrega1".to_string()),
            vehicle: VehicleType::Motorcycle,
            plate: Some("ABC-1234".to_string()),
            // Carries DEL-001 below, hence on-delivery.
            status: DriverStatus::OnDelivery,
            rating: 4.8,
            total_deliveries: 452,
            joined_at: Utc.with_ymd_and_hms(2023, 1, 15, 12, 0, 0).unwrap(),
            bio: "Experiente com frotas rápidas.".to_string(),
        },
        Driver {
            id: "2".to_string(),
            name: "Ana Beatriz".to_string(),
            email: "ana@loja.com".to_string(),
            phone: "(11) 97777-6666".to_string(),
            password: Some("entrega2".to_string()),
            vehicle: VehicleType::Bicycle,
            plate: None,
            status: DriverStatus::Active,
            rating: 4.9,
            total_deliveries: 128,
            joined_at: Utc.with_ymd_and_hms(2023, 5, 20, 12, 0, 0).unwrap(),
            bio: "Entregas sustentáveis.".to_string(),
        },
    ];

    let deliveries = [Delivery {
        id: "DEL-001".to_string(),
        customer_name: "Mariana Silva".to_string(),
        address: "Av. Paulista, 1000 - Bela Vista".to_string(),
        origin_name: Some("Loja Central".to_string()),
        origin_address: Some("Av. Paulista, 1000 - São Paulo".to_string()),
        status: DeliveryStatus::Shipped,
        driver_id: Some("1".to_string()),
        created_at: Utc::now(),
        destination: Some(Coordinates {
            lat: -23.5614,
            lng: -46.6559,
        }),
        current_location: Some(Coordinates {
            lat: -23.5505,
            lng: -46.6333,
        }),
        eta: Some("12 min".to_string()),
        is_broadcast: false,
        created_by: Some("Gestor Demo".to_string()),
    }];

    for driver in drivers {
        state.drivers.insert(driver.id.clone(), driver);
    }
    for delivery in deliveries {
        state.deliveries.insert(delivery.id.clone(), delivery);
    }

    info!(
        drivers = state.drivers.len(),
        deliveries = state.deliveries.len(),
        "demo data loaded"
    );
}
