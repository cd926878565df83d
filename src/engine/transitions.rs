use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::is_plausible_email;
use crate::error::AppError;
use crate::models::delivery::{Coordinates, Delivery, DeliveryEvent, DeliveryStatus};
use crate::models::driver::{Driver, DriverStatus, VehicleType};
use crate::models::store::StoreConfig;
use crate::state::AppState;

// Every driver starts with the same informational rating; the core never
// recomputes it.
const DEFAULT_RATING: f64 = 5.0;

#[derive(Debug, Deserialize)]
pub struct NewDriver {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub password: Option<String>,
    pub vehicle: VehicleType,
    #[serde(default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Deserialize)]
pub struct NewDelivery {
    pub customer_name: String,
    pub address: String,
    /// Empty or missing means broadcast to the whole fleet.
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub origin_name: Option<String>,
    #[serde(default)]
    pub origin_address: Option<String>,
    #[serde(default)]
    pub destination: Option<Coordinates>,
    #[serde(default)]
    pub created_by: Option<String>,
}

pub fn register_driver(state: &AppState, input: NewDriver) -> Result<Driver, AppError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    if !is_plausible_email(&input.email) {
        return Err(AppError::BadRequest("malformed email".to_string()));
    }
    if input.phone.trim().is_empty() {
        return Err(AppError::BadRequest("phone cannot be empty".to_string()));
    }

    let driver = Driver {
        id: state.ids.driver_id(),
        name: name.to_string(),
        email: input.email.trim().to_lowercase(),
        phone: input.phone.trim().to_string(),
        password: input.password,
        vehicle: input.vehicle,
        plate: input.plate.filter(|plate| !plate.trim().is_empty()),
        status: DriverStatus::Pending,
        rating: DEFAULT_RATING,
        total_deliveries: 0,
        joined_at: Utc::now(),
        bio: input.bio,
    };

    state.drivers.insert(driver.id.clone(), driver.clone());
    info!(driver_id = %driver.id, "driver registered, awaiting approval");

    Ok(driver)
}

pub fn approve_driver(state: &AppState, driver_id: &str) -> Result<Driver, AppError> {
    review_driver(state, driver_id, DriverStatus::Active)
}

pub fn reject_driver(state: &AppState, driver_id: &str) -> Result<Driver, AppError> {
    review_driver(state, driver_id, DriverStatus::Inactive)
}

fn review_driver(
    state: &AppState,
    driver_id: &str,
    verdict: DriverStatus,
) -> Result<Driver, AppError> {
    let mut driver = state
        .drivers
        .get_mut(driver_id)
        .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;

    if driver.status != DriverStatus::Pending {
        return Err(AppError::Conflict(format!(
            "driver {driver_id} is not awaiting approval"
        )));
    }

    driver.status = verdict;
    info!(driver_id = %driver.id, status = ?driver.status, "driver reviewed");

    Ok(driver.clone())
}

pub fn launch_delivery(
    state: &AppState,
    input: NewDelivery,
    origin: &StoreConfig,
) -> Result<Delivery, AppError> {
    let customer_name = input.customer_name.trim();
    if customer_name.is_empty() {
        return Err(AppError::BadRequest("customer name cannot be empty".to_string()));
    }
    let address = input.address.trim();
    if address.is_empty() {
        return Err(AppError::BadRequest("address cannot be empty".to_string()));
    }

    let chosen_driver = input.driver_id.filter(|id| !id.trim().is_empty());
    let is_broadcast = chosen_driver.is_none();

    // Direct assignment follows the same rule as the accept flow: the
    // driver must be active and goes on-delivery immediately.
    if let Some(driver_id) = &chosen_driver {
        let mut driver = state
            .drivers
            .get_mut(driver_id)
            .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;
        if driver.status != DriverStatus::Active {
            return Err(AppError::Conflict(format!(
                "driver {driver_id} cannot take deliveries"
            )));
        }
        driver.status = DriverStatus::OnDelivery;
    }

    let delivery = Delivery {
        id: state.ids.delivery_id(),
        customer_name: customer_name.to_string(),
        address: address.to_string(),
        origin_name: input.origin_name.or_else(|| Some(origin.name.clone())),
        origin_address: input.origin_address.or_else(|| Some(origin.address.clone())),
        status: if is_broadcast {
            DeliveryStatus::Pending
        } else {
            DeliveryStatus::Shipped
        },
        driver_id: chosen_driver,
        created_at: Utc::now(),
        destination: input.destination,
        current_location: None,
        eta: None,
        is_broadcast,
        created_by: input.created_by,
    };

    state.deliveries.insert(delivery.id.clone(), delivery.clone());
    if is_broadcast {
        state.metrics.open_broadcasts.inc();
    }
    let _ = state.delivery_events_tx.send(DeliveryEvent::Launched {
        delivery: delivery.clone(),
    });

    info!(
        delivery_id = %delivery.id,
        broadcast = is_broadcast,
        "delivery launched"
    );

    Ok(delivery)
}

pub fn accept_delivery(
    state: &AppState,
    delivery_id: &str,
    driver_id: &str,
) -> Result<Delivery, AppError> {
    let mut delivery = state
        .deliveries
        .get_mut(delivery_id)
        .ok_or_else(|| AppError::NotFound(format!("delivery {delivery_id} not found")))?;

    if delivery.status != DeliveryStatus::Pending {
        return Err(AppError::Conflict(format!(
            "delivery {delivery_id} is not open for acceptance"
        )));
    }

    let mut driver = state
        .drivers
        .get_mut(driver_id)
        .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;

    if driver.status != DriverStatus::Active {
        return Err(AppError::Conflict(format!(
            "driver {driver_id} cannot accept deliveries"
        )));
    }

    delivery.status = DeliveryStatus::Shipped;
    delivery.driver_id = Some(driver.id.clone());
    let was_broadcast = delivery.is_broadcast;
    delivery.is_broadcast = false;
    driver.status = DriverStatus::OnDelivery;

    if was_broadcast {
        state.metrics.open_broadcasts.dec();
    }
    let _ = state.delivery_events_tx.send(DeliveryEvent::Accepted {
        delivery_id: delivery.id.clone(),
        driver_id: driver.id.clone(),
    });

    info!(delivery_id = %delivery.id, driver_id = %driver.id, "delivery accepted");

    Ok(delivery.clone())
}

pub fn finish_delivery(state: &AppState, delivery_id: &str) -> Result<Delivery, AppError> {
    let mut delivery = state
        .deliveries
        .get_mut(delivery_id)
        .ok_or_else(|| AppError::NotFound(format!("delivery {delivery_id} not found")))?;

    // The shipped guard makes finish non-repeatable: a second call is a
    // conflict and cannot increment the driver's counter again.
    if delivery.status != DeliveryStatus::Shipped {
        return Err(AppError::Conflict(format!(
            "delivery {delivery_id} is not in transit"
        )));
    }

    delivery.status = DeliveryStatus::Delivered;
    let finished_driver = delivery.driver_id.clone();

    if let Some(driver_id) = &finished_driver {
        if let Some(mut driver) = state.drivers.get_mut(driver_id) {
            driver.status = DriverStatus::Active;
            driver.total_deliveries = driver.total_deliveries.saturating_add(1);
        }
    }

    let _ = state.delivery_events_tx.send(DeliveryEvent::Finished {
        delivery_id: delivery.id.clone(),
        driver_id: finished_driver.clone(),
    });

    info!(
        delivery_id = %delivery.id,
        driver_id = finished_driver.as_deref().unwrap_or("-"),
        "delivery finished"
    );

    Ok(delivery.clone())
}
