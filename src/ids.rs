use std::sync::atomic::{AtomicU32, Ordering};

use uuid::Uuid;

/// Identity generation behind an injectable interface so the core stays
/// deterministic under test.
pub trait IdGenerator: Send + Sync {
    fn driver_id(&self) -> String;
    fn delivery_id(&self) -> String;
}

pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn driver_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn delivery_id(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        format!("DEL-{}", token[..8].to_uppercase())
    }
}

/// Deterministic generator: driver ids "1", "2", ... and delivery ids
/// "DEL-001", "DEL-002", ...
#[derive(Default)]
pub struct SequentialIds {
    drivers: AtomicU32,
    deliveries: AtomicU32,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn driver_id(&self) -> String {
        (self.drivers.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }

    fn delivery_id(&self) -> String {
        format!("DEL-{:03}", self.deliveries.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
