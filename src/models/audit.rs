use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditEvent {
    #[serde(rename = "LOGIN")]
    Login,
    #[serde(rename = "ACCOUNT_CREATED")]
    AccountCreated,
}

/// One append-only row in the remote audit log, keyed by administrator email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub email: String,
    pub logged_at: DateTime<Utc>,
    pub app_context: String,
    pub device_info: String,
    pub event: AuditEvent,
}
