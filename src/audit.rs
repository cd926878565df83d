use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::audit::AuditRecord;

/// Client for the remote append-only audit log, a PostgREST-style endpoint.
///
/// Every path is best-effort: a failed write is a no-op, a failed read comes
/// back empty and the account check answers false. Absence of the backing
/// table never surfaces to callers.
#[derive(Clone)]
pub struct AuditLog {
    endpoint: Option<Endpoint>,
    client: Client,
}

#[derive(Clone)]
struct Endpoint {
    base_url: String,
    api_key: String,
}

impl AuditLog {
    pub fn from_config(config: &Config) -> Self {
        let endpoint = match (&config.audit_api_url, &config.audit_api_key) {
            (Some(base_url), Some(api_key)) => Some(Endpoint {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: api_key.clone(),
            }),
            _ => {
                debug!("audit log not configured; running with a disabled sink");
                None
            }
        };

        Self {
            endpoint,
            client: Client::new(),
        }
    }

    /// Appends one record. Returns whether the sink stored it; callers
    /// spawn this and move on.
    pub async fn append(&self, record: AuditRecord) -> bool {
        let Some(endpoint) = &self.endpoint else {
            return false;
        };

        let url = format!("{}/rest/v1/admin_logins", endpoint.base_url);
        let result = self
            .client
            .post(&url)
            .header("apikey", &endpoint.api_key)
            .bearer_auth(&endpoint.api_key)
            .json(&record)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(email = %record.email, event = ?record.event, "audit record stored");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "audit log write rejected");
                false
            }
            Err(err) => {
                warn!(error = %err, "audit log write failed");
                false
            }
        }
    }

    /// Most recent `limit` records, newest first. Empty on any failure.
    pub async fn recent(&self, limit: usize) -> Vec<AuditRecord> {
        let Some(endpoint) = &self.endpoint else {
            return Vec::new();
        };

        let url = format!("{}/rest/v1/admin_logins", endpoint.base_url);
        let limit = limit.to_string();
        let result = self
            .client
            .get(&url)
            .header("apikey", &endpoint.api_key)
            .bearer_auth(&endpoint.api_key)
            .query(&[("order", "logged_at.desc"), ("limit", limit.as_str())])
            .send()
            .await;

        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = %response.status(), "audit log read rejected");
                return Vec::new();
            }
            Err(err) => {
                warn!(error = %err, "audit log read failed");
                return Vec::new();
            }
        };

        match response.json::<Vec<AuditRecord>>().await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "audit log returned malformed records");
                Vec::new()
            }
        }
    }

    /// Advisory check: does an administrator account exist for this email?
    /// Answers false on any failure. Never an auth gate.
    pub async fn account_exists(&self, email: &str) -> bool {
        let Some(endpoint) = &self.endpoint else {
            return false;
        };

        let url = format!("{}/rest/v1/admin_accounts", endpoint.base_url);
        let filter = format!("eq.{email}");
        let result = self
            .client
            .get(&url)
            .header("apikey", &endpoint.api_key)
            .bearer_auth(&endpoint.api_key)
            .query(&[("select", "email"), ("email", filter.as_str())])
            .send()
            .await;

        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = %response.status(), "account lookup rejected");
                return false;
            }
            Err(err) => {
                warn!(error = %err, "account lookup failed");
                return false;
            }
        };

        match response.json::<Vec<serde_json::Value>>().await {
            Ok(rows) => !rows.is_empty(),
            Err(err) => {
                warn!(error = %err, "account lookup returned malformed rows");
                false
            }
        }
    }
}
