use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// User-facing fallback when profile analysis is unavailable.
pub const PROFILE_FALLBACK: &str = "Não foi possível analisar o perfil no momento.";
/// User-facing fallback when the logistics assistant is unavailable.
pub const ADVICE_FALLBACK: &str = "Desculpe, tive um problema ao processar sua consulta logística.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor is not configured")]
    Disabled,

    #[error("request failed: {0}")]
    Request(String),

    #[error("backend returned status {0}")]
    Status(u16),

    #[error("malformed response")]
    MalformedResponse,
}

/// Client for the remote text-generation collaborator, an OpenAI-compatible
/// chat-completions endpoint. No retry; callers substitute the fallback
/// strings above on any error.
#[derive(Clone)]
pub struct Advisor {
    endpoint: Option<Endpoint>,
    client: Client,
}

#[derive(Clone)]
struct Endpoint {
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl Advisor {
    pub fn from_config(config: &Config) -> Self {
        let endpoint = config.ai_api_url.as_ref().map(|base_url| Endpoint {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.ai_api_key.clone(),
            model: config.ai_model.clone(),
        });

        if endpoint.is_none() {
            debug!("advisor not configured; replies fall back to canned text");
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client");

        Self { endpoint, client }
    }

    /// Short professional summary of a driver profile, in pt-BR.
    pub async fn analyze_profile(&self, bio: &str, vehicle: &str) -> Result<String, AdvisorError> {
        let prompt = format!(
            "Analise o perfil deste entregador. Bio: \"{bio}\". Veículo: \"{vehicle}\". \
             Forneça um breve resumo profissional e uma sugestão de treinamento ou área de \
             atuação ideal. Responda em Português do Brasil."
        );
        self.complete(&prompt, Some((0.7, 0.95))).await
    }

    /// Logistics advice for a dispatcher query, in pt-BR.
    pub async fn logistics_advice(&self, query: &str) -> Result<String, AdvisorError> {
        let prompt = format!(
            "Você é o assistente logístico da central de entregas. Ajude o gestor com a \
             seguinte dúvida: \"{query}\". Forneça insights baseados em eficiência e \
             satisfação do cliente."
        );
        self.complete(&prompt, None).await
    }

    async fn complete(
        &self,
        prompt: &str,
        sampling: Option<(f64, f64)>,
    ) -> Result<String, AdvisorError> {
        let endpoint = self.endpoint.as_ref().ok_or(AdvisorError::Disabled)?;

        let mut body = json!({
            "model": endpoint.model,
            "messages": [{"role": "user", "content": prompt}],
        });
        if let Some((temperature, top_p)) = sampling {
            body["temperature"] = json!(temperature);
            body["top_p"] = json!(top_p);
        }

        let mut request = self
            .client
            .post(format!("{}/chat/completions", endpoint.base_url))
            .json(&body);
        if let Some(api_key) = &endpoint.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| AdvisorError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::Status(status.as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|_| AdvisorError::MalformedResponse)?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(AdvisorError::MalformedResponse)
    }
}
