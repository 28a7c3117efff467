//! SMS sender implementations

use async_trait::async_trait;
use serde::Serialize;

use super::NotifyError;

/// Outbound text-message sender
///
/// Fire-and-forget from the business logic's point of view: callers log
/// failures and move on, they never propagate them.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, message: &str) -> Result<(), NotifyError>;
}

/// Logging stand-in used when no gateway is configured
///
/// Always succeeds, logs the would-be message.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSmsSender;

#[async_trait]
impl SmsSender for SimulatedSmsSender {
    async fn send(&self, to: &str, message: &str) -> Result<(), NotifyError> {
        tracing::info!(to = %to, message = %message, "SMS simulation (gateway not configured)");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    message: &'a str,
}

/// HTTP SMS gateway sender
///
/// POSTs `{to, from?, message}` as JSON to the configured gateway URL.
#[derive(Debug, Clone)]
pub struct HttpGatewaySmsSender {
    client: reqwest::Client,
    url: String,
    from: Option<String>,
}

impl HttpGatewaySmsSender {
    pub fn new(url: String, from: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            from,
        }
    }
}

#[async_trait]
impl SmsSender for HttpGatewaySmsSender {
    async fn send(&self, to: &str, message: &str) -> Result<(), NotifyError> {
        let body = GatewayRequest {
            to,
            from: self.from.as_deref(),
            message,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Gateway(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(format!(
                "gateway returned {}",
                response.status()
            )));
        }

        tracing::debug!(to = %to, "SMS dispatched via gateway");
        Ok(())
    }
}
