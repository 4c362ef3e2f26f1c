pub mod http;
pub mod wire;

use anyhow::Context;
use homedash_core::config::AppConfig;
use homedash_core::{
    ConnectionGateway, FieldMap, GatewayFuture, IntegrationKind, LogSource, ServiceResponse,
};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::wire::{
    CONNECT_PATH, ConnectBody, DISCONNECT_PATH, DisconnectBody, LOGS_PATH, endpoint,
    parse_logs_response, parse_service_response,
};

/// Talks to the assistant's web backend.
#[derive(Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_service<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<ServiceResponse> {
        let url = endpoint(&self.base_url, path);
        let text = http::post_text(&self.client, &url, Some(body))
            .await
            .with_context(|| format!("POST {path}"))?;
        let response = parse_service_response(&text).with_context(|| format!("POST {path}"))?;
        debug!(path, success = response.success, "Service request completed");
        Ok(response)
    }
}

impl ConnectionGateway for DashboardClient {
    fn connect<'a>(
        &'a self,
        kind: IntegrationKind,
        fields: &'a FieldMap,
    ) -> GatewayFuture<'a, ServiceResponse> {
        Box::pin(async move {
            let body = ConnectBody {
                name: kind.as_name(),
                fields,
            };
            self.post_service(CONNECT_PATH, &body).await
        })
    }

    fn disconnect<'a>(&'a self, kind: IntegrationKind) -> GatewayFuture<'a, ServiceResponse> {
        Box::pin(async move {
            let body = DisconnectBody {
                name: kind.as_name(),
            };
            self.post_service(DISCONNECT_PATH, &body).await
        })
    }
}

impl LogSource for DashboardClient {
    fn fetch(&self) -> GatewayFuture<'_, String> {
        Box::pin(async move {
            let url = endpoint(&self.base_url, LOGS_PATH);
            let text = http::post_text::<()>(&self.client, &url, None)
                .await
                .context("POST /logs")?;
            parse_logs_response(&text).context("POST /logs")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = DashboardClient::new("http://pi.local:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://pi.local:8000");
    }

    #[test]
    fn client_uses_config_values() {
        let config = AppConfig {
            base_url: "http://assistant.local".to_string(),
            ..AppConfig::default()
        };
        let client = DashboardClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://assistant.local");
    }
}
