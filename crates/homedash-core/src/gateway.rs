use crate::model::{IntegrationKind, ServiceResponse};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// Credential values keyed by field name, restricted to the service's required fields.
pub type FieldMap = BTreeMap<String, String>;

/// Backend operations that change an integration's connection.
///
/// An `Err` means the request could not complete (transport failure or an
/// unreadable reply). A reply with `success: false` is an `Ok` value.
pub trait ConnectionGateway: Send + Sync {
    fn connect<'a>(
        &'a self,
        kind: IntegrationKind,
        fields: &'a FieldMap,
    ) -> GatewayFuture<'a, ServiceResponse>;

    /// Re-connects with new credentials. Same endpoint as `connect` unless overridden.
    fn edit<'a>(
        &'a self,
        kind: IntegrationKind,
        fields: &'a FieldMap,
    ) -> GatewayFuture<'a, ServiceResponse> {
        self.connect(kind, fields)
    }

    fn disconnect<'a>(&'a self, kind: IntegrationKind) -> GatewayFuture<'a, ServiceResponse>;
}

/// Every way a gateway call can end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    Success,
    ServiceError {
        message: String,
        traceback: Option<String>,
    },
    TransportError(String),
}

impl RequestOutcome {
    pub fn from_result(result: anyhow::Result<ServiceResponse>) -> Self {
        match result {
            Ok(response) if response.success => RequestOutcome::Success,
            Ok(response) => RequestOutcome::ServiceError {
                message: response
                    .error
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| "unknown error".to_string()),
                traceback: response.traceback,
            },
            Err(err) => RequestOutcome::TransportError(format!("{err:#}")),
        }
    }
}
