use crate::model::{Action, FormMode, IntegrationKind};
use std::fmt;

/// Where an integration controller is in its lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Disconnected,
    FormOpen(FormMode),
    Submitting(FormMode),
    Disconnecting,
    Connected,
}

impl Phase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Phase::Submitting(_) | Phase::Disconnecting)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Disconnected => "disconnected",
            Phase::FormOpen(FormMode::Connect) => "connect form open",
            Phase::FormOpen(FormMode::Edit) => "edit form open",
            Phase::Submitting(FormMode::Connect) => "connecting",
            Phase::Submitting(FormMode::Edit) => "saving changes",
            Phase::Disconnecting => "disconnecting",
            Phase::Connected => "connected",
        };
        f.write_str(label)
    }
}

/// The `Display` text of the first three variants is the message shown to the user.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum IntegrationError {
    #[error("Please enter a value for {field}")]
    Validation { field: &'static str },
    #[error("{} {service}: {message}", .action.service_error_prefix())]
    Service {
        action: Action,
        service: IntegrationKind,
        message: String,
    },
    #[error("{} {service}: {detail}", .action.transport_error_prefix())]
    Transport {
        action: Action,
        service: IntegrationKind,
        detail: String,
    },
    #[error("cannot {operation} {service} while {phase}")]
    InvalidState {
        operation: &'static str,
        service: IntegrationKind,
        phase: Phase,
    },
    #[error("{service} has no field named '{field}'")]
    UnknownField {
        service: IntegrationKind,
        field: String,
    },
    #[error("a request for {service} is already in flight")]
    Busy { service: IntegrationKind },
}

impl IntegrationError {
    /// True for errors that were written to the controller's `error_message`.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            IntegrationError::Validation { .. }
                | IntegrationError::Service { .. }
                | IntegrationError::Transport { .. }
        )
    }
}
