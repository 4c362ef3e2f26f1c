use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum IntegrationKind {
    Spotify,
    GoogleCalendar,
    PhilipsHue,
}

impl IntegrationKind {
    pub const ALL: [IntegrationKind; 3] = [
        IntegrationKind::Spotify,
        IntegrationKind::GoogleCalendar,
        IntegrationKind::PhilipsHue,
    ];

    /// Name used on the wire and in user-facing messages.
    pub fn as_name(&self) -> &'static str {
        match self {
            IntegrationKind::Spotify => "Spotify",
            IntegrationKind::GoogleCalendar => "GoogleCalendar",
            IntegrationKind::PhilipsHue => "PhilipsHue",
        }
    }

    pub fn as_slug(&self) -> &'static str {
        match self {
            IntegrationKind::Spotify => "spotify",
            IntegrationKind::GoogleCalendar => "google-calendar",
            IntegrationKind::PhilipsHue => "philips-hue",
        }
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}

impl FromStr for IntegrationKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        IntegrationKind::ALL
            .into_iter()
            .find(|kind| {
                kind.as_name().eq_ignore_ascii_case(trimmed) || kind.as_slug() == trimmed
            })
            .ok_or_else(|| {
                let known: Vec<&str> = IntegrationKind::ALL.iter().map(|k| k.as_slug()).collect();
                anyhow::anyhow!("unknown service '{trimmed}' (known: {})", known.join(", "))
            })
    }
}

/// Which request a credential form submits.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FormMode {
    Connect,
    Edit,
}

/// Network-facing controller actions, used to phrase user messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Action {
    Connect,
    Edit,
    Disconnect,
}

impl Action {
    pub fn service_error_prefix(&self) -> &'static str {
        match self {
            Action::Connect | Action::Edit => "Error connecting to",
            Action::Disconnect => "Error disconnecting from",
        }
    }

    pub fn transport_error_prefix(&self) -> &'static str {
        match self {
            Action::Connect => "Error connecting to",
            Action::Edit => "Error editing",
            Action::Disconnect => "Error disconnecting from",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Connect => "connect",
            Action::Edit => "edit",
            Action::Disconnect => "disconnect",
        }
    }
}

impl From<FormMode> for Action {
    fn from(mode: FormMode) -> Self {
        match mode {
            FormMode::Connect => Action::Connect,
            FormMode::Edit => Action::Edit,
        }
    }
}

/// Body of a `/connect-service` or `/disconnect-service` reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub traceback: Option<String>,
}

impl ServiceResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            traceback: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            traceback: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_slugs() {
        assert_eq!(
            "GoogleCalendar".parse::<IntegrationKind>().unwrap(),
            IntegrationKind::GoogleCalendar
        );
        assert_eq!(
            "philipshue".parse::<IntegrationKind>().unwrap(),
            IntegrationKind::PhilipsHue
        );
        assert_eq!(
            "philips-hue".parse::<IntegrationKind>().unwrap(),
            IntegrationKind::PhilipsHue
        );
        let err = "toaster".parse::<IntegrationKind>().unwrap_err();
        assert!(err.to_string().contains("google-calendar"));
    }

    #[test]
    fn edit_transport_errors_use_editing_prefix() {
        assert_eq!(Action::Edit.service_error_prefix(), "Error connecting to");
        assert_eq!(Action::Edit.transport_error_prefix(), "Error editing");
        assert_eq!(
            Action::Disconnect.transport_error_prefix(),
            "Error disconnecting from"
        );
    }

    #[test]
    fn service_response_defaults_optional_fields() {
        let parsed: ServiceResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(parsed, ServiceResponse::ok());
    }
}
