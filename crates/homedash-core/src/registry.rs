use crate::model::IntegrationKind;

/// Static description of one integration: what it needs and how to set it up.
#[derive(Debug)]
pub struct IntegrationDefinition {
    pub kind: IntegrationKind,
    pub required_fields: &'static [&'static str],
    pub usage_lines: &'static [&'static str],
    pub reference_links: &'static [&'static str],
    pub notes: &'static [&'static str],
    /// Keep form values after a successful submit.
    pub retain_fields_on_success: bool,
}

impl IntegrationDefinition {
    pub fn name(&self) -> &'static str {
        self.kind.as_name()
    }

    /// Resolves a caller-supplied field name to the registry's own key.
    pub fn field(&self, name: &str) -> Option<&'static str> {
        self.required_fields
            .iter()
            .copied()
            .find(|field| *field == name)
    }
}

static SPOTIFY: IntegrationDefinition = IntegrationDefinition {
    kind: IntegrationKind::Spotify,
    required_fields: &["username", "client_id", "client_secret", "redirect_uri"],
    usage_lines: &[
        "\"Play Bohemian Rhapsody by Queen\"",
        "\"Pause the music\"",
        "\"Skip to the next song\"",
    ],
    reference_links: &[
        "https://developer.spotify.com/documentation/web-api/",
        "https://github.com/judahpaul16/gpt-home-spotify-callback",
    ],
    notes: &[
        "You may provide your own redirect URI or use the hosted callback server;",
        "either way it must be registered in your Spotify application settings.",
        "Hosted callback server: https://gpt-home.judahpaul.com/callback",
        "To run your own callback server, see the gpt-home-spotify-callback repository linked above.",
    ],
    retain_fields_on_success: false,
};

static GOOGLE_CALENDAR: IntegrationDefinition = IntegrationDefinition {
    kind: IntegrationKind::GoogleCalendar,
    required_fields: &["client_id", "client_secret"],
    usage_lines: &[
        "\"What's on my calendar today?\"",
        "\"Schedule a dentist appointment for Friday at 3pm\"",
    ],
    reference_links: &["https://developers.google.com/calendar/api/quickstart/python"],
    notes: &[],
    retain_fields_on_success: false,
};

static PHILIPS_HUE: IntegrationDefinition = IntegrationDefinition {
    kind: IntegrationKind::PhilipsHue,
    required_fields: &["bridge_ip"],
    usage_lines: &[
        "\"Turn off the living room lights\"",
        "\"Set the bedroom lights to 40 percent\"",
    ],
    reference_links: &[
        "https://developers.meethue.com/develop/get-started-2/",
        "https://github.com/studioimaginaire/phue",
    ],
    notes: &["Press the button on the bridge before submitting."],
    retain_fields_on_success: true,
};

pub fn definition(kind: IntegrationKind) -> &'static IntegrationDefinition {
    match kind {
        IntegrationKind::Spotify => &SPOTIFY,
        IntegrationKind::GoogleCalendar => &GOOGLE_CALENDAR,
        IntegrationKind::PhilipsHue => &PHILIPS_HUE,
    }
}

/// Read-only catalog of every known integration, in display order.
pub struct IntegrationRegistry;

impl Default for IntegrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn definitions(&self) -> impl Iterator<Item = &'static IntegrationDefinition> {
        IntegrationKind::ALL.into_iter().map(definition)
    }

    pub fn get(&self, kind: IntegrationKind) -> &'static IntegrationDefinition {
        definition(kind)
    }

    pub fn lookup(&self, name: &str) -> anyhow::Result<&'static IntegrationDefinition> {
        Ok(definition(name.parse()?))
    }
}
