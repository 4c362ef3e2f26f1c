use super::*;
use homedash_core::registry::definition;
use tempfile::TempDir;

#[test]
fn parse_field_splits_on_first_equals() {
    assert_eq!(
        parse_field("redirect_uri=https://cb.example/?a=b").unwrap(),
        (
            "redirect_uri".to_string(),
            "https://cb.example/?a=b".to_string()
        )
    );
    assert_eq!(
        parse_field("client_id=").unwrap(),
        ("client_id".to_string(), String::new())
    );
    assert!(parse_field("client_id").is_err());
    assert!(parse_field("=value").is_err());
}

#[test]
fn cli_parses_connect_with_fields() {
    let cli = Cli::try_parse_from([
        "homedash",
        "connect",
        "google-calendar",
        "--field",
        "client_id=abc",
        "--field",
        "client_secret=xyz",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Connect(args)) => {
            assert_eq!(args.service, IntegrationKind::GoogleCalendar);
            assert_eq!(args.fields.len(), 2);
        }
        _ => panic!("expected connect command"),
    }
}

#[test]
fn cli_rejects_unknown_service() {
    assert!(Cli::try_parse_from(["homedash", "disconnect", "toaster"]).is_err());
}

#[test]
fn cli_defaults_to_dashboard() {
    let cli = Cli::try_parse_from(["homedash", "--base-url", "http://pi.local"]).unwrap();
    assert!(cli.command.is_none());
    assert_eq!(cli.base_url.as_deref(), Some("http://pi.local"));
}

#[test]
fn describe_integration_lists_fields_links_and_notes() {
    let text = integration_cmd::describe_integration(definition(IntegrationKind::PhilipsHue), true);
    assert!(text.starts_with("PhilipsHue (philips-hue) - connected"));
    assert!(text.contains("fields: bridge_ip"));
    assert!(text.contains("docs: https://github.com/studioimaginaire/phue"));
    assert!(text.contains("note: Press the button on the bridge"));
}

#[test]
fn check_mode_points_to_the_right_command() {
    let err = integration_cmd::check_mode(IntegrationKind::Spotify, FormMode::Connect, true).unwrap_err();
    assert!(err.to_string().contains("homedash edit spotify"));
    let err = integration_cmd::check_mode(IntegrationKind::Spotify, FormMode::Edit, false).unwrap_err();
    assert!(err.to_string().contains("homedash connect spotify"));
    assert!(integration_cmd::check_mode(IntegrationKind::Spotify, FormMode::Edit, true).is_ok());
}

#[test]
fn parse_yes_accepts_short_and_long_forms() {
    assert!(shared::parse_yes("y\n"));
    assert!(shared::parse_yes(" YES "));
    assert!(!shared::parse_yes("n"));
    assert!(!shared::parse_yes(""));
}

#[test]
fn matches_kind_filters_by_type() {
    let entry = LogEntry::new("ERROR: disk full", 1);
    assert!(logs_cmd::matches_kind(&entry, None));
    assert!(logs_cmd::matches_kind(&entry, Some("error")));
    assert!(!logs_cmd::matches_kind(&entry, Some("info")));
}

#[test]
fn normalize_base_url_requires_scheme() {
    assert_eq!(
        config_cmd::normalize_base_url(" http://pi.local:8000/ ").unwrap(),
        "http://pi.local:8000"
    );
    assert!(config_cmd::normalize_base_url("pi.local").is_err());
}

#[test]
fn persist_connected_keeps_file_base_url() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.json");
    AppConfig {
        base_url: "http://from-file".to_string(),
        ..AppConfig::default()
    }
    .save(&path)
    .unwrap();

    let mut session = Session {
        config_path: path.clone(),
        config: AppConfig::load(&path)
            .unwrap()
            .with_base_url_override(Some("http://from-flag"), None),
    };
    session
        .persist_connected([IntegrationKind::GoogleCalendar].into_iter().collect())
        .unwrap();

    let stored = AppConfig::load(&path).unwrap();
    assert_eq!(stored.base_url, "http://from-file");
    assert!(stored.connected.contains(&IntegrationKind::GoogleCalendar));
    assert!(session.config.connected.contains(&IntegrationKind::GoogleCalendar));
}

#[test]
fn format_entry_prefixes_type() {
    assert_eq!(
        logs_cmd::format_entry(&LogEntry::new("Heard: lights on", 1)),
        "[heard] Heard: lights on"
    );
    assert_eq!(logs_cmd::format_entry(&LogEntry::new("plain", 1)), "plain");
}
