use super::*;

#[derive(Parser)]
#[command(author, version, about = "Manage home assistant integrations and tail its event log")]
pub(super) struct Cli {
    #[arg(long, global = true, help = "Path to the config file")]
    pub(super) config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Assistant web backend URL (overrides config and HOMEDASH_BASE_URL)"
    )]
    pub(super) base_url: Option<String>,
    #[command(subcommand)]
    pub(super) command: Option<Commands>,
}

#[derive(clap::Subcommand)]
pub(super) enum Commands {
    #[command(about = "List integrations with their status and setup details")]
    Integrations,
    #[command(about = "Connect a service")]
    Connect(FieldArgs),
    #[command(about = "Replace the credentials of a connected service")]
    Edit(FieldArgs),
    #[command(about = "Disconnect a service")]
    Disconnect(DisconnectArgs),
    #[command(about = "Print the event log")]
    Logs(LogsArgs),
    #[command(about = "Show or change config")]
    Config(ConfigArgs),
    #[command(about = "Launch the terminal dashboard (default)")]
    Dashboard,
}

#[derive(Parser)]
pub(super) struct FieldArgs {
    #[arg(help = "Service name, e.g. spotify, google-calendar, philips-hue")]
    pub(super) service: IntegrationKind,
    #[arg(
        long = "field",
        value_name = "KEY=VALUE",
        value_parser = parse_field,
        help = "Credential value; repeat for each field"
    )]
    pub(super) fields: Vec<(String, String)>,
}

#[derive(Parser)]
pub(super) struct DisconnectArgs {
    pub(super) service: IntegrationKind,
    #[arg(long, short, help = "Skip the confirmation prompt")]
    pub(super) yes: bool,
}

#[derive(Parser)]
pub(super) struct LogsArgs {
    #[arg(long, short, help = "Keep polling until interrupted")]
    pub(super) follow: bool,
    #[arg(long = "type", value_name = "TYPE", help = "Only print entries of this type")]
    pub(super) kind: Option<String>,
}

#[derive(Parser)]
pub(super) struct ConfigArgs {
    #[command(subcommand)]
    pub(super) command: ConfigCommands,
}

#[derive(clap::Subcommand)]
pub(super) enum ConfigCommands {
    #[command(about = "Print the effective config")]
    Show,
    #[command(about = "Persist the backend URL")]
    SetBaseUrl { url: String },
}

pub(super) fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
