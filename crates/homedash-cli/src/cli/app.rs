use super::*;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Dashboard);
    let diagnostics = logging::DiagnosticsBuffer::new(200);
    logging::init(diagnostics.clone(), !matches!(command, Commands::Dashboard));

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let env_url = std::env::var(BASE_URL_ENV).ok();
    let config = AppConfig::load(&config_path)?
        .with_base_url_override(cli.base_url.as_deref(), env_url.as_deref());
    info!(
        command = command_label(&command),
        base_url = %config.base_url,
        "Running command"
    );
    let mut session = Session {
        config_path,
        config,
    };

    match command {
        Commands::Integrations => handle_integrations(&session),
        Commands::Connect(args) => handle_submit(&mut session, args, FormMode::Connect).await,
        Commands::Edit(args) => handle_submit(&mut session, args, FormMode::Edit).await,
        Commands::Disconnect(args) => handle_disconnect(&mut session, args).await,
        Commands::Logs(args) => handle_logs(&session, args).await,
        Commands::Config(args) => handle_config(&session, args),
        Commands::Dashboard => {
            let runtime = tokio::runtime::Handle::current();
            tokio::task::spawn_blocking(move || tui::run_dashboard(session, diagnostics, runtime))
                .await
                .context("join dashboard thread")?
        }
    }
}

pub(super) fn command_label(command: &Commands) -> &'static str {
    match command {
        Commands::Integrations => "integrations",
        Commands::Connect(_) => "connect",
        Commands::Edit(_) => "edit",
        Commands::Disconnect(_) => "disconnect",
        Commands::Logs(_) => "logs",
        Commands::Config(_) => "config",
        Commands::Dashboard => "dashboard",
    }
}
