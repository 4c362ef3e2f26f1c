use super::*;

pub(in crate::cli) fn handle_config(session: &Session, args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Show => {
            println!("# {}", session.config_path.display());
            println!(
                "{}",
                serde_json::to_string_pretty(&session.config).context("serialize config")?
            );
        }
        ConfigCommands::SetBaseUrl { url } => {
            let url = normalize_base_url(&url)?;
            let mut stored = AppConfig::load(&session.config_path)?;
            stored.base_url = url.clone();
            stored.save(&session.config_path)?;
            info!(base_url = %url, "Base URL updated");
            println!("Base URL set to {url}");
        }
    }
    Ok(())
}

pub(in crate::cli) fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("base URL must start with http:// or https://, got '{raw}'");
    }
    Ok(url.to_string())
}
