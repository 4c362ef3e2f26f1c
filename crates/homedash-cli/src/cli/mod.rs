use crate::{logging, tui};
use anyhow::{Context, bail};
use clap::Parser;
use homedash_client::DashboardClient;
use homedash_client::http::is_network_error;
use homedash_core::config::{AppConfig, BASE_URL_ENV, default_config_path};
use homedash_core::log_buffer::LogEntry;
use homedash_core::{
    ConnectionGateway, FormMode, IntegrationBoard, IntegrationController, IntegrationDefinition,
    IntegrationKind, IntegrationRegistry, LogTailer, OverlayCoordinator,
};
use std::collections::BTreeSet;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod app;
mod args;
mod config_cmd;
mod integration_cmd;
mod logs_cmd;
mod shared;
#[cfg(test)]
mod tests;

use args::*;

use config_cmd::handle_config;
use integration_cmd::{handle_disconnect, handle_integrations, handle_submit};
use logs_cmd::handle_logs;
use shared::{confirm_stdin, prompt_missing_fields, stdin_is_tty, with_backend_hint};

pub async fn run() -> anyhow::Result<()> {
    app::run().await
}

/// Effective config for one invocation.
pub(crate) struct Session {
    pub(crate) config_path: PathBuf,
    pub(crate) config: AppConfig,
}

impl Session {
    pub(crate) fn client(&self) -> anyhow::Result<DashboardClient> {
        DashboardClient::from_config(&self.config)
    }

    pub(crate) fn board(&self, gateway: Arc<dyn ConnectionGateway>) -> IntegrationBoard {
        IntegrationBoard::new(
            &IntegrationRegistry::new(),
            &self.config.connected,
            gateway,
            OverlayCoordinator::new(),
        )
    }

    /// Writes the connected set to the config file without persisting CLI/env overrides.
    pub(crate) fn persist_connected(
        &mut self,
        connected: BTreeSet<IntegrationKind>,
    ) -> anyhow::Result<()> {
        self.config.connected = connected.clone();
        let mut stored = AppConfig::load(&self.config_path)?;
        if stored.set_connected(connected) {
            stored.save(&self.config_path)?;
            info!(path = %self.config_path.display(), "Saved connection status");
        }
        Ok(())
    }
}
