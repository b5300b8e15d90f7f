// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SBDriver — desktop development host.
//
// Entry point. Initialises logging, loads bridge settings, checks that the
// build parameters are present, registers the notification channel, and
// serves the config bridge over stdin/stdout.
//
// Usage: sbdriver-host [settings.json]
//
// Configuration values come from the environment (`GOOGLE_GEO_API_KEY`,
// `GOOGLE_MAPS_API_KEY`, `API_URL`) unless `SBDRIVER_METADATA` names a JSON
// file of metadata entries.

mod transport;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use sbdriver_bridge::messenger::{DEFAULT_CAPACITY, messenger};
use sbdriver_bridge::providers::MapConfigProvider;
use sbdriver_bridge::traits::{ConfigProvider, ensure_complete};
use sbdriver_bridge::{ConfigBridge, NotificationChannelInitializer};
use sbdriver_core::BridgeSettings;
use sbdriver_core::error::Result;

/// Environment variable naming a metadata JSON file.
const METADATA_ENV: &str = "SBDRIVER_METADATA";

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("SBDriver host starting");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "SBDriver host failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let settings = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading bridge settings");
            BridgeSettings::load(&path)?
        }
        None => BridgeSettings::default(),
    };

    let platform = sbdriver_bridge::platform_bridge();
    tracing::info!(platform = platform.platform_name(), channel = %settings.channel_name, "bridge ready");

    let provider: Arc<dyn ConfigProvider> = match std::env::var_os(METADATA_ENV) {
        Some(path) => Arc::new(MapConfigProvider::from_json_file(&PathBuf::from(path))?),
        None => sbdriver_bridge::platform_config_provider(),
    };

    // Same rule as the mobile builds: refuse to run without all three values.
    if let Err(e) = ensure_complete(provider.as_ref()) {
        if let Some(key) = e.config_key() {
            tracing::error!(%key, "set this build parameter before starting the host");
        }
        return Err(e);
    }

    if settings.register_notification_channel {
        let initializer = NotificationChannelInitializer::new(
            sbdriver_bridge::platform_registrar(),
            settings.notification_channel.clone(),
        );
        tracing::info!(channel_id = %initializer.descriptor().id, "registering notification channel");
        initializer.ensure_registered();
    }

    let (messenger, mut host) = messenger(DEFAULT_CAPACITY);
    host.set_handler(settings.channel_name.clone(), Arc::new(ConfigBridge::new(provider)));
    let host_task = tokio::spawn(host.run());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    transport::serve(stdin, tokio::io::stdout(), messenger, &settings.channel_name).await?;

    if let Err(e) = host_task.await {
        tracing::warn!(error = %e, "messenger host task ended abnormally");
    }
    tracing::info!("SBDriver host stopped");
    Ok(())
}
