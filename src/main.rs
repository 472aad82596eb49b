// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

extern crate clap;
extern crate clap_derive;
extern crate tokio;
extern crate tracing;
extern crate tracing_subscriber;

use clap::Parser;
use clap_derive::Parser;
use gitdesk::settings::SettingsStore;
use gitdesk::{Config, create_registry_with_config, start_http_server};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Debug)]
#[command(version, about = "Backend for the GitDesk file browser")]
struct Args {
    #[arg(long, help = "Address to listen on, overrides GITDESK_BIND_ADDRESS")]
    bind: Option<String>,

    #[arg(long, help = "Settings YAML file, overrides GITDESK_SETTINGS_PATH")]
    settings: Option<PathBuf>,

    #[arg(long, help = "Enable debug logging", default_value = "false")]
    debug: bool,
}

/// Environment configuration with command-line overrides applied
fn resolve_config(args: Args) -> Config {
    let mut config = Config::from_env();
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(settings) = args.settings {
        config.settings_path = settings;
    }
    config.debug |= args.debug;
    config
}

/// Resolves on Ctrl-C. On unix a HUP drops the cached settings document so hand
/// edits to the YAML file are picked up.
async fn shutdown_signal(settings: Arc<SettingsStore>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut hup_signal = match signal(SignalKind::hangup()) {
            Ok(signal) => Some(signal),
            Err(e) => {
                error!("Unable to register HUP signal handler: {}", e);
                None
            }
        };
        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("Unable to listen for shutdown signal: {}", e);
                    }
                    info!("Received interrupt, shutting down...");
                    return;
                }
                Some(_) = async {
                    match hup_signal.as_mut() {
                        Some(s) => s.recv().await,
                        None => std::future::pending().await,
                    }
                } => {
                    info!("Received HUP signal, reloading settings from {}", settings.path().display());
                    settings.invalidate();
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = settings;
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Unable to listen for shutdown signal: {}", e);
        }
        info!("Received interrupt, shutting down...");
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), eyre::Error> {
    color_eyre::install()?;
    let args: Args = Args::parse();

    // Resolved before the subscriber exists, so its own log lines are not emitted
    let config = resolve_config(args);

    let main_subscriber = tracing_subscriber::fmt()
        .compact()
        .with_ansi(true)
        .with_file(true)
        .with_target(false)
        .with_line_number(true)
        .with_thread_names(true)
        .with_span_events(FmtSpan::NONE)
        .with_max_level(if config.is_debug_enabled() {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(main_subscriber)?;

    info!(
        "Binding {}, settings file {}, debug {}",
        config.bind_address,
        config.settings_path.display(),
        config.debug
    );

    let (registry, context) = create_registry_with_config(&config);
    let registry = Arc::new(registry);

    let served = start_http_server(&config.bind_address, registry, shutdown_signal(context.settings.clone())).await;

    let scheduler = context.scheduler.clone();
    match tokio::task::spawn_blocking(move || scheduler.stop_all()).await {
        Ok(stopped) => info!("Stopped {} auto commit task(s)", stopped),
        Err(e) => error!("Failed to stop auto commit tasks: {}", e),
    }

    if let Err(e) = &served {
        error!("HTTP server exited with error: {}", e);
    }
    info!("Done");
    served
}
