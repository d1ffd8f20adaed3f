use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use joyradio_pad::client::GatewayClient;
use joyradio_pad::dispatch::{Bindings, Dispatcher};
use joyradio_pad::event::EventReader;
use joyradio_proto::config::Config;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Map joystick buttons to joyradio playback actions.
#[derive(Parser, Debug)]
#[command(name = "joyradio-pad", version, about)]
struct Args {
    /// Config file (default: ~/.config/joyradio/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Joystick device to read
    #[arg(long, short = 'd')]
    device: Option<PathBuf>,

    /// Base URL of the joyradio HTTP gateway
    #[arg(long, short = 'g')]
    gateway: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,joyradio_pad=debug,hyper_util=warn,reqwest=warn".to_string());
    let data_dir = joyradio_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("pad.log"))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(tracing_subscriber::EnvFilter::new(log_filter))
        .init();

    let config_path = args.config.unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    if let Some(device) = args.device {
        config.pad.device = device;
    }
    if let Some(gateway) = args.gateway {
        config.pad.gateway_url = gateway;
    }

    let client = GatewayClient::new(
        &config.pad.gateway_url,
        Duration::from_secs(config.pad.request_timeout_secs),
    )?;
    let mut dispatcher = Dispatcher::new(Bindings::from_config(&config.pad.bindings), client);

    if dispatcher.bindings().is_empty() {
        warn!("No button bindings configured; presses will be ignored");
    }
    info!("Gamepad shortcut mapper running. Press Ctrl+C to exit.");
    info!("Current mappings:");
    for (button, action) in dispatcher.bindings().iter() {
        info!("  Button {}: {}", button, action);
    }
    info!("Sending actions to {}", config.pad.gateway_url);

    let mut events = EventReader::open(&config.pad.device)?.spawn();
    info!("Reading events from {}", config.pad.device.display());

    tokio::select! {
        result = dispatcher.run(&mut events) => result?,
        _ = tokio::signal::ctrl_c() => info!("Exiting..."),
    }

    Ok(())
}
