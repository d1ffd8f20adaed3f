use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use joyradio_daemon::catalog;
use joyradio_daemon::gateway;
use joyradio_daemon::player::{MpvLauncher, Player};
use joyradio_proto::config::Config;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// HTTP gateway that drives an mpv radio player from a remote station list.
#[derive(Parser, Debug)]
#[command(name = "joyradio-daemon", version, about)]
struct Args {
    /// Config file (default: ~/.config/joyradio/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address the HTTP gateway binds to
    #[arg(long)]
    bind: Option<String>,

    /// Port the HTTP gateway listens on
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Station catalog URL (JSON array of {name, url})
    #[arg(long)]
    catalog_url: Option<String>,
}

fn init_logging() -> anyhow::Result<PathBuf> {
    let data_dir = joyradio_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("daemon.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,joyradio_daemon=debug,hyper_util=warn")
            }),
        )
        .init();

    Ok(log_path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_path = init_logging()?;
    info!("Log file: {:?}", log_path);

    let config_path = args.config.unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    info!("Config loaded from: {:?}", config_path);

    if let Some(bind) = args.bind {
        config.http.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if let Some(url) = args.catalog_url {
        config.catalog.url = url;
    }

    // No serving without a catalog.
    let stations = catalog::fetch_catalog(&config.catalog)
        .await
        .context("failed to load radio stations")?;

    let launcher = MpvLauncher::from_config(&config.mpv);
    info!("Using mpv binary {}", launcher.binary().display());

    let player = Arc::new(Player::new(
        Arc::new(launcher),
        stations,
        config.mpv.ipc_socket.clone(),
        config.mpv.initial_volume,
    ));

    let addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP gateway to {}", addr))?;

    let served = tokio::select! {
        result = gateway::serve(listener, player.clone(), config.mpv.volume_step) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    };

    // mpv outlives us otherwise, whichever way the gateway ended.
    player.stop().await;
    served
}
