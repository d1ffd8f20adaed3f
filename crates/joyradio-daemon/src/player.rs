/// mpv process manager.
///
/// Owns at most one mpv child at a time plus the station cursor and volume
/// level. Every mutating operation runs under a single async mutex, so a
/// kill-then-spawn transition never interleaves with another start, a
/// station change or a volume command.
///
/// ```text
///   Stopped ──start(url)──► Running ──start(url')──► Running (old child killed)
///      ▲                       │
///      └────────stop()─────────┘
/// ```
///
/// Killing the previous child is best-effort: SIGKILL is sent and the handle
/// dropped without waiting for exit. A failed kill is logged and does not
/// abort the new launch.
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use chrono::{DateTime, Local};
use joyradio_proto::config::MpvConfig;
use joyradio_proto::platform;
use joyradio_proto::protocol::{PlayerStatus, Station};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::ipc::{self, IpcError};

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to start mpv: {0}")]
    Launch(#[source] std::io::Error),
    #[error("mpv IPC failed: {0}")]
    Ipc(#[from] IpcError),
    #[error("station catalog is empty")]
    EmptyCatalog,
}

/// A running player child, abstracted so tests can stand in for mpv.
pub trait PlayerProcess: Send {
    fn id(&self) -> Option<u32>;
    /// Request termination without waiting for the process to exit.
    fn start_kill(&mut self) -> std::io::Result<()>;
    fn is_alive(&mut self) -> bool;
}

impl PlayerProcess for tokio::process::Child {
    fn id(&self) -> Option<u32> {
        tokio::process::Child::id(self)
    }

    fn start_kill(&mut self) -> std::io::Result<()> {
        tokio::process::Child::start_kill(self)
    }

    fn is_alive(&mut self) -> bool {
        self.try_wait().ok().flatten().is_none()
    }
}

pub struct LaunchSpec<'a> {
    pub url: &'a str,
    pub ipc_socket: &'a Path,
    pub volume: u8,
}

pub trait Launcher: Send + Sync {
    fn launch(&self, spec: &LaunchSpec<'_>) -> std::io::Result<Box<dyn PlayerProcess>>;
}

/// Spawns headless, idle-tolerant mpv instances.
pub struct MpvLauncher {
    binary: PathBuf,
}

impl MpvLauncher {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Use the configured binary, else look mpv up beside the exe and on PATH.
    /// A missing binary surfaces later as a launch error.
    pub fn from_config(config: &MpvConfig) -> Self {
        let binary = config
            .binary
            .clone()
            .or_else(platform::find_mpv_binary)
            .unwrap_or_else(|| PathBuf::from(platform::mpv_binary_name()));
        Self::new(binary)
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Launcher for MpvLauncher {
    fn launch(&self, spec: &LaunchSpec<'_>) -> std::io::Result<Box<dyn PlayerProcess>> {
        let child = tokio::process::Command::new(&self.binary)
            .arg("--no-video")
            .arg("--idle=yes")
            .arg(format!("--input-ipc-server={}", spec.ipc_socket.display()))
            .arg("--quiet")
            .arg(format!("--volume={}", spec.volume))
            .arg(spec.url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(Box::new(child))
    }
}

struct Session {
    process: Option<Box<dyn PlayerProcess>>,
    index: usize,
    volume: u8,
    current: Option<Station>,
    started_at: Option<DateTime<Local>>,
}

pub struct Player {
    launcher: Arc<dyn Launcher>,
    stations: Vec<Station>,
    ipc_socket: PathBuf,
    session: Mutex<Session>,
}

impl Player {
    pub fn new(
        launcher: Arc<dyn Launcher>,
        stations: Vec<Station>,
        ipc_socket: PathBuf,
        initial_volume: u8,
    ) -> Self {
        Self {
            launcher,
            stations,
            ipc_socket,
            session: Mutex::new(Session {
                process: None,
                index: 0,
                volume: initial_volume.min(100),
                current: None,
                started_at: None,
            }),
        }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Replace any running player with a new one streaming `url`.
    pub async fn start(&self, url: &str) -> Result<(), PlayerError> {
        let mut session = self.session.lock().await;
        let station = Station {
            name: url.to_string(),
            url: url.to_string(),
        };
        self.start_locked(&mut session, station)
    }

    /// Start the first catalog entry and reset the cursor to it.
    pub async fn play(&self) -> Result<Station, PlayerError> {
        let mut session = self.session.lock().await;
        let station = self.stations.first().cloned().ok_or(PlayerError::EmptyCatalog)?;
        session.index = 0;
        info!("Playing station: {}", station.name);
        self.start_locked(&mut session, station.clone())?;
        Ok(station)
    }

    pub async fn next_station(&self) -> Result<Station, PlayerError> {
        self.step(1).await
    }

    pub async fn prev_station(&self) -> Result<Station, PlayerError> {
        self.step(-1).await
    }

    async fn step(&self, delta: isize) -> Result<Station, PlayerError> {
        let mut session = self.session.lock().await;
        let len = self.stations.len();
        if len == 0 {
            return Err(PlayerError::EmptyCatalog);
        }
        session.index = wrap_index(session.index, delta, len);
        let station = self.stations[session.index].clone();
        info!(
            "Switching to station {}/{}: {}",
            session.index + 1,
            len,
            station.name
        );
        self.start_locked(&mut session, station.clone())?;
        Ok(station)
    }

    /// Kill the running player, if any. Stopping while stopped is a no-op.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        match session.process.take() {
            Some(process) => {
                info!("Stopping mpv");
                kill_best_effort(process);
            }
            None => debug!("stop: no mpv process running"),
        }
        session.current = None;
        session.started_at = None;
    }

    /// Add `delta` to the volume, clamp to [0, 100] and push it to mpv.
    /// The new level is kept even when mpv cannot be reached, so the next
    /// launch starts at it.
    pub async fn adjust_volume(&self, delta: i32) -> Result<u8, PlayerError> {
        let mut session = self.session.lock().await;
        session.volume = clamp_volume(session.volume, delta);
        let level = session.volume;
        info!("Adjusting volume to: {}", level);
        ipc::send_command(&self.ipc_socket, &ipc::set_volume_command(level)).await?;
        Ok(level)
    }

    /// Write one raw JSON command to mpv's control socket.
    pub async fn send_control_command(&self, command: &Value) -> Result<(), PlayerError> {
        let _session = self.session.lock().await;
        ipc::send_command(&self.ipc_socket, command).await?;
        Ok(())
    }

    pub async fn status(&self) -> PlayerStatus {
        let mut session = self.session.lock().await;
        let playing = session.process.as_mut().is_some_and(|p| p.is_alive());
        PlayerStatus {
            playing,
            station: session.current.as_ref().map(|s| s.name.clone()),
            index: session.index,
            volume: session.volume,
            started_at: session.started_at,
        }
    }

    fn start_locked(&self, session: &mut Session, station: Station) -> Result<(), PlayerError> {
        if let Some(previous) = session.process.take() {
            info!("Stopping existing mpv process...");
            kill_best_effort(previous);
        }
        session.current = None;
        session.started_at = None;

        info!("Starting mpv with URL: {}", station.url);
        let spec = LaunchSpec {
            url: &station.url,
            ipc_socket: &self.ipc_socket,
            volume: session.volume,
        };
        let process = self.launcher.launch(&spec).map_err(PlayerError::Launch)?;
        debug!("mpv started pid={:?}", process.id());

        session.process = Some(process);
        session.current = Some(station);
        session.started_at = Some(Local::now());
        Ok(())
    }
}

fn kill_best_effort(mut process: Box<dyn PlayerProcess>) {
    let pid = process.id();
    if let Err(e) = process.start_kill() {
        warn!("failed to kill mpv pid={:?}: {}", pid, e);
    }
}

fn wrap_index(current: usize, delta: isize, len: usize) -> usize {
    (current as isize + delta).rem_euclid(len as isize) as usize
}

fn clamp_volume(current: u8, delta: i32) -> u8 {
    (current as i32 + delta).clamp(0, 100) as u8
}
