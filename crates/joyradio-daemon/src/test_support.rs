//! Fakes shared by the player and gateway tests.
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use joyradio_proto::protocol::Station;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;

use crate::player::{LaunchSpec, Launcher, PlayerProcess};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub url: String,
    pub volume: u8,
}

#[derive(Debug, Default)]
pub struct LaunchLog {
    pub launches: Vec<Launch>,
    pub killed: Vec<u32>,
}

impl LaunchLog {
    /// Processes launched and not yet killed.
    pub fn live(&self) -> Vec<u32> {
        (0..self.launches.len() as u32)
            .filter(|id| !self.killed.contains(id))
            .collect()
    }
}

/// Launcher that records every launch instead of spawning mpv.
#[derive(Default)]
pub struct FakeLauncher {
    pub log: Arc<Mutex<LaunchLog>>,
    pub fail_launch: bool,
    pub fail_kill: bool,
}

struct FakeProcess {
    id: u32,
    log: Arc<Mutex<LaunchLog>>,
    fail_kill: bool,
}

impl PlayerProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.id)
    }

    fn start_kill(&mut self) -> std::io::Result<()> {
        if self.fail_kill {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "kill refused",
            ));
        }
        self.log.lock().unwrap().killed.push(self.id);
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        !self.log.lock().unwrap().killed.contains(&self.id)
    }
}

impl Launcher for FakeLauncher {
    fn launch(&self, spec: &LaunchSpec<'_>) -> std::io::Result<Box<dyn PlayerProcess>> {
        if self.fail_launch {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "mpv: not found",
            ));
        }
        let mut log = self.log.lock().unwrap();
        let id = log.launches.len() as u32;
        log.launches.push(Launch {
            url: spec.url.to_string(),
            volume: spec.volume,
        });
        Ok(Box::new(FakeProcess {
            id,
            log: self.log.clone(),
            fail_kill: self.fail_kill,
        }))
    }
}

pub fn stations(names: &[&str]) -> Vec<Station> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Station {
            name: name.to_string(),
            url: format!("u{}", i + 1),
        })
        .collect()
}

/// Stand-in for mpv's IPC server: records every command line and answers success.
pub fn fake_mpv(dir: &Path) -> (PathBuf, Arc<Mutex<Vec<String>>>) {
    let path = dir.join("mpv-socket");
    let listener = UnixListener::bind(&path).unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut line = String::new();
            if stream.read_to_string(&mut line).await.is_err() {
                continue;
            }
            sink.lock().unwrap().push(line.trim().to_string());
            let _ = stream
                .write_all(b"{\"data\":null,\"request_id\":0,\"error\":\"success\"}\n")
                .await;
        }
    });
    (path, received)
}
