/// One-shot mpv IPC client.
///
/// Each command opens a fresh connection to mpv's `--input-ipc-server`
/// endpoint, writes a single JSON line, half-closes the write side and waits
/// for the matching reply line:
///
/// ```text
///   connect ──► write "{...}\n" ──► shutdown(write) ──► read lines
///                                                        ├── {"error":"success"}  → Ok
///                                                        ├── {"error":"<msg>"}    → Rejected
///                                                        ├── {"event":...}        → skipped
///                                                        └── EOF                  → Ok (delivered)
/// ```
///
/// Platform notes:
/// - Unix:    Unix domain socket at the configured path
/// - Windows: named pipe `\\.\pipe\<name>`
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

pub const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("cannot connect to mpv socket {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write command: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to read reply: {0}")]
    Read(#[source] std::io::Error),
    #[error("no reply from mpv within {0:?}")]
    Timeout(Duration),
    #[error("mpv rejected command: {0}")]
    Rejected(String),
}

/// `{"command": ["set_property", "volume", <level>]}`
pub fn set_volume_command(level: u8) -> Value {
    json!({ "command": ["set_property", "volume", level] })
}

pub async fn send_command(socket: &Path, command: &Value) -> Result<(), IpcError> {
    let mut line = command.to_string();
    line.push('\n');
    debug!("mpv ipc: send {} -> {}", line.trim(), socket.display());

    let stream = connect(socket).await?;
    exchange(stream, &line).await
}

#[cfg(unix)]
async fn connect(socket: &Path) -> Result<UnixStream, IpcError> {
    UnixStream::connect(socket)
        .await
        .map_err(|source| IpcError::Connect {
            path: socket.to_path_buf(),
            source,
        })
}

#[cfg(windows)]
async fn connect(
    socket: &Path,
) -> Result<tokio::net::windows::named_pipe::NamedPipeClient, IpcError> {
    ClientOptions::new()
        .open(socket)
        .map_err(|source| IpcError::Connect {
            path: socket.to_path_buf(),
            source,
        })
}

async fn exchange<S>(stream: S, line: &str) -> Result<(), IpcError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    write_half
        .write_all(line.as_bytes())
        .await
        .map_err(IpcError::Write)?;
    write_half.shutdown().await.map_err(IpcError::Write)?;

    let mut reader = BufReader::new(read_half);
    tokio::time::timeout(REPLY_TIMEOUT, read_reply(&mut reader))
        .await
        .map_err(|_| IpcError::Timeout(REPLY_TIMEOUT))?
}

async fn read_reply<R>(reader: &mut BufReader<R>) -> Result<(), IpcError>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await.map_err(IpcError::Read)?;
        if n == 0 {
            debug!("mpv ipc: connection closed without reply");
            return Ok(());
        }

        let trimmed = line.trim();
        let val: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                debug!("mpv ipc: invalid json '{}': {}", trimmed, e);
                continue;
            }
        };

        match val.get("error").and_then(Value::as_str) {
            Some("success") => return Ok(()),
            Some(err) => return Err(IpcError::Rejected(err.to_string())),
            // unsolicited event
            None => continue,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::UnixListener;

    #[test]
    fn test_volume_command_shape() {
        assert_eq!(
            set_volume_command(70).to_string(),
            r#"{"command":["set_property","volume",70]}"#
        );
    }

    async fn one_shot_server(path: &Path, reply: &'static str) -> tokio::task::JoinHandle<String> {
        let listener = UnixListener::bind(path).unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = String::new();
            stream.read_to_string(&mut received).await.unwrap();
            stream.write_all(reply.as_bytes()).await.unwrap();
            received
        })
    }

    #[tokio::test]
    async fn test_send_command_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mpv.sock");
        let server = one_shot_server(
            &path,
            "{\"event\":\"idle\"}\n{\"data\":null,\"request_id\":0,\"error\":\"success\"}\n",
        )
        .await;

        send_command(&path, &set_volume_command(60)).await.unwrap();
        let received = server.await.unwrap();
        assert_eq!(received, "{\"command\":[\"set_property\",\"volume\",60]}\n");
    }

    #[tokio::test]
    async fn test_send_command_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mpv.sock");
        let _server = one_shot_server(&path, "{\"request_id\":0,\"error\":\"property unavailable\"}\n").await;

        let err = send_command(&path, &set_volume_command(60)).await.unwrap_err();
        assert!(matches!(err, IpcError::Rejected(ref m) if m == "property unavailable"));
    }

    #[tokio::test]
    async fn test_send_command_closed_without_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mpv.sock");
        let _server = one_shot_server(&path, "").await;

        send_command(&path, &set_volume_command(10)).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_command_without_listener() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sock");
        let err = send_command(&path, &set_volume_command(10)).await.unwrap_err();
        assert!(matches!(err, IpcError::Connect { .. }));
    }
}
