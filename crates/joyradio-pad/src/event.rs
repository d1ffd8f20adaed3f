//! Linux joystick (`/dev/input/jsN`) event records.
//!
//! The kernel emits fixed 8-byte records back to back, little-endian:
//!
//! ```text
//!   0..4  time    u32  event timestamp in milliseconds
//!   4..6  value   i16  button: 0 released / 1 pressed, axis: position
//!   6     kind    u8   0x01 button, 0x02 axis, |0x80 synthetic init state
//!   7     number  u8   button or axis index
//! ```
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::mpsc;

pub const EVENT_SIZE: usize = 8;

pub const JS_EVENT_BUTTON: u8 = 0x01;
pub const JS_EVENT_AXIS: u8 = 0x02;
pub const JS_EVENT_INIT: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub time: u32,
    pub value: i16,
    pub kind: u8,
    pub number: u8,
}

impl InputEvent {
    pub fn from_bytes(buf: &[u8; EVENT_SIZE]) -> Self {
        Self {
            time: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            value: i16::from_le_bytes([buf[4], buf[5]]),
            kind: buf[6],
            number: buf[7],
        }
    }

    pub fn to_bytes(&self) -> [u8; EVENT_SIZE] {
        let mut buf = [0u8; EVENT_SIZE];
        buf[0..4].copy_from_slice(&self.time.to_le_bytes());
        buf[4..6].copy_from_slice(&self.value.to_le_bytes());
        buf[6] = self.kind;
        buf[7] = self.number;
        buf
    }

    /// Live button event. Init-flagged snapshots (`0x81`) do not count.
    pub fn is_button(&self) -> bool {
        self.kind == JS_EVENT_BUTTON
    }
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("error opening device {path}: {source} (make sure the device exists and you have permission to read it)")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error reading event: {0}")]
    Decode(#[source] std::io::Error),
}

/// Decoded records as they come off the device reader thread. The last item
/// before the channel closes is the error that stopped the reader.
pub type EventStream = mpsc::Receiver<Result<InputEvent, DeviceError>>;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Reads joystick records one at a time from a byte stream.
pub struct EventReader<R> {
    reader: R,
    buf: [u8; EVENT_SIZE],
}

impl EventReader<File> {
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let file = File::open(path).map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file))
    }
}

impl<R: Read> EventReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: [0u8; EVENT_SIZE],
        }
    }

    /// Read exactly one record. A short read or end of stream is fatal.
    pub fn next_event(&mut self) -> Result<InputEvent, DeviceError> {
        self.reader
            .read_exact(&mut self.buf)
            .map_err(DeviceError::Decode)?;
        Ok(InputEvent::from_bytes(&self.buf))
    }
}

impl<R: Read + Send + 'static> EventReader<R> {
    /// Move the blocking read loop onto its own OS thread and hand back the
    /// receiving end. The thread is not owned by the tokio runtime, so an
    /// idle device never holds up runtime shutdown.
    pub fn spawn(mut self) -> EventStream {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        std::thread::spawn(move || loop {
            let item = self.next_event();
            let fatal = item.is_err();
            if tx.blocking_send(item).is_err() || fatal {
                break;
            }
        });
        rx
    }
}
