use std::collections::BTreeMap;
use std::future::Future;

use joyradio_proto::config::ButtonBinding;
use joyradio_proto::protocol::Action;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::buttons::ButtonState;
use crate::event::{DeviceError, EventStream, InputEvent};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("error making request to {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("error reading response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status code from {url}: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Carries out an [`Action`]. The gateway client is the production executor.
pub trait ActionExecutor {
    fn execute(&self, action: Action) -> impl Future<Output = Result<(), ActionError>>;
}

/// Button number → action table. Later bindings for the same button win.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    map: BTreeMap<u8, Action>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(bindings: &[ButtonBinding]) -> Self {
        let mut table = Self::new();
        for b in bindings {
            table.bind(b.button, b.action);
        }
        table
    }

    pub fn bind(&mut self, button: u8, action: Action) {
        if let Some(previous) = self.map.insert(button, action) {
            debug!("button {} rebound from {} to {}", button, previous, action);
        }
    }

    pub fn get(&self, button: u8) -> Option<Action> {
        self.map.get(&button).copied()
    }

    /// Bindings ordered by button number.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Action)> + '_ {
        self.map.iter().map(|(b, a)| (*b, *a))
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

pub struct Dispatcher<E> {
    bindings: Bindings,
    executor: E,
    buttons: ButtonState,
}

impl<E: ActionExecutor> Dispatcher<E> {
    pub fn new(bindings: Bindings, executor: E) -> Self {
        Self {
            bindings,
            executor,
            buttons: ButtonState::new(),
        }
    }

    pub fn bind(&mut self, button: u8, action: Action) {
        self.bindings.bind(button, action);
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Run the action bound to `button`, if any. Failures are logged and
    /// swallowed so the read loop keeps going.
    pub async fn dispatch(&self, button: u8) {
        let Some(action) = self.bindings.get(button) else {
            debug!("button {} has no binding", button);
            return;
        };

        info!("Executing {} for button {}", action, button);
        if let Err(e) = self.executor.execute(action).await {
            warn!("{} for button {} failed: {}", action, button, e);
        }
    }

    /// Feed one decoded event through edge detection.
    pub async fn handle_event(&mut self, event: &InputEvent) {
        if let Some(button) = self.buttons.press_edge(event) {
            self.dispatch(button).await;
        }
    }

    /// Dispatch events from the device reader until it fails. Returns `Ok`
    /// only if the reader thread went away without reporting an error.
    pub async fn run(&mut self, events: &mut EventStream) -> Result<(), DeviceError> {
        while let Some(item) = events.recv().await {
            self.handle_event(&item?).await;
        }
        Ok(())
    }
}
