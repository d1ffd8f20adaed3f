use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One playable entry of the remote station catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub url: String,
}

/// Playback actions shared by the gamepad client and the HTTP gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Play,
    Next,
    Prev,
    Stop,
    VolUp,
    VolDown,
}

impl Action {
    /// Gateway route that performs this action (always `POST`).
    pub fn route(self) -> &'static str {
        match self {
            Action::Play => "/play",
            Action::Next => "/next",
            Action::Prev => "/prev",
            Action::Stop => "/stop",
            Action::VolUp => "/volup",
            Action::VolDown => "/voldown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Play => "Play",
            Action::Next => "Next",
            Action::Prev => "Previous",
            Action::Stop => "Stop",
            Action::VolUp => "Volume Up",
            Action::VolDown => "Volume Down",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Success body of every gateway action route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReply {
    pub message: String,
}

/// Failure body of every gateway action route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

/// Snapshot returned by `GET /status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub playing: bool,
    pub station: Option<String>,
    pub index: usize,
    pub volume: u8,
    pub started_at: Option<DateTime<Local>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        assert_eq!(serde_json::to_string(&Action::VolUp).unwrap(), "\"vol_up\"");
        let parsed: Action = serde_json::from_str("\"vol_down\"").unwrap();
        assert_eq!(parsed, Action::VolDown);
    }

    #[test]
    fn test_routes_are_distinct() {
        let actions = [
            Action::Play,
            Action::Next,
            Action::Prev,
            Action::Stop,
            Action::VolUp,
            Action::VolDown,
        ];
        let mut routes: Vec<_> = actions.iter().map(|a| a.route()).collect();
        routes.sort();
        routes.dedup();
        assert_eq!(routes.len(), actions.len());
    }

    #[test]
    fn test_station_list_decodes() {
        let body = r#"[{"name":"A","url":"u1"},{"name":"B","url":"u2"}]"#;
        let stations: Vec<Station> = serde_json::from_str(body).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[1].name, "B");
    }
}
