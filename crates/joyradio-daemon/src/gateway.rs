use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use joyradio_proto::protocol::{ErrorReply, MessageReply, PlayerStatus, Station};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::player::{Player, PlayerError};

#[derive(Clone)]
struct GatewayState {
    player: Arc<Player>,
    volume_step: i32,
}

impl IntoResponse for PlayerError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = Json(ErrorReply {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

type ActionResult = Result<Json<MessageReply>, PlayerError>;

fn reply(message: String) -> ActionResult {
    Ok(Json(MessageReply { message }))
}

pub fn router(player: Arc<Player>, volume_step: u8) -> Router {
    let state = GatewayState {
        player,
        volume_step: i32::from(volume_step),
    };

    Router::new()
        .route("/stations", get(list_stations))
        .route("/status", get(status))
        .route("/play", post(play))
        .route("/next", post(next_station))
        .route("/prev", post(prev_station))
        .route("/stop", post(stop))
        .route("/volup", post(volume_up))
        .route("/voldown", post(volume_down))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, player: Arc<Player>, volume_step: u8) -> anyhow::Result<()> {
    info!("HTTP gateway listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(player, volume_step)).await?;
    Ok(())
}

async fn list_stations(State(state): State<GatewayState>) -> Json<Vec<Station>> {
    Json(state.player.stations().to_vec())
}

async fn status(State(state): State<GatewayState>) -> Json<PlayerStatus> {
    Json(state.player.status().await)
}

async fn play(State(state): State<GatewayState>) -> ActionResult {
    info!("HTTP API: Play");
    let station = state.player.play().await.inspect_err(|e| error!("play failed: {}", e))?;
    reply(format!("Playing station: {}", station.name))
}

async fn next_station(State(state): State<GatewayState>) -> ActionResult {
    info!("HTTP API: Next station");
    let station = state
        .player
        .next_station()
        .await
        .inspect_err(|e| error!("next failed: {}", e))?;
    reply(format!("Playing next station: {}", station.name))
}

async fn prev_station(State(state): State<GatewayState>) -> ActionResult {
    info!("HTTP API: Previous station");
    let station = state
        .player
        .prev_station()
        .await
        .inspect_err(|e| error!("prev failed: {}", e))?;
    reply(format!("Playing previous station: {}", station.name))
}

async fn stop(State(state): State<GatewayState>) -> ActionResult {
    info!("HTTP API: Stop");
    state.player.stop().await;
    reply("Playback stopped".to_string())
}

async fn volume_up(State(state): State<GatewayState>) -> ActionResult {
    info!("HTTP API: Volume up");
    let level = state
        .player
        .adjust_volume(state.volume_step)
        .await
        .inspect_err(|e| error!("volume up failed: {}", e))?;
    reply(format!("Volume increased to {}", level))
}

async fn volume_down(State(state): State<GatewayState>) -> ActionResult {
    info!("HTTP API: Volume down");
    let level = state
        .player
        .adjust_volume(-state.volume_step)
        .await
        .inspect_err(|e| error!("volume down failed: {}", e))?;
    reply(format!("Volume decreased to {}", level))
}
