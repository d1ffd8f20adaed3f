use std::time::Duration;

use joyradio_proto::protocol::Action;
use reqwest::{Client, StatusCode};
use tracing::info;

use crate::dispatch::{ActionError, ActionExecutor};

/// Performs actions by POSTing to the joyradio HTTP gateway.
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, action: Action) -> String {
        format!("{}{}", self.base_url, action.route())
    }
}

impl ActionExecutor for GatewayClient {
    async fn execute(&self, action: Action) -> Result<(), ActionError> {
        let url = self.url_for(action);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|source| ActionError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ActionError::Body {
            url: url.clone(),
            source,
        })?;
        info!("Response from {}: {} {}", url, status, body.trim());

        if status != StatusCode::OK {
            return Err(ActionError::Status { url, status });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::{Json, Router};

    async fn gateway_stub() -> String {
        let router = Router::new()
            .route(
                "/next",
                post(|| async { Json(serde_json::json!({"message": "Playing next station: B"})) }),
            )
            .route(
                "/volup",
                post(|| async {
                    (
                        AxumStatus::INTERNAL_SERVER_ERROR,
                        Json(serde_json::json!({"error": "mpv IPC failed"})),
                    )
                }),
            )
            .route("/play", post(|| async { AxumStatus::ACCEPTED }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[test]
    fn test_url_for_strips_trailing_slash() {
        let client = GatewayClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url_for(Action::VolDown), "http://localhost:8080/voldown");
        assert_eq!(client.url_for(Action::Prev), "http://localhost:8080/prev");
    }

    #[tokio::test]
    async fn test_ok_response() {
        let client = GatewayClient::new(&gateway_stub().await, Duration::from_secs(5)).unwrap();
        client.execute(Action::Next).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_200_is_failure() {
        let client = GatewayClient::new(&gateway_stub().await, Duration::from_secs(5)).unwrap();

        let err = client.execute(Action::VolUp).await.unwrap_err();
        assert!(matches!(err, ActionError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR));

        // 202 is still not 200
        let err = client.execute(Action::Play).await.unwrap_err();
        assert!(matches!(err, ActionError::Status { status, .. } if status == StatusCode::ACCEPTED));

        let err = client.execute(Action::Stop).await.unwrap_err();
        assert!(matches!(err, ActionError::Status { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_truncated_body_is_failure() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Promises more body than it sends, then hangs up.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 64\r\n\r\n{\"message\":")
                .await
                .unwrap();
        });

        let client = GatewayClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let err = client.execute(Action::Next).await.unwrap_err();
        assert!(matches!(err, ActionError::Body { .. }));
        assert!(err.to_string().starts_with("error reading response"));
    }

    #[tokio::test]
    async fn test_unreachable_gateway() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GatewayClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let err = client.execute(Action::Next).await.unwrap_err();
        assert!(matches!(err, ActionError::Request { .. }));
    }
}
