//! HTTP server lifecycle: starts/stops the axum server that serves
//! `app_router()`.
//!
//! bind → spawn background task → return handle with shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::app_router;
use crate::core_state::CoreState;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// Handle to a running server.
pub struct ApiServer {
    /// Bound address (the real port when 0 was requested).
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ApiServer {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("HTTP server shutdown signal sent");
        }
    }

    /// Shut down and wait until in-flight requests have drained.
    pub async fn stopped(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `addr`, build the router and spawn `axum::serve` in a
/// background tokio task. Port 0 picks an ephemeral port.
pub async fn start_api_server(core: Arc<CoreState>, addr: SocketAddr) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind HTTP server on {addr}: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = app_router(core);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("HTTP server received shutdown signal");
        };

        tracing::info!(%addr, "HTTP server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("HTTP server error: {e}");
        }

        tracing::info!("HTTP server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn test_core() -> (Arc<CoreState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let core = CoreState::open(tmp.path().join("patient_records.csv")).unwrap();
        (Arc::new(core), tmp)
    }

    fn loopback() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let (core, _tmp) = test_core();
        let server = start_api_server(core, loopback())
            .await
            .expect("server should start");

        assert!(server.port() > 0);
        assert!(server.addr.ip().is_loopback());

        let url = format!("http://127.0.0.1:{}/health", server.port());
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "ok");

        server.stopped().await;
    }

    #[tokio::test]
    async fn form_post_follows_redirect_to_day_view() {
        let (core, _tmp) = test_core();
        let server = start_api_server(core.clone(), loopback())
            .await
            .expect("server should start");
        let port = server.port();

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://127.0.0.1:{port}/appointments"))
            .form(&[
                ("patient_name", "Jane Doe"),
                ("patient_contact", "555-1234"),
                ("appointment_time", "2024-01-01T09:00"),
                ("address", "1 Main St"),
                ("appointment_for", "Checkup"),
                ("status", "scheduled"),
            ])
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["days"][0]["date"], "2024-01-01");
        assert_eq!(json["days"][0]["appointments"][0]["patient_name"], "Jane Doe");
        assert_eq!(core.store().len().unwrap(), 1);

        server.stopped().await;
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let (core, _tmp) = test_core();
        let first = start_api_server(core.clone(), loopback()).await.unwrap();
        let taken = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), first.port());

        let err = start_api_server(core, taken).await.err().unwrap();
        assert!(err.contains("Failed to bind"));

        first.stopped().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (core, _tmp) = test_core();
        let mut server = start_api_server(core, loopback()).await.unwrap();

        server.shutdown();
        server.shutdown();
        server.stopped().await;
    }
}
