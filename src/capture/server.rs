//! Capture server
//!
//! HTTP server that accepts any request, answers 200 and forwards a
//! description of the request to the main application.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, Method, StatusCode},
    Router,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use super::CapturedRequest;

/// Default capacity of the capture channel
pub const DEFAULT_CHANNEL_BUFFER: usize = 1024;

/// Sender half of the capture channel
pub type CaptureSender = mpsc::Sender<CapturedRequest>;

/// Receiver half of the capture channel
pub type CaptureReceiver = mpsc::Receiver<CapturedRequest>;

#[derive(Clone)]
struct CaptureState {
    sender: CaptureSender,
    dropped: Arc<AtomicU64>,
}

/// Handle to control the running server
pub struct ServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    addr: SocketAddr,
    dropped: Arc<AtomicU64>,
}

impl ServerHandle {
    /// Get the address the server is listening on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL that records a log entry when requested
    pub fn payload_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Number of requests dropped since the last call, resetting the count
    pub fn take_dropped_events(&self) -> u64 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// Shutdown the server gracefully
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // Receiver is gone if the server already stopped
            let _ = tx.send(());
        }
    }
}

/// Create a bounded channel for captured requests
pub fn create_channel(buffer: usize) -> (CaptureSender, CaptureReceiver) {
    mpsc::channel(buffer)
}

fn router(state: CaptureState) -> Router {
    Router::new().fallback(capture_handler).with_state(state)
}

/// Start the capture server on 127.0.0.1
///
/// Port 0 lets the OS pick a free port; see [`ServerHandle::addr`].
pub async fn start(port: u16, sender: CaptureSender) -> Result<ServerHandle> {
    let dropped = Arc::new(AtomicU64::new(0));
    let app = router(CaptureState {
        sender,
        dropped: Arc::clone(&dropped),
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind capture endpoint on {}", addr))?;
    let bound_addr = listener.local_addr()?;

    info!("Capture endpoint listening on {}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            info!("Capture endpoint shutting down");
        })
        .await
        .ok();
    });

    Ok(ServerHandle {
        shutdown_tx: Some(shutdown_tx),
        addr: bound_addr,
        dropped,
    })
}

/// Fallback handler for every method and path
async fn capture_handler(
    State(state): State<CaptureState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    headers: HeaderMap,
) -> StatusCode {
    let peer = peer.map(|ConnectInfo(addr)| addr);
    let captured = CapturedRequest::from_parts(peer, &method, &headers);
    debug!(ip = %captured.entry.ip, method = %method, "Captured request");

    match state.sender.try_send(captured) {
        Ok(()) => StatusCode::OK,
        Err(mpsc::error::TrySendError::Full(_)) => {
            state.dropped.fetch_add(1, Ordering::Relaxed);
            error!("Capture channel full, dropping request");
            StatusCode::OK
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            error!("Capture channel closed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
