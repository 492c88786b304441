//! Webhook receiver.
//!
//! Exposes `/webhook/generic`, which asks the update trigger for an
//! immediate check whenever something POSTs to it.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::Method;
use axum::routing::any;
use axum::Router;
use log::{error, info};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::trigger::UpdateTrigger;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("failed to bind webhook listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("webhook server failed: {0}")]
    Serve(#[from] io::Error),
}

pub fn router(trigger: Arc<UpdateTrigger>) -> Router {
    Router::new()
        .route("/webhook/generic", any(receive_generic_webhook))
        .with_state(trigger)
}

/// Every method gets `OK`; only POST triggers a check.
async fn receive_generic_webhook(
    State(trigger): State<Arc<UpdateTrigger>>,
    method: Method,
) -> &'static str {
    if method == Method::POST {
        trigger.signal_now();
        info!("webhook triggered");
    }

    "OK\n"
}

/// Starts the webhook server on `0.0.0.0:<port>` in the background.
///
/// The returned channel yields exactly once: the bind or serve error, or
/// `Ok(())` after a clean shutdown through `shutdown`.
pub fn start_webhook_server(
    port: u16,
    trigger: Arc<UpdateTrigger>,
    shutdown: CancellationToken,
) -> oneshot::Receiver<Result<(), WebhookError>> {
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let result = serve(port, trigger, shutdown).await;
        if let Err(e) = &result {
            error!("Webhook server failed: {}", e);
        }
        let _ = tx.send(result);
    });

    rx
}

async fn serve(
    port: u16,
    trigger: Arc<UpdateTrigger>,
    shutdown: CancellationToken,
) -> Result<(), WebhookError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| WebhookError::Bind { addr, source })?;
    info!("Webhook server listening on {}", addr);

    axum::serve(listener, router(trigger))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Webhook server stopped");
    Ok(())
}
