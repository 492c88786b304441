//! Image updater daemon entry point.

use std::future::pending;
use std::sync::Arc;

use log::{error, info};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use image_updater::config::Config;
use image_updater::poll::run_poll_loop;
use image_updater::runtime::DockerRuntime;
use image_updater::trigger::UpdateTrigger;
use image_updater::webhook::start_webhook_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    // Load configuration
    let cfg = Config::load()?;
    info!("Starting image updater with config: {:?}", cfg);

    let shutdown = CancellationToken::new();
    let trigger = Arc::new(UpdateTrigger::new(cfg.interval()));

    // Webhook
    let webhook = cfg
        .webhook_port()
        .map(|port| start_webhook_server(port, Arc::clone(&trigger), shutdown.child_token()));

    // Poll loop
    let poll_handle = tokio::spawn(run_poll_loop(
        cfg.watched_images(),
        DockerRuntime::new(),
        trigger.listen(),
        cfg.strict_registry,
    ));

    let webhook_failed = async {
        match webhook {
            Some(rx) => rx.await,
            None => pending().await,
        }
    };

    let mut result = Ok(());
    tokio::select! {
        res = signal::ctrl_c() => match res {
            Ok(()) => info!("Received Ctrl+C, shutting down..."),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        },
        res = webhook_failed => match res {
            Ok(Err(e)) => result = Err(e.into()),
            Ok(Ok(())) => info!("Webhook server stopped"),
            Err(_) => error!("Webhook server task ended unexpectedly"),
        },
    }

    // Stop listeners and the webhook
    shutdown.cancel();
    trigger.shutdown();
    if let Err(e) = poll_handle.await {
        error!("Poll loop panicked: {}", e);
    }

    info!("Shutdown complete.");
    result
}
