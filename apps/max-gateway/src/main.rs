//! MAX Gateway Binary
//!
//! Starts the three channel sessions against the MAX venue.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p max-gateway -- <ACCESS_ID> <CONFIG_DB>
//! ```
//!
//! - `ACCESS_ID`: session identity stamped into every outbound frame
//! - `CONFIG_DB`: path/DSN of the configuration store holding the
//!   `service_config` table (`Max:Active:Ip`, `Max:Active:Port:{1,2,3}`)
//!
//! Exits with code 2 when the argument count is wrong.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter (default: `max_gateway=info`)

use std::sync::Arc;

use max_gateway::infrastructure::telemetry;
use max_gateway::{
    ConfigMap, GatewayContext, JobChannel, OrderChannel, ReportChannel, SessionTimings,
    job_mailbox, load_service_config, report_mailbox,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [access_id, store_dsn] = args.as_slice() else {
        tracing::error!("usage: max-gateway <ACCESS_ID> <CONFIG_DB>");
        std::process::exit(2);
    };

    tracing::info!(access_id = %access_id, store = %store_dsn, "Starting MAX gateway");

    let config = match load_service_config(store_dsn).await {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration store unavailable, continuing without it");
            ConfigMap::new()
        }
    };

    let ctx = Arc::new(GatewayContext::new(access_id.clone(), config));
    let timings = SessionTimings::default();
    let shutdown = CancellationToken::new();

    // The senders are the embedding surface for upstream order logic; they
    // stay alive for the life of the process so the sessions keep their
    // mailboxes open.
    let (_job_tx, job_rx) = job_mailbox();
    let (_report_tx, report_rx) = report_mailbox();

    let job = JobChannel::new(Arc::clone(&ctx), timings, job_rx, shutdown.clone());
    let order = OrderChannel::new(Arc::clone(&ctx), timings, shutdown.clone());
    let report = ReportChannel::new(Arc::clone(&ctx), timings, report_rx, shutdown.clone());

    tokio::spawn(job.run());
    tokio::spawn(order.run());
    tokio::spawn(report.run());

    tracing::info!("Gateway ready");

    await_shutdown(shutdown).await;

    tracing::info!("Gateway stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
