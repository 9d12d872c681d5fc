//! Tracing Setup
//!
//! Initializes the `tracing` subscriber with an env-filter and a compact
//! fmt layer. All gateway failures surface through this sink as leveled
//! events; there is no separate alerting mechanism.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter (default: `max_gateway=info`)

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
#[allow(clippy::expect_used)]
pub fn init() {
    let env_filter = EnvFilter::from_default_env().add_directive(
        "max_gateway=info"
            .parse()
            .expect("static directive 'max_gateway=info' is valid"),
    );

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
