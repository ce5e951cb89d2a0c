//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the `tracing-subscriber` used by binaries built on the
//! framework. It reads `RUST_LOG`, prints the compact single-line format and hides module
//! targets (every actor log line already carries `entity_type`).
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: startup with restored store size, shutdown with final size
//! - **Entity operations**: Create, Get, List, Update, Delete and Actions, keyed by `%id`
//! - **Rejections**: duplicate keys, failed hooks and failed actions at `warn`
//! - **Client calls**: `#[instrument]` spans from the typed clients and services
//!
//! ```bash
//! RUST_LOG=info cargo run                         # state changes only
//! RUST_LOG=debug cargo run                        # payloads of every request
//! RUST_LOG=actor_framework=debug,retail=info cargo run
//! ```
//!
//! With `RUST_LOG=info`, a checkout reads roughly as:
//!
//! ```text
//! INFO Action ok entity_type="Product" id=product_1
//! INFO Action ok entity_type="Product" id=product_2
//! INFO Created entity_type="Order" id=ORD-20261018-7KQ2ZD size=1
//! INFO Action ok entity_type="Cart" id=customer_1
//! INFO place_order: Order placed order_number=ORD-20261018-7KQ2ZD
//! ```

/// Installs the global subscriber. Calling it again (e.g. from several tests) is a no-op.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
