//! Bundled tokio/hyper server adapter.
//!
//! Glue between TCP and the dispatcher: accept connections, hand each one to
//! a spawned task, and translate hyper requests into the environment mapping
//! the [`App`] consumes. The core does not depend on this module; embedders
//! with their own server can call [`App::handle`] directly.

mod connection;
mod listener;

pub use listener::bind_reusable;

use crate::app::App;
use crate::config::Config;
use crate::error::BoxError;
use crate::logger;
use std::sync::Arc;

/// Accept-and-serve loop. Runs until the listener fails fatally.
pub async fn serve(app: Arc<App>, config: &Config) -> Result<(), BoxError> {
    let addr = config.socket_addr()?;
    let listener = bind_reusable(addr)?;
    let logging = Arc::new(config.logging.clone());

    logger::log_server_start(&listener.local_addr()?, app.route_count(), config);

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(connection::handle(
                    stream,
                    peer,
                    Arc::clone(&app),
                    Arc::clone(&logging),
                ));
            }
            Err(err) => {
                logger::log_error(&format!("Failed to accept connection: {err}"));
            }
        }
    }
}
