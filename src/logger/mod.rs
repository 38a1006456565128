//! Logger module
//!
//! Operator-facing diagnostics for the dispatcher and the bundled server
//! adapter. Two sinks: an access log and an error log, each a file or
//! stdout/stderr. Diagnostic detail never reaches response bodies; it goes
//! here only.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup. Before initialization all
/// output falls back to stdout/stderr, so library embedders who never call
/// this still get diagnostics.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, routes: usize, config: &Config) {
    write_access("======================================");
    write_access("Server started");
    write_access(&format!("Listening on: http://{addr}"));
    write_access(&format!("Registered routes: {routes}"));
    if let Some(workers) = config.server.workers {
        write_access(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_access(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_access(&format!("Error log: {path}"));
    }
    write_access("======================================");
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

/// An ordinary failure raised inside a route handler.
pub fn log_handler_failure(message: &str) {
    write_error(&format!("[ERROR] [handler] {message}"));
}

/// A contract violation in application code (double render, no response).
/// Kept on a separate channel from handler failures so the two are
/// distinguishable in logs even though both surface as 500.
pub fn log_contract_violation(message: &str) {
    write_error(&format!("[ERROR] [contract] {message}"));
}

/// A static path whose canonical form escaped the configured root.
pub fn log_traversal_blocked(url_path: &str, resolved: &Path) {
    write_error(&format!(
        "[WARN] Path traversal attempt blocked: {} -> {}",
        url_path,
        resolved.display()
    ));
}

/// Emit a formatted access log entry.
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
