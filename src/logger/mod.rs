//! Logger module
//!
//! Startup banner, warnings and errors, and the optional access log.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{AccessLogFormat, Config};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    let root = &config.serve.root_dir;
    let name = root
        .file_name()
        .map_or_else(|| root.display().to_string(), |n| n.to_string_lossy().into_owned());

    write_info("======================================");
    write_info(&format!("Serving {name} at http://localhost:{}", addr.port()));
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Root directory: {}", root.display()));
    if !root.is_dir() {
        log_warning("Root directory does not exist yet; every request will return 404");
    }
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if config.logging.access_log {
        let target = config.logging.access_log_file.as_deref().unwrap_or("stdout");
        write_info(&format!("Access log: {target}"));
    }
    write_info("Press Ctrl+C to stop");
    write_info("======================================\n");
}

pub fn log_server_stopped() {
    write_info("\nServer stopped");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: AccessLogFormat) {
    write_access(&entry.format(format));
}
