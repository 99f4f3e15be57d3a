//! Error types
//!
//! Startup errors (`InvalidArgument`, `Config`, `BindFailure`, `Io`) are fatal and
//! end the process with a non-zero status. Request errors (`NotFound`, `BadRequest`,
//! `ReadFailure`) are turned into an HTTP response for that request only.

use hyper::StatusCode;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServeError>;

#[derive(Error, Debug)]
pub enum ServeError {
    /// Port or address that cannot be used
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unreadable config file or mistyped setting
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Listener could not be created on the requested address
    #[error("failed to bind {addr}: {source}")]
    BindFailure {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Requested path is missing or lies outside the serving root
    #[error("not found")]
    NotFound,

    /// Request path could not be decoded
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Filesystem error while loading a file or listing a directory
    #[error("failed to read {}: {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ServeError {
    /// HTTP status a request-scoped error is reported with
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
