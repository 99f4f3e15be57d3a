//! Static file server for WebAssembly bundles.
//!
//! Serves a directory over HTTP/1.1 and stamps every response with
//! `Cross-Origin-Embedder-Policy: require-corp` and
//! `Cross-Origin-Opener-Policy: same-origin`, so browsers grant the page
//! cross-origin isolation (and with it `SharedArrayBuffer`). MIME types for
//! `.wasm`, `.js`, `.css`, `.ttf` and `.svg` are pinned instead of trusting the
//! default extension map.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{AppState, Config};
pub use error::{Result, ServeError};
pub use http::ResponsePolicy;
pub use server::Server;
