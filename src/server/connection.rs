// Connection handling module
// Serves one accepted TCP connection in its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 (keep-alive, title-case header names)
/// 3. Bounds the wait for each request head by the configured timeout
/// 4. Serves the connection with the request handler
///
/// The timeout never applies while a response body is being written.
/// Errors stay inside the task; the accept loop never sees them.
pub fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let performance = &state.config.performance;

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(performance.keep_alive)
            .title_case_headers(true);
        // Without a timer hyper enforces no header deadline at all
        if performance.connection_timeout > 0 {
            builder
                .timer(TokioTimer::new())
                .header_read_timeout(Duration::from_secs(performance.connection_timeout));
        }

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                async move { handler::handle_request(req, state, peer_addr).await }
            }),
        );

        if let Err(err) = conn.await {
            if err.is_timeout() {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} sent no request within {} seconds",
                    state.config.performance.connection_timeout
                ));
            } else {
                logger::log_connection_error(&err);
            }
        }
    });
}
