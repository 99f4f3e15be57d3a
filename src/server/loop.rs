// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::handle_connection;
use super::listener::create_listener;
use crate::config::AppState;
use crate::error::Result;
use crate::logger;

/// Bound, not yet running, static asset server
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Bind the listener on the configured address. Must run inside a Tokio runtime.
    pub fn bind(state: Arc<AppState>) -> Result<Self> {
        let addr = state.config.get_socket_addr()?;
        let listener = create_listener(addr)?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves, then close the listener.
    ///
    /// Connections already accepted keep running in their own tasks.
    #[allow(clippy::ignored_unit_patterns)]
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Self { listener, state } = self;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            handle_connection(stream, peer_addr, Arc::clone(&state));
                        }
                        Err(e) => {
                            logger::log_error(&format!("Failed to accept connection: {e}"));
                        }
                    }
                }

                _ = &mut shutdown => break,
            }
        }

        drop(listener);
        logger::log_server_stopped();
        Ok(())
    }
}
