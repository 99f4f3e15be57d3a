// Signal handling module
//
// - SIGINT  (Ctrl+C): shutdown
// - SIGTERM:          shutdown (Unix only)

use crate::logger;

/// Resolve once the process is asked to stop.
///
/// If only one handler can be registered the other signal is ignored. If
/// neither can, the error is logged and the future never resolves, leaving
/// the default signal disposition in charge.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    wait_for_either(
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    )
    .await;
}

#[cfg(unix)]
async fn wait_for_either(
    first: std::io::Result<tokio::signal::unix::Signal>,
    second: std::io::Result<tokio::signal::unix::Signal>,
) {
    match (first, second) {
        (Ok(mut first), Ok(mut second)) => {
            tokio::select! {
                _ = first.recv() => {}
                _ = second.recv() => {}
            }
        }
        (Ok(mut only), Err(e)) | (Err(e), Ok(mut only)) => {
            logger::log_error(&format!("Failed to register signal handler: {e}"));
            only.recv().await;
        }
        (Err(e), Err(_)) => {
            logger::log_error(&format!("Failed to register signal handlers: {e}"));
            std::future::pending::<()>().await;
        }
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}
