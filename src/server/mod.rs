// Server module entry point
// Listener setup, accept loop, connection tasks and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::Server;
pub use signal::shutdown_signal;
