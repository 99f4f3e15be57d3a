use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use wasm_serve::cli::Cli;
use wasm_serve::server::{self, Server};
use wasm_serve::{logger, AppState, Config, ServeError};

fn main() -> ExitCode {
    // Invalid port arguments exit here, before anything is bound
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ServeError> {
    let cfg = Config::load(cli.port)?;
    logger::init(&cfg)?;

    // Tokio runtime; worker count follows server.workers when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), ServeError> {
    let state = Arc::new(AppState::new(cfg));
    let server = Server::bind(Arc::clone(&state))?;

    logger::log_server_start(&server.local_addr()?, &state.config);

    server.run(server::shutdown_signal()).await
}
