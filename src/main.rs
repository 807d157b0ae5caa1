use std::sync::Arc;
use tokio::sync::Notify;

use kiach::config::{AppState, Config};
use kiach::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; real deployments set the environment directly
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let cfg = Config::load()?;
    logger::init(&cfg.logging)?;
    if !dotenv_loaded {
        tracing::debug!("No .env file loaded");
    }

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(AppState::new(&cfg)?);

    logger::log_server_start(&addr, &cfg);

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));
    server::run(listener, state, shutdown).await;

    logger::log_info("Server stopped");
    Ok(())
}
