use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod model;
mod pipeline;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime with the configured number of worker threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger::log_info("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    check_model_artifact(&cfg);

    let listener = server::create_listener(addr)?;
    let state = Arc::new(config::AppState::new(&cfg).await);
    let active_connections = Arc::new(AtomicUsize::new(0));
    let shutdown = Arc::new(Notify::new());

    server::start_signal_handler(Arc::clone(&state), Arc::clone(&shutdown));
    logger::log_server_start(&addr, &cfg);

    let grace = Duration::from_secs(cfg.performance.write_timeout);
    server::start_server_loop(listener, state, active_connections, shutdown, grace).await;

    logger::log_info("Server stopped");
    Ok(())
}

/// Soft startup gate: a missing artifact is logged, the server still starts
fn check_model_artifact(cfg: &config::Config) {
    let path = Path::new(&cfg.model.path);
    if !path.exists() {
        logger::log_error(&format!("Model file '{}' not found!", path.display()));
    }
    if cfg.model.scaling == config::ScalingMode::PerRequest {
        logger::log_warning(
            "Feature scaling is fitted on each request's own rows; \
             single-row requests standardize to zeros and predict the intercept. \
             Set model.scaling = \"artifact\" to use training-time statistics.",
        );
    }
}
