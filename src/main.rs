use std::sync::Arc;

use coi_serve::config::{AppState, Config};
use coi_serve::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;
    let root = cfg.resolve_root()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, root))
}

async fn async_main(
    cfg: Config,
    root: std::path::PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(AppState::new(cfg, root));

    logger::log_server_start(&listener.local_addr()?, &state);
    server::run(listener, state, server::shutdown_signal()).await?;
    Ok(())
}
