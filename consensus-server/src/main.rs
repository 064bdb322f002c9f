use std::sync::Arc;

use log::info;

use consensus_core::{Config, Consensus};
use consensus_impls::StaticCatalog;
use consensus_server::{logging, run_server};

#[tokio::main]
async fn main() {
    logging::init_logger();

    let engine = Arc::new(Consensus::new(Config::default(), StaticCatalog::new()));

    info!("engine initialized, starting server...");

    run_server(engine).await
}
