use std::sync::Arc;

use consensus_core::Consensus;
use consensus_impls::StaticCatalog;

/// The engine as deployed: in-memory state over the built-in catalog
pub type Engine = Consensus<StaticCatalog>;

#[derive(Clone)]
pub struct ServerContext {
    pub engine: Arc<Engine>,
}
