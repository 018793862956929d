use std::sync::Arc;

use common::context::{Context, Handler};
use common::logging;

use crate::config::AppConfig;
use crate::global::GlobalState;
use crate::store::MemoryStore;

pub async fn mock_global_state(config: AppConfig) -> (Arc<GlobalState>, Arc<MemoryStore>, Handler) {
    let (ctx, handler) = Context::new();

    logging::init(&config.log_level, config.log_json).expect("failed to initialize logging");

    let store = Arc::new(MemoryStore::new());

    (
        Arc::new(GlobalState::new(config, store.clone(), ctx)),
        store,
        handler,
    )
}
