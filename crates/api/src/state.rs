use std::sync::Arc;

use crate::config::ServerConfig;
use crate::kanban::KanbanService;

/// Handler state. Clones share the pool, config and service.
#[derive(Clone)]
pub struct AppState {
    /// Used directly only by `/health`; board access goes through `kanban`.
    pub pool: kanban_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub kanban: Arc<KanbanService>,
}
