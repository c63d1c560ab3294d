pub mod common;
pub mod inventory;
pub mod pos;

use crate::events::EventSender;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub pos: Arc<crate::services::pos::PosService>,
    pub sync: Arc<crate::services::sync::OfflineSyncService>,
    pub inventory: Arc<crate::services::inventory::InventoryService>,
}

impl AppServices {
    /// Wires up the service graph over a shared connection pool.
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        let pos = Arc::new(crate::services::pos::PosService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let sync = Arc::new(crate::services::sync::OfflineSyncService::new(
            db.clone(),
            pos.clone(),
            event_sender.clone(),
        ));
        let inventory = Arc::new(crate::services::inventory::InventoryService::new(
            db,
            event_sender,
        ));

        Self {
            pos,
            sync,
            inventory,
        }
    }
}
