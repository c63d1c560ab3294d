use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after state has committed. Consumers are
/// best-effort: losing an event never unwinds the transaction it describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SaleCompleted {
        sale_id: Uuid,
        branch_id: Uuid,
        total: Decimal,
        items_count: usize,
    },
    StockDeducted {
        inventory_item_id: Uuid,
        quantity: Decimal,
        new_quantity: Decimal,
        sale_id: Option<Uuid>,
    },
    StockRestocked {
        inventory_item_id: Uuid,
        quantity: Decimal,
        new_quantity: Decimal,
    },
    /// Fired when a deduction leaves an item at or below its reorder level.
    StockLow {
        inventory_item_id: Uuid,
        name: String,
        quantity_in_stock: Decimal,
        reorder_level: Decimal,
    },
    SyncBatchProcessed {
        branch_id: Option<Uuid>,
        synced: usize,
        failed: usize,
    },
    CustomerCreated(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is gone.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("event dropped: {}", e);
        }
    }
}

/// Background consumer for the event channel. Today this logs each event;
/// notification fan-out would subscribe here.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::SaleCompleted {
                sale_id,
                branch_id,
                total,
                items_count,
            } => {
                info!(%sale_id, %branch_id, %total, items_count, "sale completed");
            }
            Event::StockLow {
                inventory_item_id,
                name,
                quantity_in_stock,
                reorder_level,
            } => {
                warn!(
                    %inventory_item_id,
                    name,
                    %quantity_in_stock,
                    %reorder_level,
                    "stock at or below reorder level"
                );
            }
            Event::SyncBatchProcessed {
                branch_id,
                synced,
                failed,
            } => {
                info!(?branch_id, synced, failed, "offline sync batch processed");
            }
            other => {
                info!(event = ?other, "domain event");
            }
        }
    }
}
