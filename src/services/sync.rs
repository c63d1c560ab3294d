//! Offline sale replay. Disconnected POS clients queue sales locally and
//! submit them in batches; each sale goes through the regular coordinator
//! on its own, so one bad request never drags down the rest of the batch.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AccessScope,
    entities::sync_log,
    errors::ServiceError,
    events::{Event, EventSender},
    services::pos::{CreateSaleInput, PosService},
};

/// One replayed sale.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSuccess {
    pub offline_id: String,
    pub sale_id: Uuid,
    pub total: Decimal,
    /// True when this submission was a retry of an already-committed sale.
    pub replayed: bool,
}

/// One rejected sale; the batch keeps going.
#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    pub offline_id: Option<String>,
    pub reason: String,
}

/// Batch outcome. Partial success is the normal mode, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub synced: usize,
    pub failed: usize,
    pub successful: Vec<SyncSuccess>,
    pub failures: Vec<SyncFailure>,
}

/// Replays offline sale batches through [`PosService`].
#[derive(Clone)]
pub struct OfflineSyncService {
    db: Arc<DatabaseConnection>,
    pos: Arc<PosService>,
    event_sender: EventSender,
}

impl OfflineSyncService {
    pub fn new(db: Arc<DatabaseConnection>, pos: Arc<PosService>, event_sender: EventSender) -> Self {
        Self {
            db,
            pos,
            event_sender,
        }
    }

    /// Processes the batch in input order. Every request is attempted
    /// independently; validation errors, shortages and access denials are
    /// recorded per request and never abort the loop.
    #[instrument(skip(self, scope, requests), fields(batch = requests.len()))]
    pub async fn sync_batch(
        &self,
        scope: &AccessScope,
        requests: Vec<CreateSaleInput>,
    ) -> Result<SyncReport, ServiceError> {
        let batch_branch = requests.first().map(|r| r.branch_id);

        let mut successful = Vec::new();
        let mut failures = Vec::new();

        for request in requests {
            let offline_id = request.offline_id.clone();
            if offline_id.is_none() {
                failures.push(SyncFailure {
                    offline_id: None,
                    reason: "offline_id is required for synced sales".to_string(),
                });
                continue;
            }

            match self.pos.create_sale(scope, request).await {
                Ok(receipt) => successful.push(SyncSuccess {
                    offline_id: offline_id.unwrap_or_default(),
                    sale_id: receipt.sale_id,
                    total: receipt.total,
                    replayed: receipt.replayed,
                }),
                Err(err) => failures.push(SyncFailure {
                    offline_id,
                    reason: err.to_string(),
                }),
            }
        }

        let report = SyncReport {
            synced: successful.len(),
            failed: failures.len(),
            successful,
            failures,
        };

        self.record_sync_log(scope, batch_branch, &report).await;

        self.event_sender
            .send_or_log(Event::SyncBatchProcessed {
                branch_id: batch_branch,
                synced: report.synced,
                failed: report.failed,
            })
            .await;

        Ok(report)
    }

    /// The report returned to the client is authoritative; failing to
    /// persist the log row is logged and swallowed.
    async fn record_sync_log(
        &self,
        scope: &AccessScope,
        branch_id: Option<Uuid>,
        report: &SyncReport,
    ) {
        let event_type = if report.failed == 0 {
            "sync_success"
        } else {
            "sync_failure"
        };

        let details = serde_json::json!({
            "successful": report.successful,
            "failed": report.failures,
        });

        let row = sync_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            branch_id: Set(branch_id),
            user_id: Set(Some(scope.user_id)),
            event_type: Set(event_type.to_string()),
            sales_synced: Set(report.synced as i32),
            sales_failed: Set(report.failed as i32),
            details: Set(details.to_string()),
            created_at: Set(chrono::Utc::now()),
        };

        if let Err(err) = row.insert(&*self.db).await {
            warn!("failed to record sync log: {}", err);
        }
    }
}
