//! Customer resolution for POS capture: contact number is the identity key,
//! and lookup-or-create is idempotent so repeat customers never duplicate.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::customer::{self, Entity as CustomerEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};

const WALK_IN_NAME: &str = "Walk-in";

/// Finds the customer with this contact or creates one. Runs on the
/// caller's connection so sale capture can fold it into its transaction.
#[instrument(skip(db, event_sender))]
pub async fn resolve_or_create<C: ConnectionTrait>(
    db: &C,
    name: Option<&str>,
    contact: &str,
    event_sender: &EventSender,
) -> Result<customer::Model, ServiceError> {
    let contact = contact.trim();
    if contact.is_empty() {
        return Err(ServiceError::ValidationError(
            "customer contact must not be empty".to_string(),
        ));
    }

    if let Some(existing) = CustomerEntity::find()
        .filter(customer::Column::Contact.eq(contact))
        .one(db)
        .await
        .map_err(ServiceError::db_error)?
    {
        return Ok(existing);
    }

    let display_name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(WALK_IN_NAME);

    let id = Uuid::new_v4();
    let row = customer::ActiveModel {
        id: Set(id),
        name: Set(display_name.to_string()),
        contact: Set(contact.to_string()),
        email: Set(None),
        created_at: Set(Utc::now()),
    };
    let created = row.insert(db).await.map_err(ServiceError::db_error)?;

    event_sender.send_or_log(Event::CustomerCreated(id)).await;

    Ok(created)
}
