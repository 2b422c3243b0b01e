use async_trait::async_trait;
use chrono::Utc;
use sea_orm::EntityTrait;
use tracing::debug;

use super::SeaOrmStore;
use super::converters::event_to_active_model;
use crate::tracking::{EventRecord, EventStore};

use migration::entities::interaction_event;

#[async_trait]
impl EventStore for SeaOrmStore {
    async fn insert_events(&self, events: Vec<EventRecord>) -> anyhow::Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let count = events.len();
        let now = Utc::now();
        let models: Vec<interaction_event::ActiveModel> = events
            .into_iter()
            .map(|record| event_to_active_model(record, now))
            .collect();

        interaction_event::Entity::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to insert interaction events: {}", e))?;

        debug!(
            "Interaction events written to {} database ({} records)",
            self.backend_name.to_uppercase(),
            count
        );
        Ok(())
    }
}
