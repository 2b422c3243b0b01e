pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20261012_000001_visitor_analytics;
mod m20261012_000002_interaction_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261012_000001_visitor_analytics::Migration),
            Box::new(m20261012_000002_interaction_events::Migration),
        ]
    }
}
