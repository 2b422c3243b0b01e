//! Interaction event entity (write-once)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "interaction_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: String,
    pub fingerprint: Option<String>,
    pub event_type: String,
    pub element_id: Option<String>,
    pub element_type: Option<String>,
    pub page_x: Option<i32>,
    pub page_y: Option<i32>,
    pub page_path: String,
    pub project_id: Option<String>,
    /// Serialized JSON object
    #[sea_orm(column_type = "Text", nullable)]
    pub metadata: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
