//! Page visit entity, one row per page load

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "visitor_analytics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: String,
    pub fingerprint: Option<String>,
    pub page_path: String,
    /// desktop / tablet / mobile
    pub device_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
    /// Max observed scroll depth, 0-100
    pub scroll_depth: i32,
    /// Dwell time in seconds
    pub time_on_page: i32,
    pub clicks: i32,
    pub created_at: DateTimeUtc,
    /// Set by the single leave-page update
    pub patched_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
