pub mod admin;
pub mod chat;
pub mod health;
pub mod ingest;

pub use admin::get_analytics_report;
pub use chat::post_chat;
pub use health::health_check;
pub use ingest::{create_visit, ingest_events, update_visit};
