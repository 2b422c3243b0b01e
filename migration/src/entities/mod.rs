pub mod interaction_event;
pub mod visitor_analytics;

pub use interaction_event::Entity as InteractionEventEntity;
pub use visitor_analytics::Entity as VisitorAnalyticsEntity;
