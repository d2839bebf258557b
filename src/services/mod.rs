pub mod analytics;
pub mod insight_agent;
