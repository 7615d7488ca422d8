pub mod api;
pub mod config;
pub mod database;
pub mod export;
pub mod models;

pub use api::ApiClient;
pub use config::Config;
pub use models::{MemorizationRecord, RevisionSession, compute_next_revision_date};
