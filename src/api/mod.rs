pub mod client;
pub mod memorization;
pub mod progress;
pub mod quiz;
pub mod quran;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::{ApiClient, ApiError};
pub use memorization::{MemorizationApi, RemoteStore};
pub use progress::ProgressApi;
pub use quiz::QuizApi;
pub use quran::QuranApi;
