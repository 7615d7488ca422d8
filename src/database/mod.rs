pub mod db;

pub use db::{LocalStore, StoreError};
