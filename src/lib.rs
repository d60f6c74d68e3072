pub mod api;
pub mod config;
pub mod entity;
pub mod error;
pub mod notify;
pub mod store;

pub use error::{AppError, Result};
pub use store::ComplaintStore;
