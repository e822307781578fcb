pub mod config;
pub mod core;
pub mod error;
pub mod logger;
pub mod models;

pub use crate::core::HttpClient;
pub use error::{ApiError, ApiResult};
pub use models::{Id, LiveStatus, Room, User};
