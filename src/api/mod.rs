pub mod client;
pub mod error;

pub use client::{ApiClient, AuthApi};
pub use error::ApiError;
