pub mod credentials;
pub mod user;

pub use credentials::{Credentials, LoginResponse};
pub use user::{User, ADMIN_ROLE};
