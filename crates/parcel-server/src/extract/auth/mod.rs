//! Authentication extractors.

mod admin;
mod auth_token;

pub use admin::AdminCredentials;
pub use auth_token::AuthToken;
