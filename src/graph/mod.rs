pub mod auth;
pub mod client;

pub use auth::{AuthError, Credentials, GraphAuthenticator, TokenInfo};
pub use client::{ApiError, CalendarApi, GraphClient};
