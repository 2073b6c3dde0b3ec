pub mod client;
pub mod credentials;
pub mod error;
pub mod schemas;

pub use client::{Client, DEFAULT_BASE_URL};
pub use credentials::ModzyCredentials;
pub use error::ClientError;
