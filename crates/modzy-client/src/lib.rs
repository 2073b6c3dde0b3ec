//! Client for the Modzy inference API.
//!
//! ```no_run
//! use modzy_client::jobs::{InputSource, JobInputs, ModelRef};
//! use modzy_client::{ModzyClient, ModzyError};
//!
//! # async fn run() -> Result<(), ModzyError> {
//! let client = ModzyClient::from_env()?;
//! let inputs = JobInputs::new().with_item("my-input", "input", InputSource::file("video.mp4"));
//! let job = client
//!     .jobs()
//!     .submit_file(&ModelRef::new("ed542963de", "1.0.1"), false, &inputs)
//!     .await?;
//! client
//!     .jobs()
//!     .block_until_complete(&job.job_identifier, modzy_client::jobs::DEFAULT_POLL_INTERVAL)
//!     .await?;
//! let result = client.results().get_result(&job.job_identifier).await?;
//! println!("{} of {} inputs completed", result.completed, result.total);
//! # Ok(())
//! # }
//! ```

pub mod accounting;
mod client;
pub mod config;
pub mod encoding;
pub mod error;
pub mod jobs;
pub mod models;
pub mod results;

pub use crate::client::*;
pub use config::{ModzyClientConfig, ModzyClientConfigBuilder};
pub use error::ModzyError;

pub use modzy_api::{ClientError, ModzyCredentials, schemas};
