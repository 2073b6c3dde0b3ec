//! Job submission and tracking.
//!
//! Plain submissions (text, embedded, S3, JDBC) are single requests. File submissions go through
//! [`FileJobSubmitter`], which opens a job, streams every input in chunks no larger than the
//! limit advertised by the service, then closes the job.

pub mod api;
pub mod chunks;
mod client;
pub mod error;
pub mod features;
mod job;
pub mod submit;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use api::JobApi;
pub use chunks::{ChunkSource, InputSource};
pub use client::{
    AwsS3Credentials, DEFAULT_HISTORY_DAYS, DEFAULT_POLL_INTERVAL, JdbcSource, JobClient,
};
pub use error::JobError;
pub use features::{DEFAULT_INPUT_CHUNK_MAXIMUM_SIZE, negotiate_chunk_size, parse_human_size};
pub use job::{Job, ModelRef};
pub use submit::{FileJobSubmitter, SubmitOptions};
pub use upload::{EmptyInputPolicy, InputSlot, JobInputs, UploadSummary, upload_all_inputs};
