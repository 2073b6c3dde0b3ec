use std::path::PathBuf;

use modzy_api::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Failed to open job: {0}")]
    Open(#[source] ClientError),
    #[error("Failed to upload chunk {chunk} of input {slot}/{item} of job {job_identifier}: {source}")]
    ChunkUpload {
        job_identifier: String,
        slot: String,
        item: String,
        /// Position of the rejected chunk within its item, starting at 1.
        chunk: usize,
        #[source]
        source: ClientError,
    },
    #[error("Failed to close job {job_identifier}: {source}")]
    Close {
        job_identifier: String,
        #[source]
        source: ClientError,
    },
    #[error("Failed to read input {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Chunk size must be greater than zero")]
    InvalidChunkSize,
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl JobError {
    /// The API error behind this failure, if it came from a request.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            JobError::Open(source)
            | JobError::ChunkUpload { source, .. }
            | JobError::Close { source, .. }
            | JobError::Client(source) => Some(source),
            JobError::Read { .. } | JobError::InvalidChunkSize => None,
        }
    }
}
