use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::error::JobError;

/// The content of one job input: bytes already in memory, or a file read lazily while uploading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

impl InputSource {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        InputSource::Bytes(bytes.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        InputSource::File(path.into())
    }
}

impl From<Vec<u8>> for InputSource {
    fn from(bytes: Vec<u8>) -> Self {
        InputSource::Bytes(bytes)
    }
}

impl From<&[u8]> for InputSource {
    fn from(bytes: &[u8]) -> Self {
        InputSource::Bytes(bytes.to_vec())
    }
}

impl From<&str> for InputSource {
    fn from(text: &str) -> Self {
        InputSource::Bytes(text.as_bytes().to_vec())
    }
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        InputSource::File(path)
    }
}

impl From<&Path> for InputSource {
    fn from(path: &Path) -> Self {
        InputSource::File(path.to_path_buf())
    }
}

enum ChunkState<'a> {
    Memory { bytes: &'a [u8], cursor: usize },
    Unopened(PathBuf),
    Reading { path: PathBuf, file: File },
    Exhausted,
}

/// Single-pass cursor splitting an [`InputSource`] into chunks of at most `max_chunk_size` bytes.
///
/// Every chunk but the last is exactly `max_chunk_size` long and an empty source yields no chunk.
/// A file source opens its handle on the first pull and drops it once the end is reached; iterate
/// again by creating a new `ChunkSource`.
pub struct ChunkSource<'a> {
    max_chunk_size: usize,
    state: ChunkState<'a>,
}

impl<'a> ChunkSource<'a> {
    pub fn new(source: &'a InputSource, max_chunk_size: usize) -> Result<Self, JobError> {
        if max_chunk_size == 0 {
            return Err(JobError::InvalidChunkSize);
        }

        let state = match source {
            InputSource::Bytes(bytes) => ChunkState::Memory { bytes, cursor: 0 },
            InputSource::File(path) => ChunkState::Unopened(path.clone()),
        };

        Ok(Self {
            max_chunk_size,
            state,
        })
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Pull the next chunk, or `None` once the source is exhausted.
    ///
    /// A read failure ends the sequence: the error is returned and later pulls return `None`.
    pub async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, JobError> {
        loop {
            match std::mem::replace(&mut self.state, ChunkState::Exhausted) {
                ChunkState::Memory { bytes, cursor } => {
                    if cursor >= bytes.len() {
                        return Ok(None);
                    }
                    let end = cursor.saturating_add(self.max_chunk_size).min(bytes.len());
                    self.state = ChunkState::Memory { bytes, cursor: end };
                    return Ok(Some(bytes[cursor..end].to_vec()));
                }
                ChunkState::Unopened(path) => {
                    let file = File::open(&path)
                        .await
                        .map_err(|source| JobError::Read {
                            path: path.clone(),
                            source,
                        })?;
                    self.state = ChunkState::Reading { path, file };
                }
                ChunkState::Reading { path, mut file } => {
                    let chunk = read_bounded(&mut file, self.max_chunk_size)
                        .await
                        .map_err(|source| JobError::Read {
                            path: path.clone(),
                            source,
                        })?;
                    if chunk.is_empty() {
                        return Ok(None);
                    }
                    self.state = ChunkState::Reading { path, file };
                    return Ok(Some(chunk));
                }
                ChunkState::Exhausted => return Ok(None),
            }
        }
    }
}

/// Read from the current position until `limit` bytes are buffered or the file ends.
async fn read_bounded(file: &mut File, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut chunk = Vec::new();
    file.take(limit as u64).read_to_end(&mut chunk).await?;
    Ok(chunk)
}
