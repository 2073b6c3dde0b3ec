//! In-memory [`JobApi`] recording every call, used by the job submission tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use modzy_api::ClientError;
use modzy_api::schemas::{FeaturesResponse, JobResponse, SubmitJobRequest};
use reqwest::StatusCode;
use serde_json::json;

use super::api::JobApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Submit {
        model: String,
        version: String,
        explain: bool,
        with_input: bool,
    },
    Features,
    Chunk {
        job: String,
        slot: String,
        item: String,
        len: usize,
    },
    Close(String),
    Cancel(String),
}

pub struct RecordingApi {
    job_identifier: String,
    opening: Mutex<VecDeque<String>>,
    features: Option<serde_json::Value>,
    fail_open: bool,
    fail_chunk_at: Option<usize>,
    fail_close: bool,
    close_without_record: bool,
    fail_cancel: bool,
    calls: Mutex<Vec<Call>>,
    chunks: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingApi {
    pub fn new(job_identifier: &str) -> Self {
        Self {
            job_identifier: job_identifier.to_string(),
            opening: Mutex::new(VecDeque::new()),
            features: Some(json!({ "inputChunkMaximumSize": "1Mi" })),
            fail_open: false,
            fail_chunk_at: None,
            fail_close: false,
            close_without_record: false,
            fail_cancel: false,
            calls: Mutex::new(Vec::new()),
            chunks: Mutex::new(Vec::new()),
        }
    }

    /// Hand out these job identifiers in turn, one per opened job.
    pub fn opening_jobs(self, job_identifiers: &[&str]) -> Self {
        self.opening
            .lock()
            .unwrap()
            .extend(job_identifiers.iter().map(|id| id.to_string()));
        self
    }

    pub fn with_features(mut self, features: serde_json::Value) -> Self {
        self.features = Some(features);
        self
    }

    pub fn failing_features(mut self) -> Self {
        self.features = None;
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Reject the chunk with this zero-based index, counted across the whole job.
    pub fn failing_chunk(mut self, index: usize) -> Self {
        self.fail_chunk_at = Some(index);
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Accept the close but answer without a job record.
    pub fn closing_without_record(mut self) -> Self {
        self.close_without_record = true;
        self
    }

    pub fn failing_cancel(mut self) -> Self {
        self.fail_cancel = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Bytes of every accepted chunk, in upload order.
    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.chunks
            .lock()
            .unwrap()
            .iter()
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }

    /// Bytes of the accepted chunks of one job, in upload order.
    pub fn chunks_of(&self, job_identifier: &str) -> Vec<Vec<u8>> {
        self.chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|(job, _)| job == job_identifier)
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }

    pub fn chunk_lengths(&self) -> Vec<usize> {
        self.chunks().iter().map(Vec::len).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn job(job_identifier: &str, status: &str) -> JobResponse {
        serde_json::from_value(json!({
            "jobIdentifier": job_identifier,
            "status": status,
            "model": { "identifier": "ed542963de", "version": "1.0.1" },
        }))
        .unwrap()
    }
}

#[async_trait]
impl JobApi for RecordingApi {
    async fn submit_job(&self, request: &SubmitJobRequest) -> Result<JobResponse, ClientError> {
        self.record(Call::Submit {
            model: request.model.identifier.clone(),
            version: request.model.version.clone(),
            explain: request.explain,
            with_input: request.input.is_some(),
        });
        if self.fail_open {
            return Err(ClientError::from_status(
                StatusCode::BAD_REQUEST,
                r#"{"statusCode":400,"message":"The model version is not active"}"#,
            ));
        }
        let job_identifier = self
            .opening
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.job_identifier.clone());
        Ok(Self::job(&job_identifier, "OPEN"))
    }

    async fn get_features(&self) -> Result<FeaturesResponse, ClientError> {
        self.record(Call::Features);
        match &self.features {
            Some(features) => Ok(features.as_object().cloned().unwrap_or_default()),
            None => Err(ClientError::Transport("connection refused".to_string())),
        }
    }

    async fn append_input_chunk(
        &self,
        job_identifier: &str,
        slot_key: &str,
        item_key: &str,
        chunk: Vec<u8>,
    ) -> Result<(), ClientError> {
        // Give concurrent submissions a chance to interleave.
        tokio::task::yield_now().await;
        let index = self
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::Chunk { .. }))
            .count();
        self.record(Call::Chunk {
            job: job_identifier.to_string(),
            slot: slot_key.to_string(),
            item: item_key.to_string(),
            len: chunk.len(),
        });
        if self.fail_chunk_at == Some(index) {
            return Err(ClientError::from_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                "chunk rejected",
            ));
        }
        self.chunks
            .lock()
            .unwrap()
            .push((job_identifier.to_string(), chunk));
        Ok(())
    }

    async fn close_job(&self, job_identifier: &str) -> Result<Option<JobResponse>, ClientError> {
        self.record(Call::Close(job_identifier.to_string()));
        if self.fail_close {
            return Err(ClientError::from_status(
                StatusCode::CONFLICT,
                r#"{"statusCode":409,"message":"Job is not open"}"#,
            ));
        }
        if self.close_without_record {
            return Ok(None);
        }
        Ok(Some(Self::job(job_identifier, "SUBMITTED")))
    }

    async fn cancel_job(&self, job_identifier: &str) -> Result<JobResponse, ClientError> {
        self.record(Call::Cancel(job_identifier.to_string()));
        if self.fail_cancel {
            return Err(ClientError::Transport("cancel timed out".to_string()));
        }
        Ok(Self::job(job_identifier, "CANCELED"))
    }
}
