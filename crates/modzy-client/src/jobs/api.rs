use std::sync::Arc;

use async_trait::async_trait;
use modzy_api::schemas::{FeaturesResponse, JobResponse, SubmitJobRequest};
use modzy_api::{Client, ClientError};

/// The job endpoints driven by a chunked file submission.
///
/// [`Client`] is the production implementation; anything else (recorders, proxies) can be
/// plugged into a [`FileJobSubmitter`](crate::jobs::FileJobSubmitter).
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Submit a job. A request without inputs opens the job for chunked uploads.
    async fn submit_job(&self, request: &SubmitJobRequest) -> Result<JobResponse, ClientError>;

    async fn get_features(&self) -> Result<FeaturesResponse, ClientError>;

    async fn append_input_chunk(
        &self,
        job_identifier: &str,
        slot_key: &str,
        item_key: &str,
        chunk: Vec<u8>,
    ) -> Result<(), ClientError>;

    /// Close an open job. `None` means the service accepted the close without returning the job.
    async fn close_job(&self, job_identifier: &str) -> Result<Option<JobResponse>, ClientError>;

    async fn cancel_job(&self, job_identifier: &str) -> Result<JobResponse, ClientError>;
}

#[async_trait]
impl JobApi for Client {
    async fn submit_job(&self, request: &SubmitJobRequest) -> Result<JobResponse, ClientError> {
        Client::submit_job(self, request).await
    }

    async fn get_features(&self) -> Result<FeaturesResponse, ClientError> {
        self.get_job_features().await
    }

    async fn append_input_chunk(
        &self,
        job_identifier: &str,
        slot_key: &str,
        item_key: &str,
        chunk: Vec<u8>,
    ) -> Result<(), ClientError> {
        Client::append_input_chunk(self, job_identifier, slot_key, item_key, chunk).await
    }

    async fn close_job(&self, job_identifier: &str) -> Result<Option<JobResponse>, ClientError> {
        Client::close_job(self, job_identifier).await
    }

    async fn cancel_job(&self, job_identifier: &str) -> Result<JobResponse, ClientError> {
        Client::cancel_job(self, job_identifier).await
    }
}

#[async_trait]
impl<T: JobApi + ?Sized> JobApi for Arc<T> {
    async fn submit_job(&self, request: &SubmitJobRequest) -> Result<JobResponse, ClientError> {
        (**self).submit_job(request).await
    }

    async fn get_features(&self) -> Result<FeaturesResponse, ClientError> {
        (**self).get_features().await
    }

    async fn append_input_chunk(
        &self,
        job_identifier: &str,
        slot_key: &str,
        item_key: &str,
        chunk: Vec<u8>,
    ) -> Result<(), ClientError> {
        (**self)
            .append_input_chunk(job_identifier, slot_key, item_key, chunk)
            .await
    }

    async fn close_job(&self, job_identifier: &str) -> Result<Option<JobResponse>, ClientError> {
        (**self).close_job(job_identifier).await
    }

    async fn cancel_job(&self, job_identifier: &str) -> Result<JobResponse, ClientError> {
        (**self).cancel_job(job_identifier).await
    }
}
