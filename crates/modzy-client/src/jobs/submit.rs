use modzy_api::schemas::{JobResponse, JobStatus, SubmitJobRequest};

use super::api::JobApi;
use super::error::JobError;
use super::features::negotiate_chunk_size;
use super::job::{Job, ModelRef};
use super::upload::{EmptyInputPolicy, JobInputs, upload_all_inputs};

/// Settings of chunked file submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    pub empty_inputs: EmptyInputPolicy,
    /// Fixed chunk size in bytes. When set, the service limit is not queried.
    pub chunk_size_override: Option<u64>,
}

impl SubmitOptions {
    pub fn with_empty_inputs(mut self, policy: EmptyInputPolicy) -> Self {
        self.empty_inputs = policy;
        self
    }

    /// A zero size is ignored and the limit is negotiated as usual.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size_override = (chunk_size > 0).then_some(chunk_size);
        self
    }
}

/// Submits jobs whose inputs are streamed to the service in chunks.
///
/// A submission opens a job without inputs, uploads every input chunk by chunk under the
/// negotiated size limit, then closes the job so processing starts. When the upload or the
/// close fails the job is canceled on a best-effort basis and the failure that caused it is
/// returned. A close answered without a job record counts as success.
pub struct FileJobSubmitter<A> {
    api: A,
    options: SubmitOptions,
}

impl<A: JobApi> FileJobSubmitter<A> {
    pub fn new(api: A) -> Self {
        Self::with_options(api, SubmitOptions::default())
    }

    pub fn with_options(api: A, options: SubmitOptions) -> Self {
        Self { api, options }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn options(&self) -> &SubmitOptions {
        &self.options
    }

    pub async fn submit(
        &self,
        model: &ModelRef,
        explain: bool,
        inputs: &JobInputs,
    ) -> Result<Job, JobError> {
        let request = SubmitJobRequest::open(model.into(), explain);
        let opened = self
            .api
            .submit_job(&request)
            .await
            .map_err(JobError::Open)?;
        let job_identifier = opened.job_identifier;
        log::info!("Opened job {job_identifier} on model {model}");

        match self.upload_and_close(&job_identifier, inputs).await {
            Ok(closed) => {
                let job = Job {
                    job_identifier,
                    status: closed
                        .and_then(|job| job.status)
                        .unwrap_or(JobStatus::Submitted),
                    model: model.clone(),
                    explain,
                };
                log::info!("Closed job {}, status {}", job.job_identifier, job.status);
                Ok(job)
            }
            Err(e) => {
                log::error!("Submission of job {job_identifier} failed: {e}");
                self.abort(&job_identifier).await;
                Err(e)
            }
        }
    }

    async fn upload_and_close(
        &self,
        job_identifier: &str,
        inputs: &JobInputs,
    ) -> Result<Option<JobResponse>, JobError> {
        let chunk_size = self.chunk_size().await;
        let summary = upload_all_inputs(
            &self.api,
            job_identifier,
            inputs,
            chunk_size,
            self.options.empty_inputs,
        )
        .await?;
        log::info!(
            "Uploaded {} input(s) to job {job_identifier} in {} chunk(s), {} bytes",
            summary.items,
            summary.chunks,
            summary.bytes
        );

        self.api
            .close_job(job_identifier)
            .await
            .map_err(|source| JobError::Close {
                job_identifier: job_identifier.to_string(),
                source,
            })
    }

    async fn chunk_size(&self) -> usize {
        let size = match self.options.chunk_size_override {
            Some(size) if size > 0 => size,
            _ => negotiate_chunk_size(&self.api).await,
        };
        usize::try_from(size).unwrap_or(usize::MAX)
    }

    async fn abort(&self, job_identifier: &str) {
        match self.api.cancel_job(job_identifier).await {
            Ok(_) => log::info!("Canceled job {job_identifier}"),
            Err(e) => log::warn!("Failed to cancel job {job_identifier}: {e}"),
        }
    }
}
