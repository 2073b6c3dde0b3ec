use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use modzy_api::schemas::{
    EngineResponse, InputSources, JobHistoryParams, JobInputSchema, JobResponse, S3ObjectRef,
    SortDirection, SubmitJobRequest,
};
use modzy_api::{Client, ClientError};

use super::error::JobError;
use super::job::{Job, ModelRef};
use super::submit::{FileJobSubmitter, SubmitOptions};
use super::upload::JobInputs;
use crate::encoding::{file_to_data_url, to_data_url};

/// How far back job history goes when no start date is given.
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Wait between two status checks of [`JobClient::block_until_complete`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Access to an S3 bucket holding job inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsS3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

/// A database query whose rows are the job inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdbcSource {
    pub url: String,
    pub username: String,
    pub password: String,
    pub driver: String,
    pub query: String,
}

/// Job submission and tracking.
#[derive(Debug, Clone)]
pub struct JobClient {
    client: Client,
    submit_options: SubmitOptions,
}

impl JobClient {
    pub fn new(client: Client) -> Self {
        Self::with_submit_options(client, SubmitOptions::default())
    }

    pub fn with_submit_options(client: Client, submit_options: SubmitOptions) -> Self {
        Self {
            client,
            submit_options,
        }
    }

    async fn submit(
        &self,
        model: &ModelRef,
        explain: bool,
        input: JobInputSchema,
    ) -> Result<Job, JobError> {
        let request = SubmitJobRequest::with_input(model.into(), explain, input);
        let response = self.client.submit_job(&request).await?;
        log::info!("Submitted job {} on model {model}", response.job_identifier);
        Ok(Job::from_response(response, model, explain))
    }

    /// Submit text inputs, sent as they are.
    pub async fn submit_text(
        &self,
        model: &ModelRef,
        explain: bool,
        sources: InputSources<String>,
    ) -> Result<Job, JobError> {
        self.submit(model, explain, JobInputSchema::Text { sources })
            .await
    }

    /// Submit binary inputs embedded in the request as base64 data URLs.
    pub async fn submit_embedded(
        &self,
        model: &ModelRef,
        explain: bool,
        media_type: &str,
        sources: InputSources<Vec<u8>>,
    ) -> Result<Job, JobError> {
        let sources = map_sources(sources, |bytes| to_data_url(&bytes, media_type));
        self.submit(model, explain, JobInputSchema::Embedded { sources })
            .await
    }

    /// Read files and submit them embedded in the request as base64 data URLs.
    ///
    /// Use [`JobClient::submit_file`] for files too large to hold in one request.
    pub async fn submit_embedded_files(
        &self,
        model: &ModelRef,
        explain: bool,
        media_type: &str,
        sources: InputSources<PathBuf>,
    ) -> Result<Job, JobError> {
        let mut encoded = InputSources::new();
        for (slot, items) in sources {
            let slot = encoded.entry(slot).or_insert_with(Default::default);
            for (item, path) in items {
                let url = file_to_data_url(&path, media_type)
                    .await
                    .map_err(|source| JobError::Read { path, source })?;
                slot.insert(item, url);
            }
        }
        self.submit(model, explain, JobInputSchema::Embedded { sources: encoded })
            .await
    }

    /// Submit inputs stored in S3, read by the service with the given credentials.
    pub async fn submit_aws_s3(
        &self,
        model: &ModelRef,
        explain: bool,
        credentials: &AwsS3Credentials,
        sources: InputSources<S3ObjectRef>,
    ) -> Result<Job, JobError> {
        let input = JobInputSchema::AwsS3 {
            access_key_id: credentials.access_key_id.clone(),
            secret_access_key: credentials.secret_access_key.clone(),
            region: credentials.region.clone(),
            sources,
        };
        self.submit(model, explain, input).await
    }

    pub async fn submit_jdbc(
        &self,
        model: &ModelRef,
        explain: bool,
        source: &JdbcSource,
    ) -> Result<Job, JobError> {
        let input = JobInputSchema::Jdbc {
            url: source.url.clone(),
            username: source.username.clone(),
            password: source.password.clone(),
            driver: source.driver.clone(),
            query: source.query.clone(),
        };
        self.submit(model, explain, input).await
    }

    /// Submit inputs of any size by uploading them in chunks to an open job.
    ///
    /// See [`FileJobSubmitter`] for the protocol.
    pub async fn submit_file(
        &self,
        model: &ModelRef,
        explain: bool,
        inputs: &JobInputs,
    ) -> Result<Job, JobError> {
        FileJobSubmitter::with_options(self.client.clone(), self.submit_options)
            .submit(model, explain, inputs)
            .await
    }

    pub async fn get_job(&self, job_identifier: &str) -> Result<JobResponse, ClientError> {
        self.client.get_job(job_identifier).await
    }

    pub async fn cancel_job(&self, job_identifier: &str) -> Result<JobResponse, ClientError> {
        let job = self.client.cancel_job(job_identifier).await?;
        log::info!("Canceled job {job_identifier}");
        Ok(job)
    }

    /// Search past jobs. Unset sorting and paging fall back to the newest 100 jobs of the last
    /// [`DEFAULT_HISTORY_DAYS`] days.
    pub async fn get_history(
        &self,
        params: JobHistoryParams,
    ) -> Result<Vec<JobResponse>, ClientError> {
        let params = with_history_defaults(params, Utc::now());
        self.client.get_job_history(&params).await
    }

    /// Poll a job every `poll_interval` until it leaves the open, submitted and in progress
    /// states, then return its last record.
    pub async fn block_until_complete(
        &self,
        job_identifier: &str,
        poll_interval: Duration,
    ) -> Result<JobResponse, ClientError> {
        poll_until_settled(|| self.client.get_job(job_identifier), poll_interval).await
    }

    pub async fn get_processing_engines(&self) -> Result<Vec<EngineResponse>, ClientError> {
        self.client.get_processing_engines().await
    }
}

fn map_sources<V, W>(sources: InputSources<V>, mut f: impl FnMut(V) -> W) -> InputSources<W> {
    sources
        .into_iter()
        .map(|(slot, items)| {
            let items = items.into_iter().map(|(item, v)| (item, f(v))).collect();
            (slot, items)
        })
        .collect()
}

fn with_history_defaults(mut params: JobHistoryParams, now: DateTime<Utc>) -> JobHistoryParams {
    if params.start_date.is_none() {
        let start = now - chrono::Duration::days(DEFAULT_HISTORY_DAYS);
        params.start_date = Some(start.to_rfc3339_opts(SecondsFormat::Millis, true));
    }
    params.sort_by.get_or_insert_with(|| "createdAt".to_string());
    params.direction.get_or_insert(SortDirection::Desc);
    params.page.get_or_insert(1);
    params.per_page.get_or_insert(100);
    params
}

async fn poll_until_settled<F, Fut>(
    mut fetch: F,
    poll_interval: Duration,
) -> Result<JobResponse, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<JobResponse, ClientError>>,
{
    loop {
        tokio::time::sleep(poll_interval).await;
        let job = fetch().await?;
        match job.status {
            Some(status) if status.is_pending() => {
                log::debug!("Job {} is {status}, waiting", job.job_identifier);
            }
            status => {
                log::debug!("Job {} settled with status {status:?}", job.job_identifier);
                return Ok(job);
            }
        }
    }
}
