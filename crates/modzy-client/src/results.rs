use modzy_api::schemas::ResultResponse;
use modzy_api::{Client, ClientError};

/// Results of finished jobs.
#[derive(Debug, Clone)]
pub struct ResultClient {
    client: Client,
}

impl ResultClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Result summary of a job, with per-input results and failures.
    pub async fn get_result(&self, job_identifier: &str) -> Result<ResultResponse, ClientError> {
        self.client.get_result(job_identifier).await
    }

    /// Raw content of the output `output_name` produced for input `input_key`.
    pub async fn get_output_bytes(
        &self,
        job_identifier: &str,
        input_key: &str,
        output_name: &str,
    ) -> Result<Vec<u8>, ClientError> {
        self.client
            .get_output_contents(job_identifier, input_key, output_name)
            .await
    }

    pub async fn get_output_json(
        &self,
        job_identifier: &str,
        input_key: &str,
        output_name: &str,
    ) -> Result<serde_json::Value, ClientError> {
        self.client
            .get_output_json(job_identifier, input_key, output_name)
            .await
    }
}
