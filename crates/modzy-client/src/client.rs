use reqwest::Url;

use modzy_api::Client;

use crate::accounting::AccountingClient;
use crate::config::ModzyClientConfig;
use crate::error::ModzyError;
use crate::jobs::JobClient;
use crate::models::ModelClient;
use crate::results::ResultClient;

/// The ModzyClient is the entry point to the Modzy API.
///
/// Clones share one connection pool, and each clone can drive its own job submissions
/// concurrently with the others.
#[derive(Debug, Clone)]
pub struct ModzyClient {
    config: ModzyClientConfig,
    models: ModelClient,
    jobs: JobClient,
    results: ResultClient,
    accounting: AccountingClient,
}

impl ModzyClient {
    /// Create a new ModzyClient with the given configuration.
    pub fn create(config: ModzyClientConfig) -> Result<ModzyClient, ModzyError> {
        let endpoint = config.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ModzyError::InvalidConfig(
                "endpoint cannot be empty".to_string(),
            ));
        }
        let url: Url = endpoint
            .parse()
            .map_err(|e| ModzyError::InvalidConfig(format!("invalid endpoint {endpoint}: {e}")))?;

        let mut http_client = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            http_client = http_client.timeout(timeout);
        }
        let http_client = http_client
            .build()
            .map_err(|e| ModzyError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        let client = Client::with_http_client(http_client, url, config.credentials.clone())?;
        log::debug!("Created Modzy client for {}", client.base_url());

        Ok(ModzyClient {
            models: ModelClient::new(client.clone()),
            jobs: JobClient::with_submit_options(client.clone(), config.submit_options),
            results: ResultClient::new(client.clone()),
            accounting: AccountingClient::new(client),
            config,
        })
    }

    /// Create a client configured from `MODZY_API_KEY` and `MODZY_BASE_URL`.
    pub fn from_env() -> Result<ModzyClient, ModzyError> {
        Self::create(ModzyClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ModzyClientConfig {
        &self.config
    }

    pub fn models(&self) -> &ModelClient {
        &self.models
    }

    pub fn jobs(&self) -> &JobClient {
        &self.jobs
    }

    pub fn results(&self) -> &ResultClient {
        &self.results
    }

    pub fn accounting(&self) -> &AccountingClient {
        &self.accounting
    }
}
