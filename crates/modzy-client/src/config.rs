use std::time::Duration;

use modzy_api::credentials::API_KEY_ENV;
use modzy_api::{DEFAULT_BASE_URL, ModzyCredentials};

use crate::error::ModzyError;
use crate::jobs::SubmitOptions;

/// Environment variable overriding the API endpoint.
pub const BASE_URL_ENV: &str = "MODZY_BASE_URL";

/// Configuration for the [ModzyClient](crate::ModzyClient). Can be created using [ModzyClientConfigBuilder], which is created using the [ModzyClientConfig::builder] method.
#[derive(Debug, Clone)]
pub struct ModzyClientConfig {
    /// The endpoint of the Modzy API, such as `https://app.modzy.com/api/`
    pub endpoint: String,
    /// API key sent with every request
    pub credentials: ModzyCredentials,
    /// Timeout of a single request. `None` waits as long as the connection stays up.
    pub timeout: Option<Duration>,
    /// Settings of chunked file submissions
    pub submit_options: SubmitOptions,
}

impl ModzyClientConfig {
    /// Create a new [ModzyClientConfigBuilder] with the given credentials.
    pub fn builder(credentials: ModzyCredentials) -> ModzyClientConfigBuilder {
        ModzyClientConfigBuilder::new(credentials)
    }

    /// Read the API key from `MODZY_API_KEY` and the endpoint from `MODZY_BASE_URL`, if set.
    pub fn from_env() -> Result<Self, ModzyError> {
        let credentials = ModzyCredentials::from_env().map_err(|e| {
            ModzyError::InvalidConfig(format!("{API_KEY_ENV} is not usable: {e}"))
        })?;
        let mut builder = Self::builder(credentials);
        if let Ok(endpoint) = std::env::var(BASE_URL_ENV) {
            builder = builder.with_endpoint(endpoint);
        }
        Ok(builder.build())
    }
}

/// Builder for the ModzyClientConfig
pub struct ModzyClientConfigBuilder {
    config: ModzyClientConfig,
}

impl ModzyClientConfigBuilder {
    pub(crate) fn new(credentials: ModzyCredentials) -> ModzyClientConfigBuilder {
        ModzyClientConfigBuilder {
            config: ModzyClientConfig {
                endpoint: DEFAULT_BASE_URL.into(),
                credentials,
                timeout: None,
                submit_options: SubmitOptions::default(),
            },
        }
    }

    /// Set the endpoint of the Modzy API
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> ModzyClientConfigBuilder {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the timeout of every request
    pub fn with_timeout(mut self, timeout: Duration) -> ModzyClientConfigBuilder {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set how file jobs are uploaded
    pub fn with_submit_options(mut self, options: SubmitOptions) -> ModzyClientConfigBuilder {
        self.config.submit_options = options;
        self
    }

    /// Build the ModzyClientConfig
    pub fn build(self) -> ModzyClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::EmptyInputPolicy;

    #[test]
    fn builder_defaults_to_the_hosted_api() {
        let config = ModzyClientConfig::builder(ModzyCredentials::new("key")).build();
        assert_eq!(config.endpoint, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, None);
        assert_eq!(config.submit_options, SubmitOptions::default());
    }

    #[test]
    fn builder_overrides() {
        let options = SubmitOptions::default()
            .with_empty_inputs(EmptyInputPolicy::SendEmptyChunk)
            .with_chunk_size(4096);
        let config = ModzyClientConfig::builder(ModzyCredentials::new("key"))
            .with_endpoint("https://modzy.example.com/api")
            .with_timeout(Duration::from_secs(30))
            .with_submit_options(options)
            .build();

        assert_eq!(config.endpoint, "https://modzy.example.com/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.submit_options.chunk_size_override, Some(4096));
        assert_eq!(config.credentials.api_key(), "key");
    }
}
