use std::fmt::{Debug, Formatter};
use std::str::FromStr;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "MODZY_API_KEY";

/// Credentials to connect to the Modzy API
#[derive(Clone, PartialEq, Eq)]
pub struct ModzyCredentials {
    api_key: String,
}

impl ModzyCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Creates a new instance of `ModzyCredentials` from environment variables.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let api_key = std::env::var(API_KEY_ENV)?;
        Ok(Self::new(api_key))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Value of the `Authorization` header sent with every request.
    pub fn authorization_header(&self) -> String {
        format!("ApiKey {}", self.api_key)
    }
}

impl Debug for ModzyCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.api_key.chars().take(4).collect();
        f.debug_struct("ModzyCredentials")
            .field("api_key", &format!("{prefix}***"))
            .finish()
    }
}

impl FromStr for ModzyCredentials {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            Err("API key cannot be empty".to_string())
        } else {
            Ok(Self::new(s))
        }
    }
}
