use reqwest::Client;
use std::env;
use std::error::Error;
use std::fmt;

use crate::catalog::RecipeRecord;

#[derive(Debug)]
pub enum StoreError {
    MissingToken(String),
    NetworkError(reqwest::Error),
    DecodeError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::MissingToken(env_var) => {
                write!(f, "Store token not found in environment: {}", env_var)
            }
            StoreError::NetworkError(err) => write!(f, "Network error: {}", err),
            StoreError::DecodeError(err) => write!(f, "Decode error: {}", err),
            StoreError::ApiError { status, error_body } => {
                write!(f, "Store API error {}: {}", status, error_body)
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::NetworkError(err) => Some(err),
            StoreError::DecodeError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::NetworkError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::DecodeError(err)
    }
}

/// HTTP-backed recipe store. Fetches the full recipe list as JSON once at
/// startup; the engine never touches the network per swipe.
pub struct RemoteStore {
    client: Client,
    base_url: String,
    token_env_var: Option<String>,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token_env_var: None,
        }
    }

    /// Sends a bearer token read from the named environment variable on
    /// every request. The variable is resolved at call time, not at
    /// construction.
    pub fn with_token_env(mut self, env_var: impl Into<String>) -> Self {
        self.token_env_var = Some(env_var.into());
        self
    }

    fn recipes_url(&self) -> String {
        format!("{}/recipes", self.base_url.trim_end_matches('/'))
    }

    pub async fn fetch_all(&self) -> Result<Vec<RecipeRecord>, StoreError> {
        let mut request = self.client.get(self.recipes_url());

        if let Some(env_var) = &self.token_env_var {
            let token = env::var(env_var)
                .map_err(|_| StoreError::MissingToken(env_var.clone()))?;
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            return Err(StoreError::ApiError { status, error_body });
        }

        let body = response.text().await?;
        let records: Vec<RecipeRecord> = serde_json::from_str(&body)?;
        Ok(records)
    }
}
