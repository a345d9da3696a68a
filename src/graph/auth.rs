use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Missing credential in environment: {0}")]
    MissingCredential(String),
    #[error("Failed to get access token: {0}")]
    TokenRejected(String),
}

/// Client-credentials grant against the identity provider's tenant endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, AuthError> {
        Ok(Self {
            client_id: env_var("CLIENT_ID")?,
            client_secret: env_var("CLIENT_SECRET")?,
            tenant_id: env_var("TENANT_ID")?,
        })
    }
}

fn env_var(name: &str) -> Result<String, AuthError> {
    std::env::var(name).map_err(|_| AuthError::MissingCredential(name.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn new(access_token: String, expires_in_seconds: i64) -> Self {
        Self {
            access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in_seconds),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }

    pub fn needs_refresh(&self) -> bool {
        let buffer = chrono::Duration::minutes(5);
        self.expires_at <= Utc::now() + buffer
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

pub struct GraphAuthenticator {
    base_url: String,
    credentials: Credentials,
    client: reqwest::Client,
    cached: Option<TokenInfo>,
}

impl GraphAuthenticator {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: "https://login.microsoftonline.com".to_string(),
            credentials,
            client: reqwest::Client::new(),
            cached: None,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Returns a cached token while it has comfortable life left, otherwise
    /// fetches a fresh one.
    pub async fn get_valid_token(&mut self) -> Result<String, AuthError> {
        if let Some(token) = &self.cached {
            if !token.needs_refresh() {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        self.cached = Some(token);
        Ok(access_token)
    }

    async fn fetch_token(&self) -> Result<TokenInfo, AuthError> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.base_url, self.credentials.tenant_id
        );

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", "https://graph.microsoft.com/.default"),
        ];

        let response = self.client.post(&url).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Token request failed. Status: {}, Body: {}", status, body);
            return Err(AuthError::TokenRejected(format!("Status {}: {}", status, body)));
        }

        let token_response: TokenResponse = response.json().await?;
        tracing::info!("Access token retrieved successfully");

        Ok(TokenInfo::new(
            token_response.access_token,
            token_response.expires_in,
        ))
    }
}
