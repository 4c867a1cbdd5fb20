//! Live check of service-account credentials.
//!
//! The probe exchanges a signed JWT for an OAuth2 access token and then
//! lists at most one Cloud Storage bucket in the key's project. Nothing is
//! retried: one attempt, bounded by the configured timeout.
//!
//! Both endpoints come from configuration. A key file may name its own
//! `token_uri`, but it must share the configured token endpoint's origin;
//! anything else is refused before a request leaves the process.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::document::ServiceAccountKey;

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token request: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token_uri '{0}' does not match the configured token endpoint")]
    UntrustedTokenUri(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint rejected credentials ({status}): {message}")]
    TokenRejected { status: u16, message: String },

    #[error("storage API rejected request ({status}): {message}")]
    StorageRejected { status: u16, message: String },

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
}

/// Confirms that credentials can reach the cloud API.
#[async_trait]
pub trait IdentityProbe: Send + Sync {
    async fn probe(&self, key: &ServiceAccountKey) -> Result<(), ProbeError>;
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct BucketList {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Probes credentials against the Cloud Storage JSON API.
pub struct GcsProbe {
    client: reqwest::Client,
    token_endpoint: String,
    token_origin: url::Origin,
    storage_endpoint: String,
    timeout: Duration,
}

impl GcsProbe {
    pub fn new(
        token_endpoint: impl Into<String>,
        storage_endpoint: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let token_endpoint = token_endpoint.into();
        let token_origin = url::Url::parse(&token_endpoint)
            .with_context(|| format!("invalid token endpoint: {token_endpoint}"))?
            .origin();

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(Duration::from_secs(5).min(timeout))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            token_endpoint,
            token_origin,
            storage_endpoint: storage_endpoint.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// A `token_uri` from the key file is accepted only when it points at
    /// the configured token endpoint's scheme, host and port.
    fn check_token_uri(&self, key: &ServiceAccountKey) -> Result<(), ProbeError> {
        let Some(uri) = key.token_uri.as_deref() else {
            return Ok(());
        };
        match url::Url::parse(uri) {
            Ok(parsed) if parsed.origin() == self.token_origin => Ok(()),
            _ => Err(ProbeError::UntrustedTokenUri(truncate(uri))),
        }
    }

    async fn fetch_access_token(&self, key: &ServiceAccountKey) -> Result<String, ProbeError> {
        let assertion = sign_assertion(key, &self.token_endpoint, chrono::Utc::now().timestamp())?;
        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .client
            .post(self.token_endpoint.as_str())
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                },
                Err(_) => truncate(&body),
            };
            return Err(ProbeError::TokenRejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<TokenResponse>().await?.access_token)
    }

    async fn list_one_bucket(
        &self,
        key: &ServiceAccountKey,
        access_token: &str,
    ) -> Result<usize, ProbeError> {
        let url = format!("{}/storage/v1/b", self.storage_endpoint);
        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(access_token)
            .query(&[("project", key.project_id.as_str()), ("maxResults", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| truncate(&body));
            return Err(ProbeError::StorageRejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<BucketList>().await?.items.len())
    }
}

#[async_trait]
impl IdentityProbe for GcsProbe {
    async fn probe(&self, key: &ServiceAccountKey) -> Result<(), ProbeError> {
        self.check_token_uri(key)?;

        let exchange = async {
            let token = self.fetch_access_token(key).await?;
            self.list_one_bucket(key, &token).await
        };

        let buckets = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))??;

        tracing::debug!(
            project_id = %key.project_id,
            buckets,
            "credential probe succeeded"
        );
        Ok(())
    }
}

/// Signs the RS256 assertion for the JWT-bearer grant.
fn sign_assertion(key: &ServiceAccountKey, audience: &str, iat: i64) -> Result<String, ProbeError> {
    let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(ProbeError::InvalidPrivateKey)?;

    let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
    header.kid = Some(key.private_key_id.clone());

    let claims = Claims {
        iss: &key.client_email,
        scope: CLOUD_PLATFORM_SCOPE,
        aud: audience,
        exp: iat + 3600,
        iat,
    };
    jsonwebtoken::encode(&header, &claims, &encoding_key).map_err(ProbeError::Signing)
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}
