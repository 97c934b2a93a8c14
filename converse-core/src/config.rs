// converse-core/src/config.rs

//! Runtime settings for the Converse client, read from the process environment
//! (after `.env` loading). AWS credentials come from the SDK's default provider
//! chain: environment, shared config and credentials files, SSO,
//! `credential_process`, web identity, container and instance roles.

use crate::errors::{ConverseError, Result};
use aws_config::profile::profile_file::ProfileFiles;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;
use std::fmt;
use tracing::{debug, info};
use url::Url;

/// Model used when `BEDROCK_MODEL_ID` is unset.
pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-3-7-sonnet-20250219-v1:0";
pub const DEFAULT_REGION: &str = "us-east-1";

/// How requests are authenticated.
#[derive(Clone)]
pub enum Auth {
    /// Bedrock API key, sent as a bearer token.
    BearerToken(String),
    /// SigV4 with credentials resolved per request.
    Sigv4(SharedCredentialsProvider),
}

impl Auth {
    /// SigV4 with fixed access keys.
    pub fn from_keys(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            session_token,
            None,
            "converse",
        );
        Auth::Sigv4(SharedCredentialsProvider::new(credentials))
    }
}

// Never print the bearer token.
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
            Auth::Sigv4(provider) => f.debug_tuple("Sigv4").field(provider).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub region: String,
    pub model_id: String,
    pub endpoint: Url,
    pub auth: Auth,
}

impl ClientConfig {
    /// Builds the configuration from the process environment and the default
    /// AWS shared config files.
    pub async fn from_env() -> Result<Self> {
        Self::load(|key| std::env::var(key).ok(), None).await
    }

    /// Builds the configuration from an arbitrary variable lookup. When given,
    /// `profile_files` replaces `~/.aws/config` and `~/.aws/credentials` for
    /// profile-based credentials.
    ///
    /// Credentials are not resolved here; a missing or rejected set surfaces
    /// when the request is made.
    pub async fn load<F>(lookup: F, profile_files: Option<ProfileFiles>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let region = var("AWS_REGION")
            .or_else(|| var("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let model_id = var("BEDROCK_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        let endpoint_str = var("AWS_ENDPOINT_URL_BEDROCK_RUNTIME")
            .or_else(|| var("AWS_ENDPOINT_URL"))
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", region));
        let endpoint = Url::parse(&endpoint_str).map_err(|e| {
            ConverseError::Config(format!("Invalid endpoint URL '{}': {}", endpoint_str, e))
        })?;
        if endpoint.host_str().is_none() {
            return Err(ConverseError::Config(format!(
                "Endpoint URL '{}' has no host",
                endpoint_str
            )));
        }

        let auth = match var("AWS_BEARER_TOKEN_BEDROCK") {
            Some(token) => {
                debug!("Using Bedrock API key from AWS_BEARER_TOKEN_BEDROCK");
                Auth::BearerToken(token)
            }
            None => {
                let provider =
                    default_credentials_provider(&region, var("AWS_PROFILE"), profile_files).await?;
                Auth::Sigv4(provider)
            }
        };
        info!(region = %region, model_id = %model_id, endpoint = %endpoint, "Resolved client configuration");

        Ok(ClientConfig {
            region,
            model_id,
            endpoint,
            auth,
        })
    }
}

async fn default_credentials_provider(
    region: &str,
    profile: Option<String>,
    profile_files: Option<ProfileFiles>,
) -> Result<SharedCredentialsProvider> {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
    if let Some(profile) = profile {
        debug!(profile = %profile, "Using AWS profile");
        loader = loader.profile_name(profile);
    }
    if let Some(files) = profile_files {
        loader = loader.profile_files(files);
    }
    loader
        .load()
        .await
        .credentials_provider()
        .ok_or_else(|| ConverseError::Config("AWS configuration has no credentials provider".to_string()))
}
