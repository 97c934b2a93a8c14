// converse-core/src/api.rs

//! Sends one Converse request to Bedrock Runtime and decodes the reply.

use crate::config::{Auth, ClientConfig};
use crate::errors::{ConverseError, Result, ServiceError, ServiceErrorKind};
use crate::models::payload::Payload;
use crate::models::response::ConverseResponse;
use crate::signing::{SigningScope, sign_request};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::provider::error::CredentialsError;
use reqwest::{Client, header};
use serde_json::{Map, Value, json};
use std::time::SystemTime;
use tracing::{debug, error, info, trace, warn};
use url::Url;

/// SigV4 service name for Bedrock Runtime.
const SIGNING_SERVICE: &str = "bedrock";

pub struct ConverseClient {
    http: Client,
    config: ClientConfig,
}

impl ConverseClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(Client::new(), config)
    }

    pub fn with_http_client(http: Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `{endpoint}/model/{model id}/converse`, with the model id percent-encoded.
    pub fn converse_url(&self) -> Result<Url> {
        let base = self.config.endpoint.as_str().trim_end_matches('/');
        let url_str = format!("{}/model/{}/converse", base, urlencoding::encode(&self.config.model_id));
        Url::parse(&url_str)
            .map_err(|e| ConverseError::Config(format!("Invalid request URL '{}': {}", url_str, e)))
    }

    /// Sends the payload and returns the decoded response. Exactly one request is
    /// made; errors are not retried.
    pub async fn converse(&self, payload: &Payload) -> Result<ConverseResponse> {
        let url = self.converse_url()?;
        let body = build_request_body(payload);
        let body_bytes = serde_json::to_vec(&body)
            .map_err(|e| ConverseError::Config(format!("Failed to serialize request: {}", e)))?;

        debug!(
            "Request URL: {}\nRequest JSON: {}",
            url,
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let mut request = self
            .http
            .post(url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");

        match &self.config.auth {
            Auth::BearerToken(token) => {
                request = request.bearer_auth(token);
            }
            Auth::Sigv4(provider) => match provider.provide_credentials().await {
                Ok(credentials) => {
                    let scope = SigningScope {
                        region: &self.config.region,
                        service: SIGNING_SERVICE,
                        time: SystemTime::now(),
                    };
                    let signed = sign_request(
                        &credentials,
                        &scope,
                        "POST",
                        &url,
                        &[("content-type", "application/json")],
                        &body_bytes,
                    )?;
                    for (name, value) in signed {
                        request = request.header(name.as_str(), value.as_str());
                    }
                }
                // Let the service report the missing authentication.
                Err(CredentialsError::CredentialsNotLoaded(_)) => {
                    warn!("No AWS credentials found; sending the request unsigned");
                }
                Err(e) => {
                    error!("Failed to load AWS credentials: {}", e);
                    return Err(ConverseError::Credentials(e));
                }
            },
        }

        info!(model_id = %self.config.model_id, "Calling Converse API");
        let response = request.body(body_bytes).send().await.map_err(|e| {
            error!("Network error sending Converse request: {}", e);
            ConverseError::Network(e)
        })?;

        let status = response.status();
        let error_type = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());
        let request_id = response
            .headers()
            .get("x-amzn-requestid")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());
        let response_text = response.text().await.map_err(ConverseError::Network)?;
        trace!(status = %status, request_id = ?request_id, body = %response_text, "Converse API reply");

        if !status.is_success() {
            let err = service_error(status.as_u16(), error_type.as_deref(), &response_text);
            debug!(
                "API request failed. Status: {}, Request ID: {:?}, Body: {}",
                status, request_id, response_text
            );
            return Err(ConverseError::Service(err));
        }

        serde_json::from_str::<ConverseResponse>(&response_text).map_err(|e| {
            ConverseError::InvalidResponse(format!("{} (body: {})", e, response_text))
        })
    }
}

/// The request envelope: `messages` always; `inferenceConfig` always, falling
/// back to the defaults; `system` and `toolConfig` only when non-empty.
pub fn build_request_body(payload: &Payload) -> Value {
    let mut request_map = Map::new();
    request_map.insert("messages".to_string(), json!(payload.messages));
    request_map.insert(
        "inferenceConfig".to_string(),
        json!(payload.effective_inference_config()),
    );
    if !payload.system.is_empty() {
        request_map.insert("system".to_string(), json!(payload.system));
    }
    if let Some(tool_config) = payload.tool_config.as_ref().filter(|tc| !tc.is_empty()) {
        request_map.insert("toolConfig".to_string(), json!(tool_config));
    }
    if let Some(extra) = &payload.additional_model_request_fields {
        request_map.insert("additionalModelRequestFields".to_string(), extra.clone());
    }
    Value::Object(request_map)
}

/// Builds a `ServiceError` from an error reply. The code comes from the
/// `x-amzn-ErrorType` header or the body's `__type`, minus any `:`/`#` qualifier.
fn service_error(status: u16, error_type: Option<&str>, body: &str) -> ServiceError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let body_type = parsed
        .as_ref()
        .and_then(|v| v.get("__type"))
        .and_then(Value::as_str);
    let code = error_type.or(body_type).map(short_error_code);
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("Message")))
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "no error message returned".to_string()
            } else {
                body.trim().to_string()
            }
        });

    ServiceError {
        kind: ServiceErrorKind::classify(code.as_deref(), status),
        status,
        code,
        message,
    }
}

fn short_error_code(raw: &str) -> String {
    let without_suffix = raw.split(':').next().unwrap_or(raw);
    without_suffix
        .rsplit('#')
        .next()
        .unwrap_or(without_suffix)
        .to_string()
}
