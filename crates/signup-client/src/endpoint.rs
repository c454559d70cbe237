//! HTTP client for the registration endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde_json::Value;
use signup_spec::{RegistrationPayload, RemoteErrors};

use crate::config::ClientConfig;
use crate::error::SubmitError;

/// Successful registration response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acceptance {
    /// Route the server asked the client to continue at, if any.
    pub redirect: Option<String>,
}

/// Remote collaborator that accepts or rejects a registration.
#[async_trait]
pub trait RegistrationEndpoint: Send + Sync {
    async fn register(&self, payload: &RegistrationPayload) -> Result<Acceptance, SubmitError>;
}

/// Posts registrations as JSON.
pub struct HttpEndpoint {
    client: Client,
    url: String,
}

impl HttpEndpoint {
    pub fn new(config: &ClientConfig) -> Result<Self, SubmitError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.endpoint.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Map a non-success response to a `SubmitError`.
    async fn check_response(response: reqwest::Response) -> Result<Acceptance, SubmitError> {
        let status = response.status();
        let body = response.text().await?;
        let json = serde_json::from_str::<Value>(&body).ok();

        if status.is_success() {
            let redirect = json
                .as_ref()
                .and_then(|value| value.get("redirect"))
                .and_then(Value::as_str)
                .map(String::from);
            return Ok(Acceptance { redirect });
        }

        if status == StatusCode::UNPROCESSABLE_ENTITY
            && let Some(errors) = json.as_ref().and_then(RemoteErrors::from_body)
        {
            return Err(SubmitError::Rejected(errors));
        }

        Err(SubmitError::Status {
            status: status.as_u16(),
            body: extract_message(json.as_ref()).unwrap_or(body),
        })
    }
}

#[async_trait]
impl RegistrationEndpoint for HttpEndpoint {
    async fn register(&self, payload: &RegistrationPayload) -> Result<Acceptance, SubmitError> {
        let response = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;
        Self::check_response(response).await
    }
}

fn extract_message(json: Option<&Value>) -> Option<String> {
    json?.get("message")?.as_str().map(String::from)
}
