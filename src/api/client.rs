//! Client for one external system (ERP or eCommerce).
//!
//! Every data operation follows the same sequence: load credentials,
//! authenticate for a fresh bearer token, issue exactly one request, and
//! treat anything but HTTP 200 as a rejection.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::auth::token::AuthResponse;
use crate::auth::{AuthToken, Credentials};
use crate::config::SystemConfig;

use super::error::{truncate_body, ClientError, Outcome, Rejection, Stage};

/// Client for a single external system.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct SystemClient {
    client: Client,
    system: SystemConfig,
}

impl SystemClient {
    /// Create a client for the given system. Fails if the base URL does not
    /// parse, so misconfiguration surfaces before any credentials are read.
    pub fn new(system: SystemConfig) -> Result<Self, ClientError> {
        reqwest::Url::parse(&system.base_url).map_err(|e| {
            ClientError::InvalidConfig(format!(
                "{} base URL {:?}: {}",
                system.name, system.base_url, e
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(system.timeout_secs))
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self { client, system })
    }

    pub fn name(&self) -> &str {
        &self.system.name
    }

    /// Read the system's credentials. No network access happens here.
    pub fn load_credentials(&self) -> Result<Credentials, ClientError> {
        match self.system.credentials.load(self.system.credential_shape) {
            Ok(credentials) => {
                info!(system = %self.system.name, source = %self.system.credentials, "Credentials loaded");
                Ok(credentials)
            }
            Err(e) => {
                error!(system = %self.system.name, source = %self.system.credentials, error = %format!("{:#}", e), "Error loading credentials");
                Err(ClientError::CredentialsUnavailable {
                    system: self.system.name.clone(),
                    reason: format!("{:#}", e),
                })
            }
        }
    }

    /// Exchange the stored credentials for a bearer token.
    ///
    /// A non-200 reply, or a 200 reply without a non-empty `token`, is a
    /// rejection. Transport failures and undecodable replies are errors.
    pub async fn authenticate(&self) -> Result<Outcome<AuthToken>, ClientError> {
        let credentials = self.load_credentials()?;
        let url = self.system.url(&self.system.endpoints.auth);

        let response = self
            .client
            .post(&url)
            .json(&credentials.auth_body())
            .send()
            .await
            .map_err(|e| self.transport_error("authentication", &url, e))?;

        let response = match self.check_response(Stage::Authentication, &url, response).await {
            Ok(response) => response,
            Err(rejection) => return Ok(Outcome::Rejected(rejection)),
        };

        let body = self.read_body("authentication", &url, response).await?;
        let auth: AuthResponse = serde_json::from_str(&body)
            .map_err(|e| self.invalid_response("authentication", &url, e))?;

        match auth.into_token() {
            Some(token) => {
                info!(system = %self.system.name, "Authenticated successfully");
                Ok(Outcome::Done(token))
            }
            None => {
                error!(system = %self.system.name, body = %truncate_body(&body), "Authentication reply did not contain a token");
                Ok(Outcome::Rejected(Rejection::from_status(
                    Stage::Authentication,
                    StatusCode::OK,
                    &body,
                )))
            }
        }
    }

    /// POST a payload to the send endpoint.
    pub async fn send_data<B: Serialize + ?Sized>(&self, payload: &B) -> Result<Outcome<()>, ClientError> {
        let token = match self.authenticate().await? {
            Outcome::Done(token) => token,
            Outcome::Rejected(rejection) => return Ok(self.abort("data transmission", rejection)),
        };

        let url = self.system.url(&self.system.endpoints.send);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|e| self.transport_error("sending data", &url, e))?;

        match self.check_response(Stage::Operation, &url, response).await {
            Ok(_) => {
                info!(system = %self.system.name, url = %url, "Data sent successfully");
                Ok(Outcome::Done(()))
            }
            Err(rejection) => Ok(Outcome::Rejected(rejection)),
        }
    }

    /// GET the fetch endpoint and return its JSON body.
    pub async fn fetch_data(&self) -> Result<Outcome<Value>, ClientError> {
        let token = match self.authenticate().await? {
            Outcome::Done(token) => token,
            Outcome::Rejected(rejection) => return Ok(self.abort("data retrieval", rejection)),
        };

        let url = self.system.url(&self.system.endpoints.fetch);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| self.transport_error("fetching data", &url, e))?;

        let response = match self.check_response(Stage::Operation, &url, response).await {
            Ok(response) => response,
            Err(rejection) => return Ok(Outcome::Rejected(rejection)),
        };

        let body = self.read_body("fetching data", &url, response).await?;
        let data: Value = serde_json::from_str(&body)
            .map_err(|e| self.invalid_response("fetching data", &url, e))?;

        info!(system = %self.system.name, url = %url, "Data fetched successfully");
        Ok(Outcome::Done(data))
    }

    /// PUT `{"status": status}` to the status endpoint of one record.
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Outcome<()>, ClientError> {
        let token = match self.authenticate().await? {
            Outcome::Done(token) => token,
            Outcome::Rejected(rejection) => return Ok(self.abort("status update", rejection)),
        };

        let url = self.status_url(id)?;
        let response = self
            .client
            .put(&url)
            .bearer_auth(token.as_str())
            .json(&json!({ "status": status }))
            .send()
            .await
            .map_err(|e| self.transport_error("updating status", &url, e))?;

        match self.check_response(Stage::Operation, &url, response).await {
            Ok(_) => {
                info!(system = %self.system.name, id = %id, status = %status, "Status updated");
                Ok(Outcome::Done(()))
            }
            Err(rejection) => Ok(Outcome::Rejected(rejection)),
        }
    }

    /// Split a response into accepted (200) or rejected, logging the body of
    /// a rejection.
    async fn check_response(&self, stage: Stage, url: &str, response: Response) -> Result<Response, Rejection> {
        let status = response.status();
        if status == StatusCode::OK {
            debug!(system = %self.system.name, url = %url, "Request accepted");
            return Ok(response);
        }

        let body = self.rejected_body(url, status, response.text().await);
        let rejection = Rejection::from_status(stage, status, &body);
        error!(
            system = %self.system.name,
            url = %url,
            status = status.as_u16(),
            body = %rejection.body,
            "Remote system rejected {}",
            stage
        );
        Err(rejection)
    }

    /// Body of a rejected reply. A body that cannot be read is logged and
    /// treated as empty, the status alone still decides the outcome.
    fn rejected_body(&self, url: &str, status: StatusCode, read: reqwest::Result<String>) -> String {
        match read {
            Ok(body) => body,
            Err(e) => {
                error!(
                    system = %self.system.name,
                    url = %url,
                    status = status.as_u16(),
                    error = %e,
                    "Failed to read rejected response body"
                );
                String::new()
            }
        }
    }

    /// Status URL for one record. Each template segment has `{id}` replaced
    /// and is then percent-encoded, so an identifier cannot add path
    /// segments, a query or a fragment.
    fn status_url(&self, id: &str) -> Result<String, ClientError> {
        let invalid = |reason: String| {
            ClientError::InvalidConfig(format!("{} status URL: {}", self.system.name, reason))
        };
        let mut url = reqwest::Url::parse(&self.system.base_url).map_err(|e| invalid(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid(format!("base URL {:?} cannot carry a path", self.system.base_url)))?;
            segments.pop_if_empty();
            for segment in self.system.endpoints.update_status.split('/').filter(|s| !s.is_empty()) {
                segments.push(&segment.replace("{id}", id));
            }
        }
        Ok(url.to_string())
    }

    async fn read_body(&self, action: &str, url: &str, response: Response) -> Result<String, ClientError> {
        response
            .text()
            .await
            .map_err(|e| self.transport_error(action, url, e))
    }

    fn abort<T>(&self, action: &str, rejection: Rejection) -> Outcome<T> {
        error!(system = %self.system.name, "No authentication token. Aborting {}", action);
        Outcome::Rejected(rejection)
    }

    fn transport_error(&self, action: &str, url: &str, e: reqwest::Error) -> ClientError {
        error!(system = %self.system.name, url = %url, error = %e, "Error during {}", action);
        ClientError::transport(url, e)
    }

    fn invalid_response(&self, action: &str, url: &str, e: serde_json::Error) -> ClientError {
        error!(system = %self.system.name, url = %url, error = %e, "Undecodable reply while {}", action);
        ClientError::InvalidResponse {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
