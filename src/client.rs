use std::env;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability;
use crate::types::{Agent, BatchReceipt, ChatReply, ChatRequest, HealthStatus, JobStatus};

const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:8000/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the agent gateway API.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl Gateway {
    /// Create a new gateway client.
    ///
    /// The base URL can be provided directly or read from the PARLANCE_URL
    /// environment variable; a local default is used when neither is set.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var("PARLANCE_URL").ok())
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
        // Validate eagerly so later joins cannot fail on a bad base.
        Url::parse(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a possibly origin-relative URL against the base URL.
    ///
    /// The gateway hands out origin-relative status and result URLs; joining
    /// an absolute URL yields that URL unchanged.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(path)?)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Convert a reqwest transport failure into our Error type.
    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type.
    ///
    /// The gateway sends `{"error": "..."}` bodies on failure, but not
    /// reliably; the status code is the fallback description.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let message = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_else(|| format!("Server error ({status_code})"));

        match status_code {
            400 => Error::bad_request(message, None),
            404 => Error::not_found(message),
            408 => Error::timeout(message, None),
            500 => Error::internal_server(message),
            502..=504 => Error::service_unavailable(message),
            _ => Error::api(status_code, message),
        }
    }

    /// Parse a successful JSON response body.
    async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Send one chat turn to the selected agent.
    ///
    /// Returns the raw reply; callers decide how to treat a 2xx reply that
    /// lacks response text, since the gateway can issue a session identifier
    /// either way.
    pub async fn chat(&self, agent: Agent, request: &ChatRequest) -> Result<ChatReply> {
        observability::CLIENT_REQUESTS.click();
        let url = self.resolve(&agent.chat_path())?;

        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.transport_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        Self::parse_json(response).await
    }

    /// Check the gateway health endpoint.
    pub async fn health(&self) -> Result<HealthStatus> {
        observability::CLIENT_REQUESTS.click();
        let url = self.resolve("api/health")?;

        let response = self
            .client
            .get(url)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.transport_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        Self::parse_json(response).await
    }

    /// Submit a file for batch processing by the selected agent.
    ///
    /// The upload is a single multipart request with field `file`. A success
    /// response that lacks a status URL is a serialization error; polling
    /// never starts for it.
    pub async fn submit_batch(
        &self,
        agent: Agent,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<BatchReceipt> {
        observability::CLIENT_REQUESTS.click();
        observability::BATCH_SUBMISSIONS.click();
        let url = self.resolve(&agent.batch_path())?;

        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.transport_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        Self::parse_json(response).await
    }

    /// Submit a file from disk for batch processing.
    pub async fn submit_batch_file(&self, agent: Agent, path: &Path) -> Result<BatchReceipt> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::validation(
                    format!("batch file path has no usable file name: {}", path.display()),
                    Some("file".to_string()),
                )
            })?
            .to_string();
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;
        self.submit_batch(agent, &file_name, contents).await
    }

    /// Read a batch job's status URL once.
    pub async fn job_status(&self, status_url: &str) -> Result<JobStatus> {
        observability::CLIENT_REQUESTS.click();
        let url = self.resolve(status_url)?;

        let response = self
            .client
            .get(url)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.transport_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        Self::parse_json(response).await
    }
}
