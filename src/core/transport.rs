//! HTTP Transport
//!
//! HTTP client interface and implementations for provider requests.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{ConfigurationError, LucidchartError, ProtocolError, ProviderError};

/// HTTP request definition.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// HTTP method. Every provider endpoint, including the token endpoints, is
/// read with `GET`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
        }
    }
}

/// HTTP response definition.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (lower-cased names).
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP transport interface (for dependency injection).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LucidchartError>;
}

/// Default reqwest-based HTTP transport.
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    default_timeout: Duration,
    max_response_size: usize,
}

impl ReqwestHttpTransport {
    /// Create transport with custom options.
    pub fn with_options(
        timeout: Duration,
        max_response_size: usize,
    ) -> Result<Self, LucidchartError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            // Provider redirects are surfaced to the caller as non-2xx statuses.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                LucidchartError::Configuration(ConfigurationError::InvalidConfig {
                    message: format!("failed to create HTTP client: {e}"),
                })
            })?;

        Ok(Self {
            client,
            default_timeout: timeout,
            max_response_size,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LucidchartError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
        };

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        req_builder = req_builder.timeout(timeout);

        let mut response = req_builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string().to_lowercase(), v.to_string());
            }
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_response_size {
                return Err(LucidchartError::Protocol(ProtocolError::ResponseTooLarge {
                    size: len as usize,
                }));
            }
        }

        // Chunked bodies carry no length up front.
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?
        {
            let size = body.len() + chunk.len();
            if size > self.max_response_size {
                return Err(LucidchartError::Protocol(ProtocolError::ResponseTooLarge {
                    size,
                }));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(HttpResponse {
            status,
            headers,
            body: body.freeze(),
        })
    }
}

fn map_reqwest_error(error: reqwest::Error, timeout: Duration) -> LucidchartError {
    if error.is_timeout() {
        LucidchartError::Provider(ProviderError::Timeout { timeout })
    } else {
        LucidchartError::Provider(ProviderError::Connection {
            message: error.to_string(),
        })
    }
}

/// Mock HTTP transport for testing.
///
/// Queued responses are returned in FIFO order.
#[derive(Default)]
pub struct MockHttpTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    request_history: Mutex<Vec<HttpRequest>>,
}

impl MockHttpTransport {
    /// Create new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to return.
    pub fn queue_response(&self, response: HttpResponse) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Queue a response with the given status and body.
    pub fn queue_body(&self, status: u16, content_type: &str, body: impl Into<Bytes>) -> &Self {
        self.queue_response(HttpResponse {
            status,
            headers: [("content-type".to_string(), content_type.to_string())]
                .into_iter()
                .collect(),
            body: body.into(),
        })
    }

    /// Queue a form-encoded response (token endpoints).
    pub fn queue_form_response(&self, status: u16, body: &str) -> &Self {
        self.queue_body(
            status,
            "application/x-www-form-urlencoded",
            body.as_bytes().to_vec(),
        )
    }

    /// Queue an XML response (describe endpoint).
    pub fn queue_xml_response(&self, status: u16, body: &str) -> &Self {
        self.queue_body(status, "application/xml", body.as_bytes().to_vec())
    }

    /// Get request history.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.request_history.lock().unwrap().clone()
    }

    /// Get last request.
    pub fn get_last_request(&self) -> Option<HttpRequest> {
        self.request_history.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LucidchartError> {
        self.request_history.lock().unwrap().push(request);

        let response = self.responses.lock().unwrap().pop_front();

        response.ok_or_else(|| {
            LucidchartError::Provider(ProviderError::Connection {
                message: "No mock response available".to_string(),
            })
        })
    }
}
