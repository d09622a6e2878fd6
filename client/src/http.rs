use crate::{ClientError, ErrorResponse, Result};
use std::{collections::HashMap, fmt, time::Duration};

use once_cell::sync::Lazy;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";

const SUCCESS_STATUSES: [u16; 4] = [200, 201, 202, 204];

static HEADER_AUTHORIZATION: &'static str = "Authorization";
static HEADER_ACCEPT: &'static str = "Accept";
static HEADER_CONTENT_TYPE: &'static str = "Content-Type";
static HEADER_USER_AGENT: &'static str = "User-Agent";
static USER_AGENT: &'static str = concat!("contactdb-client/", env!("CARGO_PKG_VERSION"));

static DEFAULT_CLIENT: Lazy<Client> = Lazy::new(Client::default);

/// Sends requests to the API and turns non-success responses into errors.
///
/// Holds no per-call state, so one instance can be shared between threads.
pub struct Client {
    base_url: String,
    http_client: Box<dyn HttpClient>,
}

/// The transport a [`Client`] dispatches through.
pub trait HttpClient: Send + Sync {
    fn request(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::PATCH => reqwest::Method::PATCH,
            HttpMethod::DELETE => reqwest::Method::DELETE,
        }
    }
}

/// Default transport, backed by the blocking reqwest client.
pub struct ReqwestClient {
    inner: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            inner: reqwest::blocking::Client::new(),
        }
    }

    /// The dispatcher never times out on its own; use this to bound a call.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let inner = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Reqwest)?;
        Ok(Self { inner })
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    fn request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.inner.request(request.method.into(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(ClientError::Reqwest)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(ClientError::Reqwest)?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        url::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: Box::new(ReqwestClient::new()),
        })
    }

    pub fn with_http_client<C: HttpClient + 'static>(mut self, http_client: C) -> Self {
        self.http_client = Box::new(http_client);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn send_get(&self, api_key: &str, path: &str) -> Result<Vec<u8>> {
        self.send_request(api_key, path, "", HttpMethod::GET)
    }

    pub fn send_post(&self, api_key: &str, path: &str, payload: &str) -> Result<Vec<u8>> {
        self.send_request(api_key, path, payload, HttpMethod::POST)
    }

    pub fn send_patch(&self, api_key: &str, path: &str, payload: &str) -> Result<Vec<u8>> {
        self.send_request(api_key, path, payload, HttpMethod::PATCH)
    }

    pub fn send_delete(&self, api_key: &str, path: &str, payload: &str) -> Result<Vec<u8>> {
        self.send_request(api_key, path, payload, HttpMethod::DELETE)
    }

    /// Send one request and return the raw body of a successful response.
    ///
    /// An empty `payload` means no body; anything else is sent as-is.
    /// Transport failures come back unchanged. For any status outside
    /// 200/201/202/204 the body is decoded as an [`ErrorResponse`] and only its
    /// first entry is reported.
    pub fn send_request(
        &self,
        api_key: &str,
        path: &str,
        payload: &str,
        method: HttpMethod,
    ) -> Result<Vec<u8>> {
        let request = self.build_request(api_key, path, payload, method);
        debug!(
            method = %method,
            path,
            has_body = request.body.is_some(),
            "dispatching request"
        );

        let response = self.http_client.request(request)?;
        self.handle_response(response)
    }

    fn build_request(
        &self,
        api_key: &str,
        path: &str,
        payload: &str,
        method: HttpMethod,
    ) -> HttpRequest {
        let mut headers = HashMap::new();
        headers.insert(
            HEADER_AUTHORIZATION.to_string(),
            format!("Bearer {}", api_key),
        );
        headers.insert(HEADER_ACCEPT.to_string(), "application/json".to_string());
        headers.insert(HEADER_USER_AGENT.to_string(), USER_AGENT.to_string());

        let body = if payload.is_empty() {
            None
        } else {
            headers.insert(
                HEADER_CONTENT_TYPE.to_string(),
                "application/json".to_string(),
            );
            Some(payload.as_bytes().to_vec())
        };

        HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        }
    }

    fn handle_response(&self, response: HttpResponse) -> Result<Vec<u8>> {
        let status = response.status;
        if SUCCESS_STATUSES.contains(&status) {
            debug!(status, bytes = response.body.len(), "request succeeded");
            return Ok(response.body);
        }

        debug!(status, "request failed, decoding error body");
        let error_response = ErrorResponse::from_body(status, &response.body)?;
        Err(error_response.into_error())
    }
}

impl Default for Client {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: Box::new(ReqwestClient::new()),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Send a GET request to [`DEFAULT_BASE_URL`].
pub fn send_get_request(api_key: &str, path: &str) -> Result<Vec<u8>> {
    DEFAULT_CLIENT.send_get(api_key, path)
}

/// Send a POST request to [`DEFAULT_BASE_URL`].
pub fn send_post_request(api_key: &str, path: &str, payload: &str) -> Result<Vec<u8>> {
    DEFAULT_CLIENT.send_post(api_key, path, payload)
}

/// Send a PATCH request to [`DEFAULT_BASE_URL`].
pub fn send_patch_request(api_key: &str, path: &str, payload: &str) -> Result<Vec<u8>> {
    DEFAULT_CLIENT.send_patch(api_key, path, payload)
}

/// Send a DELETE request to [`DEFAULT_BASE_URL`].
pub fn send_delete_request(api_key: &str, path: &str, payload: &str) -> Result<Vec<u8>> {
    DEFAULT_CLIENT.send_delete(api_key, path, payload)
}
