//! Blocking HTTP client built on curl, used for metadata fetches and the
//! JSON-RPC wallet transport.

use crate::error::{EthcaliError, Result};
use curl::easy::{Easy2, Handler, List, WriteError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

struct ResponseHandler {
    data: Vec<u8>,
    headers: HashMap<String, String>,
}

impl ResponseHandler {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            headers: HashMap::new(),
        }
    }
}

impl Handler for ResponseHandler {
    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError> {
        self.data.extend_from_slice(data);
        Ok(data.len())
    }

    fn header(&mut self, header: &[u8]) -> bool {
        if let Ok(header_str) = std::str::from_utf8(header) {
            if let Some((key, value)) = header_str.split_once(':') {
                self.headers
                    .insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }
        true
    }
}

#[derive(Debug)]
pub struct HttpResponse {
    pub status_code: u32,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Get a header value by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }

    /// Deserialize a successful response body as JSON.
    ///
    /// Non-2xx statuses become [`EthcaliError::Http`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if !self.is_success() {
            return Err(EthcaliError::Http(format!(
                "Server returned HTTP {}",
                self.status_code
            )));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Builder for configuring HTTP clients.
#[must_use]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    follow_redirects: bool,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            timeout: None,
            follow_redirects: false,
            user_agent: None,
            headers: Vec::new(),
        }
    }

    /// Set the whole-request deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Add a custom HTTP header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<HttpClient> {
        let mut client = HttpClient::new();

        if let Some(timeout) = self.timeout {
            client.curl.timeout(timeout)?;
        }

        if self.follow_redirects {
            client.curl.follow_location(true)?;
        }

        let ua = self
            .user_agent
            .unwrap_or_else(|| format!("ethcali/{}", crate::VERSION));
        client.curl.useragent(&ua)?;

        if !self.headers.is_empty() {
            let mut list = List::new();
            for (name, value) in &self.headers {
                list.append(&format!("{name}: {value}"))?;
            }
            client.curl.http_headers(list)?;
        }

        Ok(client)
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A single reusable curl handle. Blocking; run inside `spawn_blocking`
/// from async code.
pub struct HttpClient {
    curl: Easy2<ResponseHandler>,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            curl: Easy2::new(ResponseHandler::new()),
        }
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Perform a GET request
    pub fn get(&mut self, url: &str) -> Result<HttpResponse> {
        self.curl.url(url)?;
        self.curl.get(true)?;
        self.perform()
    }

    /// Perform a POST request with optional body
    pub fn post(&mut self, url: &str, body: Option<&[u8]>) -> Result<HttpResponse> {
        self.curl.url(url)?;
        self.curl.post(true)?;

        if let Some(data) = body {
            self.curl.post_field_size(data.len() as u64)?;
            self.curl.post_fields_copy(data)?;
        }

        self.perform()
    }

    /// Perform the request and return the response
    fn perform(&mut self) -> Result<HttpResponse> {
        self.curl.perform()?;

        let status_code = self.curl.response_code()?;
        let handler = self.curl.get_mut();

        Ok(HttpResponse {
            status_code,
            headers: std::mem::take(&mut handler.headers),
            body: std::mem::take(&mut handler.data),
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
