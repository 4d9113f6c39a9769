// src/utils/http.rs

//! HTTP client utilities.
//!
//! Strategies never touch `reqwest` directly; they go through [`HttpClient`]
//! so tests can swap in canned responses.

use async_trait::async_trait;
use reqwest::redirect::Policy;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Mobile Safari UA used for share pages, which serve the embedded state only to phones.
pub const MOBILE_SAFARI_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";

pub const ACCEPT_JSON: &str = "application/json, text/plain, */*";
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const ACCEPT_LANGUAGE_ZH: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// An outbound GET request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Build a GET request with `params` percent-encoded into the query string.
    pub fn get_with_params(base: &str, params: &[(&str, &str)]) -> Result<Self> {
        let url = url::Url::parse_with_params(base, params)?;
        Ok(Self::get(url.to_string()))
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Accept JSON.
    pub fn json(self) -> Self {
        self.header("Accept", ACCEPT_JSON)
    }
}

/// Body and metadata of a completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// URL after following redirects
    pub final_url: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with [`AppError::UpstreamStatus`] unless the status is 2xx.
    pub fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AppError::UpstreamStatus {
                url: self.final_url,
                status: self.status,
            })
        }
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        if self.body.trim().is_empty() {
            return Err(AppError::parse(format!("empty body from {}", self.final_url)));
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Minimal HTTP capability injected into every strategy.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`HttpClient`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        log::debug!("GET {} -> {} ({} bytes)", request.url, status, body.len());

        Ok(HttpResponse {
            status,
            final_url,
            body,
        })
    }
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .build()?;
    Ok(client)
}

/// Create a client for streaming media; no total timeout so long downloads survive.
pub fn create_media_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .build()?;
    Ok(client)
}

#[cfg(test)]
pub mod mock {
    //! Canned-response client for tests.

    use std::sync::Mutex;

    use super::*;

    /// Serves responses by URL prefix (first registered match wins) and records requests.
    #[derive(Default)]
    pub struct MockHttpClient {
        routes: Vec<(String, HttpResponse)>,
        redirects: Vec<(String, String)>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Respond 200 with `body` to any URL starting with `prefix`.
        pub fn on(self, prefix: &str, body: impl Into<String>) -> Self {
            self.on_status(prefix, 200, body)
        }

        pub fn on_status(mut self, prefix: &str, status: u16, body: impl Into<String>) -> Self {
            self.routes.push((
                prefix.to_string(),
                HttpResponse {
                    status,
                    final_url: String::new(),
                    body: body.into(),
                },
            ));
            self
        }

        /// Report `to` as the final URL for requests starting with `prefix`.
        pub fn redirect(mut self, prefix: &str, to: &str) -> Self {
            self.redirects.push((prefix.to_string(), to.to_string()));
            self
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }

        pub fn requested_urls(&self) -> Vec<String> {
            self.requests().into_iter().map(|r| r.url).collect()
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
            if let Ok(mut log) = self.requests.lock() {
                log.push(request.clone());
            }

            let final_url = self
                .redirects
                .iter()
                .find(|(prefix, _)| request.url.starts_with(prefix))
                .map(|(_, to)| to.clone())
                .unwrap_or_else(|| request.url.clone());

            // Redirect targets are looked up too, mirroring a followed redirect.
            let route = self
                .routes
                .iter()
                .find(|(prefix, _)| request.url.starts_with(prefix))
                .or_else(|| {
                    self.routes
                        .iter()
                        .find(|(prefix, _)| final_url.starts_with(prefix))
                });

            match route {
                Some((_, response)) => Ok(HttpResponse {
                    final_url,
                    ..response.clone()
                }),
                None => Err(AppError::UpstreamStatus {
                    url: request.url,
                    status: 404,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_with_params_encodes() {
        let req = HttpRequest::get_with_params(
            "https://api.example.com/parse",
            &[("url", "https://v.douyin.com/abc/?x=1&y=2")],
        )
        .unwrap();
        assert_eq!(
            req.url,
            "https://api.example.com/parse?url=https%3A%2F%2Fv.douyin.com%2Fabc%2F%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn test_ensure_success() {
        let ok = HttpResponse {
            status: 204,
            final_url: "https://a".into(),
            body: String::new(),
        };
        assert!(ok.ensure_success().is_ok());

        let bad = HttpResponse {
            status: 503,
            final_url: "https://a".into(),
            body: String::new(),
        };
        assert!(matches!(
            bad.ensure_success(),
            Err(AppError::UpstreamStatus { status: 503, .. })
        ));
    }

    #[test]
    fn test_empty_body_is_parse_error() {
        let resp = HttpResponse {
            status: 200,
            final_url: "https://a".into(),
            body: "  ".into(),
        };
        assert!(matches!(resp.json(), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_default_client_builds() {
        assert!(create_async_client(&HttpConfig::default()).is_ok());
        assert!(create_media_client(&HttpConfig::default()).is_ok());
    }
}
