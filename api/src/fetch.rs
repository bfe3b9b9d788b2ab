use crate::client::{ApiError, ApiResult};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can GET a URL and hand back the body.
///
/// Any status other than 200 is an error; transport failures and bad
/// statuses are not told apart by callers.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = ApiResult<String>>;
}

/// reqwest-backed fetcher used against the live Stats API.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent("mlbboard/0.1 (matrix scoreboard)")
                .build()
                .unwrap_or_default(),
            timeout,
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> ApiResult<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(url.to_owned(), e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::Api(status.as_u16(), url.to_owned()));
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::Network(url.to_owned(), e.to_string()))
    }
}
