use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK, USER_AGENT},
};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::services::{ApiRequest, ApiResponse, HttpTransport};

const ACCEPT_GITHUB_V3: &str = "application/vnd.github.v3+json";
const USER_AGENT_VALUE: &str = "GitTrack-CLI";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ReqwestTransport {
    http: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, token: Option<&str>) -> AppResult<Self> {
        let http = Client::builder()
            .default_headers(default_headers(token)?)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(&config.api_base, config.token.as_deref())
    }
}

pub fn default_headers(token: Option<&str>) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_V3));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("token {token}")).map_err(|_| {
            AppError::Configuration("access token contains invalid characters".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(request = %request.describe(), "GET");

        let response = self
            .http
            .get(&url)
            .query(&request.query)
            .send()
            .await
            .map_err(|err| AppError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let link = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let body = response
            .text()
            .await
            .map_err(|err| AppError::Transport(format!("failed to read response: {err}")))?;

        debug!(status, has_link = link.is_some(), "response received");
        Ok(ApiResponse { status, link, body })
    }
}
