use reqwest::Url;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token: Option<String>,
    pub api_base: String,
}

impl AppConfig {
    /// Builds the runtime configuration from values clap already merged with
    /// `GITHUB_TOKEN` / `GITTRACK_API_BASE`.
    pub fn load(token: Option<String>, api_base: &str) -> AppResult<Self> {
        let token = token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let api_base = api_base.trim().trim_end_matches('/').to_string();
        Url::parse(&api_base).map_err(|err| {
            AppError::Configuration(format!("invalid API base URL '{api_base}': {err}"))
        })?;

        Ok(Self { token, api_base })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}
