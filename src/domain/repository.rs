use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySlug {
    pub owner: String,
    pub name: String,
}

impl RepositorySlug {
    /// Splits `owner/repo` on the first `/`.
    pub fn parse(value: &str) -> AppResult<Self> {
        let trimmed = value.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| AppError::InvalidRepository(trimmed.to_string()))?;
        if owner.is_empty() || name.is_empty() {
            return Err(AppError::InvalidRepository(trimmed.to_string()));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Body of `GET /repos/{owner}/{repo}`, reduced to the fields the report uses.
///
/// Every field is optional: a successful response never fails to decode just
/// because a field is missing, `null` or oddly formatted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryInfo {
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub html_url: Option<String>,
}

/// Unparseable timestamps are dropped rather than failing the whole body.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|at| at.with_timezone(&Utc)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub open: u64,
    pub closed: u64,
}

impl StateCounts {
    pub fn new(open: u64, closed: u64) -> Self {
        Self { open, closed }
    }

    pub fn total(&self) -> u64 {
        self.open + self.closed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub primary_language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub commit_count: u64,
    pub issues: StateCounts,
    pub pull_requests: StateCounts,
    pub url: Option<String>,
}

impl RepositorySummary {
    pub fn from_parts(
        info: RepositoryInfo,
        commit_count: u64,
        issues: StateCounts,
        pull_requests: StateCounts,
    ) -> Self {
        Self {
            full_name: info.full_name,
            description: info.description,
            primary_language: info.language,
            created_at: info.created_at,
            updated_at: info.updated_at,
            stars: info.stargazers_count.unwrap_or(0),
            forks: info.forks_count.unwrap_or(0),
            watchers: info.watchers_count.unwrap_or(0),
            commit_count,
            issues,
            pull_requests,
            url: info.html_url,
        }
    }
}
