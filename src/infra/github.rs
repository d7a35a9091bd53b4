use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::domain::repository::{RepositoryInfo, RepositorySlug, StateCounts};
use crate::error::{AppError, AppResult};
use crate::services::{ApiRequest, ApiResponse, HttpTransport};

const FORBIDDEN: u16 = 403;
const RATE_LIMIT_MESSAGE: &str = "API rate limit exceeded or access forbidden";
const TOKEN_TIP: &str = "use a GitHub token with --token or GITHUB_TOKEN for higher rate limits";

/// Reads repository metrics from the GitHub REST API.
///
/// Every call is attempted exactly once. Secondary metrics degrade to zero
/// with a warning instead of failing.
#[derive(Clone)]
pub struct RepositoryMetricsClient {
    transport: Arc<dyn HttpTransport>,
}

#[derive(Debug, Clone, Copy)]
enum SearchKind {
    Issue,
    PullRequest,
}

impl SearchKind {
    fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Issue => "issue",
            SearchKind::PullRequest => "pr",
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_count: u64,
}

impl RepositoryMetricsClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Returns `None` when the repository cannot be read; the reason has
    /// already been logged.
    pub async fn get_repository_info(&self, slug: &RepositorySlug) -> Option<RepositoryInfo> {
        let request = ApiRequest::new(format!("/repos/{}/{}", slug.owner, slug.name));
        match self.fetch_json::<RepositoryInfo>(request).await {
            Ok(info) => Some(info),
            Err(err) => {
                for line in info_failure_messages(&err) {
                    error!("{line}");
                }
                None
            }
        }
    }

    pub async fn get_commit_count(&self, slug: &RepositorySlug) -> u64 {
        match self.fetch_commit_count(slug).await {
            Ok(count) => count,
            Err(err) => {
                warn!("could not fetch commit count: {err}");
                0
            }
        }
    }

    pub async fn get_issues_count(&self, slug: &RepositorySlug) -> StateCounts {
        match self.fetch_state_counts(slug, SearchKind::Issue).await {
            Ok(counts) => counts,
            Err(err) => {
                warn!("could not fetch issues count: {err}");
                StateCounts::default()
            }
        }
    }

    /// Closed pull requests include merged ones.
    pub async fn get_pull_requests_count(&self, slug: &RepositorySlug) -> StateCounts {
        match self.fetch_state_counts(slug, SearchKind::PullRequest).await {
            Ok(counts) => counts,
            Err(err) => {
                warn!("could not fetch pull requests count: {err}");
                StateCounts::default()
            }
        }
    }

    async fn fetch_commit_count(&self, slug: &RepositorySlug) -> AppResult<u64> {
        let request = ApiRequest::new(format!("/repos/{}/{}/commits", slug.owner, slug.name))
            .query("per_page", "1");
        let response = self.send(request).await?;

        // One commit per page, so the last page index is the total.
        if let Some(last) = response.link.as_deref().and_then(last_page) {
            return Ok(last);
        }

        // Without a `last` link only the returned page can be counted. This
        // undercounts when GitHub omits the header for a multi-commit history.
        let commits: Vec<serde_json::Value> = decode(&response)?;
        Ok(commits.len() as u64)
    }

    async fn fetch_state_counts(
        &self,
        slug: &RepositorySlug,
        kind: SearchKind,
    ) -> AppResult<StateCounts> {
        let open = self.search_total(slug, kind, "open").await?;
        let closed = self.search_total(slug, kind, "closed").await?;
        Ok(StateCounts::new(open, closed))
    }

    async fn search_total(
        &self,
        slug: &RepositorySlug,
        kind: SearchKind,
        state: &str,
    ) -> AppResult<u64> {
        let request = ApiRequest::new("/search/issues")
            .query("q", search_query(slug, kind, state))
            .query("per_page", "1");
        let response: SearchResponse = self.fetch_json(request).await?;
        Ok(response.total_count)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> AppResult<T> {
        let response = self.send(request).await?;
        decode(&response)
    }

    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let response = self.transport.get(request).await?;
        if response.is_success() {
            return Ok(response);
        }
        match response.status {
            FORBIDDEN => Err(AppError::RateLimited),
            status => Err(AppError::Http { status }),
        }
    }
}

/// A 403 points the user at supplying a token; anything else is a plain
/// fetch failure.
fn info_failure_messages(err: &AppError) -> Vec<String> {
    match err {
        AppError::RateLimited => vec![RATE_LIMIT_MESSAGE.to_string(), TOKEN_TIP.to_string()],
        other => vec![format!("error fetching repository info: {other}")],
    }
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> AppResult<T> {
    serde_json::from_str(&response.body).map_err(|err| AppError::Decode(err.to_string()))
}

fn search_query(slug: &RepositorySlug, kind: SearchKind, state: &str) -> String {
    format!(
        "repo:{}/{} type:{} state:{}",
        slug.owner,
        slug.name,
        kind.as_str(),
        state
    )
}

/// Extracts `page=<N>` from the `rel="last"` entry of a `Link` header.
fn last_page(link_header: &str) -> Option<u64> {
    link_header
        .split(',')
        .filter_map(|entry| {
            let (target, params) = entry.trim().split_once(';')?;
            let is_last = params.split(';').any(|param| {
                param
                    .trim()
                    .strip_prefix("rel=")
                    .map(|rel| rel.trim_matches('"').split_whitespace().any(|r| r == "last"))
                    .unwrap_or(false)
            });
            is_last.then(|| target.trim().trim_start_matches('<').trim_end_matches('>'))
        })
        .find_map(|target| {
            let url = Url::parse(target).ok()?;
            url.query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedTransport;

    fn slug() -> RepositorySlug {
        RepositorySlug::parse("test/repo").unwrap()
    }

    fn client(transport: &Arc<ScriptedTransport>) -> RepositoryMetricsClient {
        RepositoryMetricsClient::new(transport.clone())
    }

    #[test]
    fn reads_last_page_from_link_header() {
        let header = r#"<https://api.github.com/repos/test/repo/commits?page=100>; rel="last""#;
        assert_eq!(last_page(header), Some(100));
    }

    #[test]
    fn ignores_per_page_and_other_relations() {
        let header = concat!(
            r#"<https://api.github.com/repositories/1/commits?per_page=1&page=2>; rel="next", "#,
            r#"<https://api.github.com/repositories/1/commits?per_page=1&page=1234>; rel="last""#
        );
        assert_eq!(last_page(header), Some(1234));

        let only_next = r#"<https://api.github.com/repos/a/b/commits?per_page=1&page=2>; rel="next""#;
        assert_eq!(last_page(only_next), None);
        assert_eq!(last_page(""), None);
    }

    #[tokio::test]
    async fn repository_info_decodes_success() {
        let transport = Arc::new(ScriptedTransport::new().ok(
            "/repos/test/repo",
            r#"{"full_name":"test/repo","stargazers_count":100,"forks_count":50}"#,
        ));

        let info = client(&transport).get_repository_info(&slug()).await.unwrap();
        assert_eq!(info.full_name.as_deref(), Some("test/repo"));
        assert_eq!(info.stargazers_count, Some(100));
        assert_eq!(info.forks_count, Some(50));
        assert!(info.html_url.is_none());
    }

    #[tokio::test]
    async fn repository_info_is_absent_on_network_failure() {
        let transport = Arc::new(ScriptedTransport::new().network_down("/repos/test/repo"));
        assert!(client(&transport).get_repository_info(&slug()).await.is_none());
    }

    #[tokio::test]
    async fn repository_info_is_absent_when_forbidden() {
        let transport =
            Arc::new(ScriptedTransport::new().status("/repos/test/repo", 403, "rate limited"));
        assert!(client(&transport).get_repository_info(&slug()).await.is_none());
    }

    #[tokio::test]
    async fn repository_info_survives_malformed_timestamps() {
        let transport = Arc::new(ScriptedTransport::new().ok(
            "/repos/test/repo",
            r#"{"full_name":"test/repo","description":null,"created_at":"not-a-date","watchers_count":null}"#,
        ));

        let info = client(&transport).get_repository_info(&slug()).await.unwrap();
        assert!(info.created_at.is_none());
        assert!(info.watchers_count.is_none());
    }

    #[test]
    fn forbidden_failure_suggests_a_token() {
        let lines = info_failure_messages(&AppError::RateLimited);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("rate limit exceeded"));
        assert!(lines[1].contains("--token"));
        assert!(lines[1].contains("GITHUB_TOKEN"));
    }

    #[test]
    fn other_failures_get_a_generic_message() {
        for err in [
            AppError::Http { status: 404 },
            AppError::Transport("connection refused".to_string()),
        ] {
            let lines = info_failure_messages(&err);
            assert_eq!(lines.len(), 1);
            assert!(lines[0].starts_with("error fetching repository info: "));
            assert!(!lines[0].contains("--token"));
        }
    }

    #[tokio::test]
    async fn forbidden_status_classifies_as_rate_limited() {
        let transport = Arc::new(ScriptedTransport::new().status("/repos/test/repo", 403, ""));
        let err = client(&transport)
            .fetch_json::<RepositoryInfo>(ApiRequest::new("/repos/test/repo"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited));
    }

    #[tokio::test]
    async fn repository_info_is_absent_on_not_found() {
        let transport = Arc::new(ScriptedTransport::new().status(
            "/repos/test/repo",
            404,
            r#"{"message":"Not Found"}"#,
        ));
        assert!(client(&transport).get_repository_info(&slug()).await.is_none());
    }

    #[tokio::test]
    async fn commit_count_uses_last_page_regardless_of_body() {
        let transport = Arc::new(ScriptedTransport::new().ok_with_link(
            "/repos/test/repo/commits?per_page=1",
            r#"[{"sha":"abc123"}]"#,
            r#"<https://api.github.com/repos/test/repo/commits?page=100>; rel="last""#,
        ));
        assert_eq!(client(&transport).get_commit_count(&slug()).await, 100);
    }

    #[tokio::test]
    async fn commit_count_falls_back_to_page_length() {
        let single = Arc::new(
            ScriptedTransport::new().ok("/repos/test/repo/commits?per_page=1", r#"[{"sha":"abc"}]"#),
        );
        assert_eq!(client(&single).get_commit_count(&slug()).await, 1);

        let empty =
            Arc::new(ScriptedTransport::new().ok("/repos/test/repo/commits?per_page=1", "[]"));
        assert_eq!(client(&empty).get_commit_count(&slug()).await, 0);
    }

    #[tokio::test]
    async fn commit_count_is_zero_on_error() {
        let transport = Arc::new(ScriptedTransport::new().status(
            "/repos/test/repo/commits?per_page=1",
            409,
            r#"{"message":"Git Repository is empty."}"#,
        ));
        assert_eq!(client(&transport).get_commit_count(&slug()).await, 0);
    }

    #[tokio::test]
    async fn issues_count_reads_open_then_closed_totals() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .ok(
                    "/search/issues?q=repo:test/repo type:issue state:open&per_page=1",
                    r#"{"total_count":10,"items":[]}"#,
                )
                .ok(
                    "/search/issues?q=repo:test/repo type:issue state:closed&per_page=1",
                    r#"{"total_count":25,"items":[]}"#,
                ),
        );

        let counts = client(&transport).get_issues_count(&slug()).await;
        assert_eq!(counts, StateCounts::new(10, 25));
        assert_eq!(counts.total(), 35);
        assert_eq!(
            transport.requests(),
            vec![
                "/search/issues?q=repo:test/repo type:issue state:open&per_page=1",
                "/search/issues?q=repo:test/repo type:issue state:closed&per_page=1",
            ]
        );
    }

    #[tokio::test]
    async fn pull_request_count_uses_pr_type_filter() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .ok(
                    "/search/issues?q=repo:test/repo type:pr state:open&per_page=1",
                    r#"{"total_count":3}"#,
                )
                .ok(
                    "/search/issues?q=repo:test/repo type:pr state:closed&per_page=1",
                    r#"{"total_count":1200}"#,
                ),
        );

        let counts = client(&transport).get_pull_requests_count(&slug()).await;
        assert_eq!(counts, StateCounts::new(3, 1200));
    }

    #[tokio::test]
    async fn state_counts_reset_to_zero_when_second_search_fails() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .ok(
                    "/search/issues?q=repo:test/repo type:issue state:open&per_page=1",
                    r#"{"total_count":10}"#,
                )
                .status(
                    "/search/issues?q=repo:test/repo type:issue state:closed&per_page=1",
                    403,
                    "",
                ),
        );

        let counts = client(&transport).get_issues_count(&slug()).await;
        assert_eq!(counts, StateCounts::default());
    }
}
