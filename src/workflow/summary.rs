use tracing::debug;

use crate::context::AppContext;
use crate::domain::repository::{RepositoryInfo, RepositorySlug, RepositorySummary, StateCounts};
use crate::error::{AppError, AppResult};

/// Progress of `fetch_summary_with`, reported as each step starts or ends.
#[derive(Debug)]
pub enum SummaryStage<'a> {
    Repository(&'a RepositoryInfo),
    FetchingCommits,
    Commits(u64),
    FetchingIssues,
    Issues(StateCounts),
    FetchingPullRequests,
    PullRequests(StateCounts),
}

pub async fn fetch_summary(
    ctx: &AppContext,
    slug: &RepositorySlug,
) -> AppResult<RepositorySummary> {
    fetch_summary_with(ctx, slug, |_| Ok(())).await
}

/// Collects every metric for one repository, strictly in order: info,
/// commits, issues, pull requests.
///
/// Only a missing repository info aborts; the other metrics fall back to zero.
/// An error returned by `on_stage` stops the run.
pub async fn fetch_summary_with<F>(
    ctx: &AppContext,
    slug: &RepositorySlug,
    mut on_stage: F,
) -> AppResult<RepositorySummary>
where
    F: FnMut(SummaryStage<'_>) -> AppResult<()>,
{
    debug!(repository = %slug, "fetching repository info");
    let repo_info = ctx
        .metrics
        .get_repository_info(slug)
        .await
        .ok_or_else(|| AppError::RepositoryUnavailable(slug.to_string()))?;
    on_stage(SummaryStage::Repository(&repo_info))?;

    on_stage(SummaryStage::FetchingCommits)?;
    let commit_count = ctx.metrics.get_commit_count(slug).await;
    on_stage(SummaryStage::Commits(commit_count))?;

    on_stage(SummaryStage::FetchingIssues)?;
    let issues = ctx.metrics.get_issues_count(slug).await;
    on_stage(SummaryStage::Issues(issues))?;

    on_stage(SummaryStage::FetchingPullRequests)?;
    let pull_requests = ctx.metrics.get_pull_requests_count(slug).await;
    on_stage(SummaryStage::PullRequests(pull_requests))?;

    Ok(RepositorySummary::from_parts(
        repo_info,
        commit_count,
        issues,
        pull_requests,
    ))
}
