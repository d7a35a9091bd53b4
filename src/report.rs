use std::io::{self, Write};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::domain::repository::{RepositoryInfo, RepositorySlug, RepositorySummary, StateCounts};
use crate::workflow::summary::SummaryStage;

const RULE_WIDTH: usize = 60;
const NOT_AVAILABLE: &str = "N/A";
const NO_DESCRIPTION: &str = "No description";

pub fn write_header(
    out: &mut impl Write,
    slug: &RepositorySlug,
    now: NaiveDateTime,
) -> io::Result<()> {
    let heavy = "=".repeat(RULE_WIDTH);
    writeln!(out)?;
    writeln!(out, "{heavy}")?;
    writeln!(out, "GitTrack - Repository Activity Tracker")?;
    writeln!(out, "{heavy}")?;
    writeln!(out)?;
    writeln!(out, "Fetching information for: {slug}")?;
    writeln!(out, "Timestamp: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;
    Ok(())
}

pub fn write_failure(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Failed to fetch repository information.")
}

/// The part of the report known as soon as the repository info arrives.
pub struct Overview<'a> {
    pub full_name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub language: Option<&'a str>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
}

impl<'a> From<&'a RepositoryInfo> for Overview<'a> {
    fn from(info: &'a RepositoryInfo) -> Self {
        Self {
            full_name: info.full_name.as_deref(),
            description: info.description.as_deref(),
            language: info.language.as_deref(),
            created_at: info.created_at,
            updated_at: info.updated_at,
            stars: info.stargazers_count.unwrap_or(0),
            forks: info.forks_count.unwrap_or(0),
            watchers: info.watchers_count.unwrap_or(0),
        }
    }
}

impl<'a> From<&'a RepositorySummary> for Overview<'a> {
    fn from(summary: &'a RepositorySummary) -> Self {
        Self {
            full_name: summary.full_name.as_deref(),
            description: summary.description.as_deref(),
            language: summary.primary_language.as_deref(),
            created_at: summary.created_at,
            updated_at: summary.updated_at,
            stars: summary.stars,
            forks: summary.forks,
            watchers: summary.watchers,
        }
    }
}

pub fn write_overview(out: &mut impl Write, overview: &Overview<'_>) -> io::Result<()> {
    writeln!(
        out,
        "Repository: {}",
        overview.full_name.unwrap_or(NOT_AVAILABLE)
    )?;
    writeln!(
        out,
        "Description: {}",
        overview.description.unwrap_or(NO_DESCRIPTION)
    )?;
    writeln!(out, "Language: {}", overview.language.unwrap_or(NOT_AVAILABLE))?;
    writeln!(out, "Created: {}", display_timestamp(overview.created_at))?;
    writeln!(out, "Last Updated: {}", display_timestamp(overview.updated_at))?;
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out)?;

    writeln!(out, "Key Metrics:")?;
    writeln!(out, "  ⭐ Stars:        {}", group_thousands(overview.stars))?;
    writeln!(out, "  🍴 Forks:        {}", group_thousands(overview.forks))?;
    writeln!(
        out,
        "  👁️  Watchers:     {}",
        group_thousands(overview.watchers)
    )?;
    Ok(())
}

/// Writes the lines a fetch stage contributes, in the order they happen.
pub fn write_stage(out: &mut impl Write, stage: &SummaryStage<'_>) -> io::Result<()> {
    match stage {
        SummaryStage::Repository(info) => write_overview(out, &Overview::from(*info)),
        SummaryStage::FetchingCommits => {
            writeln!(out)?;
            writeln!(out, "  Fetching commit count...")
        }
        SummaryStage::Commits(count) => {
            writeln!(out, "  💻 Commits:      {}", group_thousands(*count))
        }
        SummaryStage::FetchingIssues => writeln!(out, "  Fetching issues count..."),
        SummaryStage::Issues(counts) => {
            writeln!(out, "  📝 Issues:       {}", display_counts(counts))
        }
        SummaryStage::FetchingPullRequests => writeln!(out, "  Fetching pull requests count..."),
        SummaryStage::PullRequests(counts) => {
            writeln!(out, "  🔀 Pull Requests: {}", display_counts(counts))
        }
    }
}

pub fn write_footer(out: &mut impl Write, url: Option<&str>) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out)?;
    writeln!(out, "Repository URL: {}", url.unwrap_or(NOT_AVAILABLE))?;
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;
    Ok(())
}

/// Renders a finished summary exactly as the streamed report would read.
pub fn write_summary(out: &mut impl Write, summary: &RepositorySummary) -> io::Result<()> {
    write_overview(out, &Overview::from(summary))?;
    for stage in [
        SummaryStage::FetchingCommits,
        SummaryStage::Commits(summary.commit_count),
        SummaryStage::FetchingIssues,
        SummaryStage::Issues(summary.issues),
        SummaryStage::FetchingPullRequests,
        SummaryStage::PullRequests(summary.pull_requests),
    ] {
        write_stage(out, &stage)?;
    }
    write_footer(out, summary.url.as_deref())
}

fn display_counts(counts: &StateCounts) -> String {
    format!(
        "{} (Open: {}, Closed: {})",
        group_thousands(counts.total()),
        group_thousands(counts.open),
        group_thousands(counts.closed)
    )
}

fn display_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Formats `1234567` as `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
