use std::io::Write;

use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::domain::repository::{RepositorySlug, RepositorySummary, StateCounts};
use crate::error::AppResult;
use crate::report;

/// Renders canned reports so the output format can be seen without network
/// access or a token.
pub fn run(now: NaiveDateTime, out: &mut impl Write) -> AppResult<()> {
    let rule = "=".repeat(60);
    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "GitTrack Demo - Simulated Output")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "The data shown is simulated and not from actual API calls.")?;
    writeln!(out, "Run `gittrack owner/repo` (optionally with --token) for real data.")?;

    for (index, (slug, summary)) in demo_summaries(now).iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "Demo {}: $ gittrack {slug}", index + 1)?;
        report::write_header(out, slug, now)?;
        report::write_summary(out, summary)?;
    }
    Ok(())
}

fn demo_summaries(now: NaiveDateTime) -> Vec<(RepositorySlug, RepositorySummary)> {
    let updated_at = Some(now.and_utc());
    vec![
        (
            RepositorySlug {
                owner: "torvalds".to_string(),
                name: "linux".to_string(),
            },
            RepositorySummary {
                full_name: Some("torvalds/linux".to_string()),
                description: Some("Linux kernel source tree".to_string()),
                primary_language: Some("C".to_string()),
                created_at: Utc.with_ymd_and_hms(2011, 9, 4, 22, 48, 12).single(),
                updated_at,
                stars: 150_234,
                forks: 50_123,
                watchers: 150_234,
                commit_count: 1_234_567,
                issues: StateCounts::new(100, 400),
                pull_requests: StateCounts::new(50, 950),
                url: Some("https://github.com/torvalds/linux".to_string()),
            },
        ),
        (
            RepositorySlug {
                owner: "facebook".to_string(),
                name: "react".to_string(),
            },
            RepositorySummary {
                full_name: Some("facebook/react".to_string()),
                description: Some(
                    "A declarative, efficient, and flexible JavaScript library for building user interfaces."
                        .to_string(),
                ),
                primary_language: Some("JavaScript".to_string()),
                created_at: Utc.with_ymd_and_hms(2013, 5, 24, 16, 15, 54).single(),
                updated_at,
                stars: 220_456,
                forks: 45_123,
                watchers: 220_456,
                commit_count: 16_789,
                issues: StateCounts::new(789, 11_556),
                pull_requests: StateCounts::new(123, 15_555),
                url: Some("https://github.com/facebook/react".to_string()),
            },
        ),
        (
            RepositorySlug {
                owner: "NoirStackLLC".to_string(),
                name: "GitTrack".to_string(),
            },
            RepositorySummary {
                full_name: Some("NoirStackLLC/GitTrack".to_string()),
                description: Some(
                    "Track GitHub repository activity and display key metrics".to_string(),
                ),
                primary_language: Some("Python".to_string()),
                created_at: Utc.with_ymd_and_hms(2025, 10, 22, 0, 0, 0).single(),
                updated_at,
                stars: 5,
                forks: 2,
                watchers: 5,
                commit_count: 3,
                issues: StateCounts::new(1, 0),
                pull_requests: StateCounts::new(1, 0),
                url: Some("https://github.com/NoirStackLLC/GitTrack".to_string()),
            },
        ),
    ]
}
