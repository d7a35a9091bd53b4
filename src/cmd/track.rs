use std::io::Write;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::context::AppContext;
use crate::domain::repository::RepositorySlug;
use crate::error::{AppError, AppResult};
use crate::report;
use crate::workflow::summary::fetch_summary_with;

/// Prints the activity report for one repository, each section as soon as the
/// fetch behind it has finished.
pub async fn run(
    ctx: &AppContext,
    slug: &RepositorySlug,
    now: NaiveDateTime,
    out: &mut impl Write,
) -> AppResult<()> {
    debug!(
        authenticated = ctx.config.has_token(),
        api_base = %ctx.config.api_base,
        "tracking repository"
    );
    report::write_header(out, slug, now)?;
    out.flush()?;

    let fetched = fetch_summary_with(ctx, slug, |stage| {
        report::write_stage(out, &stage)?;
        out.flush()?;
        Ok(())
    })
    .await;

    match fetched {
        Ok(summary) => {
            report::write_footer(out, summary.url.as_deref())?;
            Ok(())
        }
        Err(err @ AppError::RepositoryUnavailable(_)) => {
            report::write_failure(out)?;
            Err(err)
        }
        Err(err) => Err(err),
    }
}
