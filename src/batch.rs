//! Long-running, resumable loops over the site.
//!
//! Both loops are sequential and paced. The enrichment loop persists its
//! progress in the table itself, so a run interrupted by rate limiting or a
//! crash picks up where the last checkpoint left off.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use rand::{rng, Rng};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::client::{PfrClient, PlayerFetcher};
use crate::config::{BatchSettings, RateLimitPolicy};
use crate::error::{Result, ScrapeError};
use crate::model::{
    columns, is_row_complete, mark_failed, write_stats, DraftPick, EnrichmentStatus, FetchResult,
};
use crate::scraper::draft::DraftPage;
use crate::table::{non_empty, Table};

pub const NOTE_MISSING_ID: &str = "Missing player id";

/// Where the enrichment loop writes its files.
#[derive(Debug, Clone)]
pub struct BatchPaths {
    /// Rewritten periodically and when the loop stops on rate limiting.
    pub checkpoint: PathBuf,
    /// Written once, after the last row.
    pub output: PathBuf,
}

/// Row at which a run stopped because the site kept answering 429.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStop {
    pub row: usize,
    pub player_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Rows for which a page was fetched.
    pub fetched: usize,
    /// Rows already complete, or failed rows when retries are off.
    pub skipped: usize,
    /// Rows marked `FAILED` during this run.
    pub failed: usize,
    pub cooldowns: usize,
    pub rate_limited: Option<RateLimitStop>,
}

impl BatchReport {
    pub fn stopped_on_rate_limit(&self) -> bool {
        self.rate_limited.is_some()
    }
}

fn should_skip(table: &Table, row: usize, retry_failed: bool) -> bool {
    if is_row_complete(table, row) {
        return true;
    }
    !retry_failed
        && table
            .get(row, columns::STATUS)
            .and_then(|s| s.trim().parse::<EnrichmentStatus>().ok())
            == Some(EnrichmentStatus::Failed)
}

fn pause(settings: &BatchSettings) -> Duration {
    let jitter = if settings.jitter_ms > 0 {
        rng().random_range(0..=settings.jitter_ms)
    } else {
        0
    };
    settings.delay() + Duration::from_millis(jitter)
}

/// Enrich every incomplete row of `table` in place.
///
/// Fails when `settings` are invalid, the table has no `Player_ID` column, or
/// a checkpoint or output file cannot be written. Rate limiting ends the run early with `Ok`;
/// see [`BatchReport::rate_limited`].
#[instrument(skip_all, fields(rows = table.len(), checkpoint = %paths.checkpoint.display()))]
pub async fn enrich_table<F: PlayerFetcher>(
    table: &mut Table,
    fetcher: &F,
    settings: &BatchSettings,
    paths: &BatchPaths,
) -> Result<BatchReport> {
    settings.validate()?;
    if table.column(columns::PLAYER_ID).is_none() {
        return Err(ScrapeError::MissingColumn(columns::PLAYER_ID.to_string()));
    }
    for column in columns::ENRICHMENT {
        table.ensure_column(column);
    }

    let mut report = BatchReport::default();
    let mut consecutive_limits = 0;
    let mut row = 0;

    while row < table.len() {
        if should_skip(table, row, settings.retry_failed) {
            debug!(row, "already enriched, skipping");
            report.skipped += 1;
            row += 1;
            continue;
        }

        let Some(player_id) = table
            .get(row, columns::PLAYER_ID)
            .and_then(non_empty)
            .map(|id| id.trim().to_string())
        else {
            warn!(row, "row has no player id");
            mark_failed(table, row, NOTE_MISSING_ID);
            report.failed += 1;
            row += 1;
            continue;
        };

        let stats = match fetcher.fetch(&player_id).await {
            FetchResult::Fetched(stats) => stats,
            FetchResult::RateLimited { retry_after_secs } => {
                let rate_limit = &settings.rate_limit;
                if rate_limit.policy == RateLimitPolicy::Cooldown
                    && consecutive_limits < rate_limit.max_cooldowns
                {
                    let wait = rate_limit.cooldown(consecutive_limits, retry_after_secs);
                    consecutive_limits += 1;
                    report.cooldowns += 1;
                    warn!(
                        row,
                        player_id = %player_id,
                        attempt = consecutive_limits,
                        wait_secs = wait.as_secs(),
                        "rate limited, cooling down"
                    );
                    sleep(wait).await;
                    continue;
                }

                warn!(row, player_id = %player_id, "rate limited, saving checkpoint and stopping");
                table.write_csv(&paths.checkpoint)?;
                report.rate_limited = Some(RateLimitStop { row, player_id });
                return Ok(report);
            }
        };

        consecutive_limits = 0;
        report.fetched += 1;
        if !stats.status.is_complete() {
            report.failed += 1;
        }
        info!(
            row,
            player_id = %player_id,
            status = %stats.status,
            note = %stats.note,
            career_av = ?stats.totals.career_av,
            "enriched row"
        );
        write_stats(table, row, &stats);

        if report.fetched % settings.checkpoint_every == 0 {
            table.write_csv(&paths.checkpoint)?;
            info!(fetched = report.fetched, "checkpoint saved");
        }

        row += 1;
        if row < table.len() {
            if settings.idle_every > 0 && report.fetched % settings.idle_every == 0 {
                info!(secs = settings.idle_pause_secs, "idle pause");
                sleep(settings.idle_pause()).await;
            } else {
                sleep(pause(settings)).await;
            }
        }
    }

    table.write_csv(&paths.output)?;
    info!(
        fetched = report.fetched,
        skipped = report.skipped,
        failed = report.failed,
        output = %paths.output.display(),
        "enrichment finished"
    );
    Ok(report)
}

/// Picks gathered by [`collect_draft_classes`].
#[derive(Debug, Clone, Default)]
pub struct DraftCollection {
    pub picks: Vec<DraftPick>,
    /// Year whose page answered 429, ending collection.
    pub rate_limited_at: Option<i32>,
    pub failed_years: Vec<i32>,
}

/// Collect draft picks at `position` for every year in `years`.
///
/// Years whose page cannot be fetched or parsed are logged and skipped.
#[instrument(skip(client))]
pub async fn collect_draft_classes(
    client: &PfrClient,
    years: RangeInclusive<i32>,
    position: &str,
    delay: Duration,
) -> DraftCollection {
    let mut collection = DraftCollection::default();
    let last = *years.end();

    for year in years {
        match client.get_draft_class(year, position).await {
            Ok(DraftPage::Picks(picks)) => {
                info!(year, count = picks.len(), "collected draft class");
                collection.picks.extend(picks);
            }
            Ok(DraftPage::RateLimited) => {
                warn!(year, "rate limited, stopping draft collection");
                collection.rate_limited_at = Some(year);
                break;
            }
            Err(e) => {
                warn!(year, error = %e, "skipping draft year");
                collection.failed_years.push(year);
            }
        }
        if year < last {
            sleep(delay).await;
        }
    }

    collection
}
