use tracing::{debug, instrument, warn};

use crate::error::{Result, ScrapeError};
use crate::model::{FetchResult, FetchStatus, PerGameRates, PlayerStats};
use crate::policy::{SuccessInputs, SuccessPolicy};
use crate::scraper::honors::{parse_honors, recognition_text};
use crate::scraper::season_table::{SeasonTable, SeasonTableSchema};
use crate::scraper::{self, Html, Page};

pub(crate) const NOTE_SUCCESS: &str = "Success";
pub(crate) const NOTE_REQUEST_FAILED: &str = "Request failed";
pub(crate) const NOTE_TABLE_NOT_FOUND: &str = "Table not found";
pub(crate) const NOTE_NO_DATA: &str = "No valid data (opt out/suspension?)";

/// Canonical player page URL: `{base}/players/{first letter}/{id}.htm`.
pub(crate) fn player_url(base_url: &str, player_id: &str) -> Option<String> {
    let first = player_id.chars().next()?;
    Some(format!(
        "{}/players/{first}/{player_id}.htm",
        base_url.trim_end_matches('/')
    ))
}

/// Fetch and parse one player page.
///
/// Never fails: request and parse errors come back as a [`FetchStatus`] and a
/// note on an otherwise empty result.
#[instrument(skip(client, schema, policy))]
pub(crate) async fn fetch_player(
    client: &reqwest::Client,
    base_url: &str,
    player_id: &str,
    schema: &SeasonTableSchema,
    policy: &SuccessPolicy,
) -> FetchResult {
    let Some(url) = player_url(base_url, player_id) else {
        return FetchResult::Fetched(PlayerStats::empty(FetchStatus::Error, "Missing player id"));
    };

    match scraper::get_page(client, &url).await {
        Ok(Page::RateLimited { retry_after_secs }) => {
            warn!(player_id, ?retry_after_secs, "rate limited");
            FetchResult::RateLimited { retry_after_secs }
        }
        Ok(Page::Body(body)) => FetchResult::Fetched(parse_player_page(&body, schema, policy)),
        Err(ScrapeError::UnexpectedStatus { status, .. }) => {
            warn!(player_id, %status, "player page request failed");
            FetchResult::Fetched(PlayerStats::empty(
                FetchStatus::RequestFailed,
                NOTE_REQUEST_FAILED,
            ))
        }
        Err(e) => {
            warn!(player_id, error = %e, "player page fetch error");
            FetchResult::Fetched(PlayerStats::empty(FetchStatus::Error, e.to_string()))
        }
    }
}

/// Parse a player page body into stats.
pub fn parse_player_page(
    body: &str,
    schema: &SeasonTableSchema,
    policy: &SuccessPolicy,
) -> PlayerStats {
    let document = Html::parse_document(body);
    match parse_document(&document, schema, policy) {
        Ok(stats) => stats,
        Err(e @ ScrapeError::SchemaMismatch { .. }) => {
            warn!(error = %e, "season table layout not recognised");
            PlayerStats::empty(FetchStatus::SchemaMismatch, e.to_string())
        }
        Err(e) => PlayerStats::empty(FetchStatus::Error, e.to_string()),
    }
}

fn parse_document(
    document: &Html,
    schema: &SeasonTableSchema,
    policy: &SuccessPolicy,
) -> Result<PlayerStats> {
    let honors = recognition_text(document)?
        .map(|text| parse_honors(&text))
        .unwrap_or_default();

    let Some(table) = SeasonTable::find(document, schema)? else {
        debug!("no season table on page");
        return Ok(PlayerStats {
            honors: Some(honors),
            ..PlayerStats::empty(FetchStatus::TableNotFound, NOTE_TABLE_NOT_FOUND)
        });
    };

    let totals = table.career_totals(schema)?;
    if totals.career_av.is_none() && totals.games_played.is_none() {
        return Ok(PlayerStats {
            honors: Some(honors),
            ..PlayerStats::empty(FetchStatus::NoData, NOTE_NO_DATA)
        });
    }

    let per_game = PerGameRates::from_totals(&totals);
    let successful = policy.classify(&SuccessInputs {
        career_av: totals.career_av,
        games_played: totals.games_played,
        rec_per_game: per_game.receptions,
        yards_per_game: per_game.yards,
        td_per_game: per_game.touchdowns,
        estimated_seasons: totals.seasons_played,
        pro_bowls: honors.pro_bowls,
        all_pros: honors.all_pros,
        thousand_yard_seasons: totals.thousand_yard_seasons,
    });

    debug!(
        career_av = ?totals.career_av,
        games = ?totals.games_played,
        ?successful,
        "parsed player page"
    );

    Ok(PlayerStats {
        status: FetchStatus::Success,
        note: NOTE_SUCCESS.to_string(),
        totals,
        per_game,
        honors: Some(honors),
        successful,
    })
}
