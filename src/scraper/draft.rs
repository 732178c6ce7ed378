use ::scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use crate::error::{Result, ScrapeError};
use crate::model::DraftPick;
use crate::scraper::{self, select_text, Page};

/// Draft page of one year, or the site's request to back off.
#[derive(Debug)]
pub(crate) enum DraftPage {
    Picks(Vec<DraftPick>),
    RateLimited,
}

#[instrument(skip(client))]
pub(crate) async fn get_draft_class(
    client: &reqwest::Client,
    base_url: &str,
    year: i32,
    position: &str,
) -> Result<DraftPage> {
    let url = format!("{}/years/{year}/draft.htm", base_url.trim_end_matches('/'));
    let body = match scraper::get_page(client, &url).await? {
        Page::Body(body) => body,
        Page::RateLimited { .. } => return Ok(DraftPage::RateLimited),
    };
    let document = Html::parse_document(&body);
    let picks = parse_draft_class(&document, year, position)?;
    debug!(count = picks.len(), year, position, "parsed draft class");
    Ok(DraftPage::Picks(picks))
}

/// Parse `table#drafts`, keeping only rows at `position`.
pub(crate) fn parse_draft_class(
    document: &Html,
    year: i32,
    position: &str,
) -> Result<Vec<DraftPick>> {
    let table_selector = Selector::parse("table#drafts")?;
    let row_selector = Selector::parse("tbody tr")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or(ScrapeError::ElementNotFound {
            context: "draft table",
        })?;

    table
        .select(&row_selector)
        .filter(|row| !row.value().classes().any(|c| c == "thead"))
        .filter_map(|row| parse_pick(&row, year, position).transpose())
        .collect()
}

fn parse_pick(row: &ElementRef, year: i32, position: &str) -> Result<Option<DraftPick>> {
    let stat = |name: &str| {
        Selector::parse(&format!(r#"[data-stat="{name}"]"#)).map_err(ScrapeError::from)
    };

    let pos = select_text(row, &stat("pos")?);
    if !pos.eq_ignore_ascii_case(position) {
        return Ok(None);
    }

    let player_selector = stat("player")?;
    let player_cell = row.select(&player_selector).next();
    let player_id = player_cell
        .and_then(|cell| cell.value().attr("data-append-csv"))
        .unwrap_or_default()
        .to_string();

    Ok(Some(DraftPick {
        year,
        player: select_text(row, &player_selector),
        player_id,
        position: pos,
        college: select_text(row, &stat("college_id")?),
        pick: select_text(row, &stat("draft_pick")?),
        round: select_text(row, &stat("draft_round")?),
        team: select_text(row, &stat("team")?),
    }))
}
