pub(crate) mod draft;
pub(crate) mod honors;
pub(crate) mod player;
pub mod season_table;

pub(crate) use ::scraper::Html;
use ::scraper::{ElementRef, Selector};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{Result, ScrapeError};

/// Body of a fetched page, or the site's request to back off.
#[derive(Debug)]
pub(crate) enum Page {
    Body(String),
    RateLimited { retry_after_secs: Option<u64> },
}

/// Fetch a URL. 429 is reported as [`Page::RateLimited`], any other
/// non-success status as [`ScrapeError::UnexpectedStatus`].
pub(crate) async fn get_page(client: &reqwest::Client, url: &str) -> Result<Page> {
    debug!(url, "fetching page");

    let response = client.get(url).send().await.map_err(|e| ScrapeError::Http {
        url: url.to_owned(),
        source: e,
    })?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        return Ok(Page::RateLimited { retry_after_secs });
    }
    if !status.is_success() {
        return Err(ScrapeError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        });
    }

    let body = response.text().await.map_err(|e| ScrapeError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })?;

    Ok(Page::Body(body))
}

/// Extract trimmed text content from the first element matching `selector`
/// inside `element`. Returns an empty string if nothing matches.
pub(crate) fn select_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|e| element_text(&e))
        .unwrap_or_default()
}

/// All text below `element`, trimmed pieces joined without separators.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

/// Text of every HTML comment in the document, in document order.
///
/// The site ships many secondary tables commented out and un-comments them
/// client side, so they only exist here as raw markup.
pub(crate) fn comments(document: &Html) -> impl Iterator<Item = &str> {
    document
        .tree
        .nodes()
        .filter_map(|node| node.value().as_comment())
        .map(|comment| &**comment)
}
