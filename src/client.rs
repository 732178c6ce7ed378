use tracing::instrument;

use crate::config::HttpSettings;
use crate::error::{Result, ScrapeError};
use crate::model::FetchResult;
use crate::policy::SuccessPolicy;
use crate::scraper;
use crate::scraper::draft::DraftPage;
use crate::scraper::season_table::SeasonTableSchema;

/// Source of player stats for the batch loop.
///
/// [`PfrClient`] is the production implementation; tests drive the loop with
/// scripted fetchers.
#[allow(async_fn_in_trait)]
pub trait PlayerFetcher {
    /// Fetch stats for one non-empty player identifier.
    async fn fetch(&self, player_id: &str) -> FetchResult;
}

/// The main entry point for talking to pro-football-reference.com.
///
/// `PfrClient` wraps a [`reqwest::Client`] together with the season-table
/// schema and the success rule applied to every parsed page.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> pfr_scraper::Result<()> {
/// use pfr_scraper::{FetchResult, HttpSettings, PfrClient, SuccessPolicy};
///
/// let client = PfrClient::new(&HttpSettings::default(), SuccessPolicy::default())?;
/// if let FetchResult::Fetched(stats) = client.fetch_player("HopkDe00").await {
///     println!("{}: {:?}", stats.note, stats.totals.career_av);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PfrClient {
    http: reqwest::Client,
    base_url: String,
    schema: SeasonTableSchema,
    policy: SuccessPolicy,
}

impl PfrClient {
    /// Create a client with the configured timeout and user agent.
    pub fn new(settings: &HttpSettings, policy: SuccessPolicy) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .build()
            .map_err(ScrapeError::ClientBuild)?;
        Ok(Self::with_client(http, &settings.base_url, policy))
    }

    /// Create a client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need proxies, extra headers or a different host.
    pub fn with_client(client: reqwest::Client, base_url: &str, policy: SuccessPolicy) -> Self {
        Self {
            http: client,
            base_url: base_url.trim_end_matches('/').to_string(),
            schema: SeasonTableSchema::default(),
            policy,
        }
    }

    /// Replace the season-table schema used when parsing player pages.
    pub fn with_schema(mut self, schema: SeasonTableSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and parse one player page. Failures are reported in the result.
    #[instrument(skip(self))]
    pub async fn fetch_player(&self, player_id: &str) -> FetchResult {
        scraper::player::fetch_player(
            &self.http,
            &self.base_url,
            player_id,
            &self.schema,
            &self.policy,
        )
        .await
    }

    /// Fetch the draft class of `year`, keeping picks at `position`.
    #[instrument(skip(self))]
    pub(crate) async fn get_draft_class(&self, year: i32, position: &str) -> Result<DraftPage> {
        scraper::draft::get_draft_class(&self.http, &self.base_url, year, position).await
    }
}

impl PlayerFetcher for PfrClient {
    async fn fetch(&self, player_id: &str) -> FetchResult {
        self.fetch_player(player_id).await
    }
}
