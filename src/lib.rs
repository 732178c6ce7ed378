pub use batch::{
    collect_draft_classes, enrich_table, BatchPaths, BatchReport, DraftCollection, RateLimitStop,
};
pub use client::{PfrClient, PlayerFetcher};
pub use config::{BatchSettings, HttpSettings, RateLimitPolicy, RateLimitSettings, Settings};
pub use error::{Result, ScrapeError};
pub use model::*;
pub use policy::{BlendedThresholds, CriteriaThresholds, SuccessInputs, SuccessPolicy};
pub use score::{score_table, ScoreReport, ScoringSettings};
pub use crate::scraper::honors::{parse_awards_summary, parse_honors};
pub use crate::scraper::player::parse_player_page;
pub use crate::scraper::season_table::{SeasonTable, SeasonTableSchema, SCHEMA_VERSION};
pub use table::Table;

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod policy;
pub mod score;
pub(crate) mod scraper;
pub mod table;
