//! Command-line interface.
//!
//! Every option can also come from an environment variable. Flags override the
//! settings file, which overrides the built-in defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use pfr_scraper::{RateLimitPolicy, Settings};

/// Scrape wide-receiver careers from pro-football-reference.com.
///
/// # Examples
///
/// ```sh
/// # Collect draft classes, enrich them, then score the result
/// pfr-scraper draft --from 2013 --to 2022 -o wr_draft.csv
/// pfr-scraper enrich -i wr_draft.csv -o wr_enriched.csv
/// pfr-scraper score -i wr_enriched.csv -o wr_scored.csv
///
/// # Inspect a single player page
/// RUST_LOG=debug pfr-scraper fetch HopkDe00
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a settings YAML file
    #[arg(short, long, global = true, env = "PFR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect draft picks at one position into a new player table
    Draft(DraftArgs),
    /// Fill career stats into every incomplete row of a player table
    Enrich(EnrichArgs),
    /// Fetch one player page and print the parsed result as JSON
    Fetch(FetchArgs),
    /// Add success and performance scores to an enriched table
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
pub struct DraftArgs {
    /// First draft year
    #[arg(long, default_value_t = 2013)]
    pub from: i32,

    /// Last draft year [default: last year]
    #[arg(long)]
    pub to: Option<i32>,

    /// Position to keep, as printed in the draft table
    #[arg(long, env = "PFR_POSITION")]
    pub position: Option<String>,

    /// Output CSV file
    #[arg(short, long, default_value = "wr_draft.csv")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// Player table to enrich
    #[arg(short, long)]
    pub input: PathBuf,

    /// Final output file [default: the input file]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Checkpoint file [default: <output>.checkpoint.csv]
    #[arg(long, env = "PFR_CHECKPOINT")]
    pub checkpoint: Option<PathBuf>,

    /// What to do when the site answers 429: abort or cooldown
    #[arg(long, env = "PFR_ON_RATE_LIMIT")]
    pub on_rate_limit: Option<RateLimitPolicy>,

    /// Pause between players, in milliseconds
    #[arg(long, env = "PFR_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// Leave rows marked FAILED by an earlier run alone
    #[arg(long)]
    pub skip_failed: bool,
}

impl EnrichArgs {
    pub fn output(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.input.clone())
    }

    pub fn checkpoint(&self) -> PathBuf {
        self.checkpoint.clone().unwrap_or_else(|| {
            let mut name = self.output().into_os_string();
            name.push(".checkpoint.csv");
            PathBuf::from(name)
        })
    }

    /// Fold the flags into `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(policy) = self.on_rate_limit {
            settings.batch.rate_limit.policy = policy;
        }
        if let Some(delay_ms) = self.delay_ms {
            settings.batch.delay_ms = delay_ms;
        }
        if self.skip_failed {
            settings.batch.retry_failed = false;
        }
    }
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Site identifier, e.g. HopkDe00
    pub player_id: String,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Enriched player table
    #[arg(short, long)]
    pub input: PathBuf,

    /// Scored output file [default: the input file]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
