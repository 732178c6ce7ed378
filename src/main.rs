use std::error::Error;

use chrono::{Datelike, Utc};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use pfr_scraper::{
    collect_draft_classes, draft_table, enrich_table, score_table, BatchPaths, FetchResult,
    PfrClient, Settings, Table,
};

mod cli;

use cli::{Cli, Command, DraftArgs, EnrichArgs, FetchArgs, ScoreArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    debug!(?args, "parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref())?;

    match args.command {
        Command::Draft(draft) => run_draft(&settings, draft).await,
        Command::Enrich(enrich) => {
            enrich.apply(&mut settings);
            settings.validate()?;
            run_enrich(&settings, enrich).await
        }
        Command::Fetch(fetch) => run_fetch(&settings, fetch).await,
        Command::Score(score) => run_score(&settings, score),
    }
}

async fn run_draft(settings: &Settings, args: DraftArgs) -> Result<(), Box<dyn Error>> {
    let to = args.to.unwrap_or_else(|| Utc::now().year() - 1);
    let position = args.position.unwrap_or_else(|| settings.draft.position.clone());
    if to < args.from {
        return Err(format!("--to {to} is before --from {}", args.from).into());
    }

    let client = PfrClient::new(&settings.http, settings.success.clone())?;
    let collection =
        collect_draft_classes(&client, args.from..=to, &position, settings.batch.delay()).await;

    if let Some(year) = collection.rate_limited_at {
        warn!(year, "draft collection stopped early on rate limiting");
    }
    if !collection.failed_years.is_empty() {
        warn!(years = ?collection.failed_years, "some draft years were skipped");
    }

    draft_table(&collection.picks).write_csv(&args.output)?;
    info!(
        picks = collection.picks.len(),
        output = %args.output.display(),
        "draft table written"
    );
    Ok(())
}

async fn run_enrich(settings: &Settings, args: EnrichArgs) -> Result<(), Box<dyn Error>> {
    let paths = BatchPaths {
        checkpoint: args.checkpoint(),
        output: args.output(),
    };
    let mut table = Table::read_csv(&args.input)?;
    info!(rows = table.len(), input = %args.input.display(), "loaded player table");

    let client = PfrClient::new(&settings.http, settings.success.clone())?;
    let report = enrich_table(&mut table, &client, &settings.batch, &paths).await?;

    match &report.rate_limited {
        Some(stop) => warn!(
            row = stop.row,
            player_id = %stop.player_id,
            checkpoint = %paths.checkpoint.display(),
            "stopped on rate limiting; rerun with the checkpoint as input to resume"
        ),
        None => info!(
            fetched = report.fetched,
            skipped = report.skipped,
            failed = report.failed,
            "all rows processed"
        ),
    }
    Ok(())
}

async fn run_fetch(settings: &Settings, args: FetchArgs) -> Result<(), Box<dyn Error>> {
    let client = PfrClient::new(&settings.http, settings.success.clone())?;
    let result = client.fetch_player(&args.player_id).await;
    if let FetchResult::RateLimited { retry_after_secs } = &result {
        warn!(?retry_after_secs, "rate limited");
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_score(settings: &Settings, args: ScoreArgs) -> Result<(), Box<dyn Error>> {
    let output = args.output.as_deref().unwrap_or(&args.input);
    let mut table = Table::read_csv(&args.input)?;
    let report = score_table(&mut table, &settings.scoring);
    table.write_csv(output)?;
    info!(
        scored = report.scored,
        successful = report.successful,
        "scores written"
    );
    Ok(())
}
