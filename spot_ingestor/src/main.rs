use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use spot_ingestor::archive::FsArchiveStore;
use spot_ingestor::archiver::Archiver;
use spot_ingestor::cli::commands::{Cli, Commands};
use spot_ingestor::cli::params::{parse_naive_date, parse_utc_datetime};
use spot_ingestor::config::Settings;
use spot_ingestor::providers::entsoe::EntsoeProvider;
use spot_ingestor::ratelimit::RateLimiter;
use spot_ingestor::reconcile::{ReconciliationEngine, TransportPolicy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Commands::Backfill {
            start,
            end,
            price_area,
        } => {
            let start = parse_utc_datetime(&start)
                .with_context(|| format!("invalid --start '{start}'"))?;
            let end = match end {
                Some(raw) => {
                    parse_utc_datetime(&raw).with_context(|| format!("invalid --end '{raw}'"))?
                }
                None => Utc::now(),
            };
            run_ingestion(
                &settings,
                &price_area,
                start,
                end,
                TransportPolicy::SkipWindow,
                false,
            )
            .await?;
        }

        Commands::DayAhead {
            days_ahead,
            days_behind,
            price_area,
        } => {
            let now = Utc::now();
            let start = now - Duration::days(days_behind);
            let end = now + Duration::days(days_ahead);
            run_ingestion(
                &settings,
                &price_area,
                start,
                end,
                TransportPolicy::Fail,
                true,
            )
            .await?;
        }

        Commands::Stats { day, price_area } => {
            let day = parse_naive_date(&day).with_context(|| format!("invalid --day '{day}'"))?;
            settings
                .area(&price_area)
                .ok_or_else(|| spot_ingestor::errors::Error::UnknownPriceArea(price_area.clone()))?;
            let store = FsArchiveStore::new(settings.archive_dir.clone());
            let stats = spot_ingestor::stats::record_day_statistics(&store, &price_area, day)
                .await
                .with_context(|| format!("computing statistics for {price_area} on {day}"))?;
            tracing::info!(
                area = %price_area,
                %day,
                lowest = %stats.lowest_price,
                highest = %stats.highest_price,
                average = %stats.average_price,
                "day statistics recorded"
            );
        }
    }

    Ok(())
}

async fn run_ingestion(
    settings: &Settings,
    area_code: &str,
    start: chrono::DateTime<Utc>,
    end: chrono::DateTime<Utc>,
    policy: TransportPolicy,
    refresh_latest: bool,
) -> Result<(), spot_ingestor::errors::Error> {
    let area = settings
        .area(area_code)
        .ok_or_else(|| spot_ingestor::errors::Error::UnknownPriceArea(area_code.to_string()))?
        .clone();

    let limiter = Arc::new(RateLimiter::new(
        settings.rate_limit.max_calls,
        settings.rate_limit.period(),
    ));
    let provider = EntsoeProvider::new(settings.base_url.clone())?;
    let engine = ReconciliationEngine::new(provider, limiter);

    let series = engine.run(&area, start, end, policy).await?;
    tracing::info!(
        area = %area.code,
        points = series.len(),
        "reconciliation finished"
    );

    let archiver = Archiver::new(
        FsArchiveStore::new(settings.archive_dir.clone()),
        settings.merge_policy,
    );
    archiver.merge_run(&area.code, &series).await?;
    if refresh_latest {
        archiver.update_latest(&area.code, &series).await?;
    }
    Ok(())
}
