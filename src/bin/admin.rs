//! CLI administration tool for url-minifier.
//!
//! Inspects and maintains the URL store without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show record counts
//! cargo run --bin admin -- stats
//!
//! # Inspect a short code without counting a click
//! cargo run --bin admin -- lookup K9x2LmQ4ab
//!
//! # List placeholders that never received a code
//! cargo run --bin admin -- orphans list
//!
//! # Delete placeholders older than 10 minutes
//! cargo run --bin admin -- orphans sweep --older-than 600
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`

use url_minifier::application::services::{AllocatorSettings, UrlService};
use url_minifier::config::{Config, mask_connection_string};
use url_minifier::infrastructure::persistence::PgUrlRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing url-minifier.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show record counts
    Stats,

    /// Show the record behind a short code
    Lookup {
        /// Short code to look up
        code: String,
    },

    /// Inspect or remove placeholders that never received a code
    Orphans {
        #[command(subcommand)]
        action: OrphanAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum OrphanAction {
    /// List orphan placeholders
    List,

    /// Delete orphan placeholders
    Sweep {
        /// Only delete placeholders older than this many seconds
        #[arg(long, default_value_t = 600)]
        older_than: u64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;

    let pool = PgPool::connect(&database_url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database at {}",
                mask_connection_string(&database_url)
            )
        })?;

    let service = UrlService::new(
        Arc::new(PgUrlRepository::new(Arc::new(pool.clone()))),
        AllocatorSettings::default(),
    );

    match cli.command {
        Commands::Stats => handle_stats(&pool, &service).await?,
        Commands::Lookup { code } => handle_lookup(&service, &code).await?,
        Commands::Orphans { action } => handle_orphan_action(action, &pool, &service).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Displays record and click totals.
async fn handle_stats(pool: &PgPool, service: &UrlService) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let page = service
        .list_urls(Some(1), Some(1), Duration::from_secs(5))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count URLs: {}", e))?;

    let orphans = service
        .count_orphans()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count orphans: {}", e))?;

    let clicks: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(click_count), 0)::BIGINT FROM urls")
        .fetch_one(pool)
        .await?;

    println!(
        "  Records:    {}",
        (page.total_count + orphans)
            .to_string()
            .bright_white()
            .bold()
    );
    println!(
        "  Short URLs: {}",
        page.total_count.to_string().bright_green().bold()
    );
    println!("  Clicks:     {}", clicks.to_string().bright_green().bold());

    let orphans = orphans.to_string();
    println!(
        "  Orphans:    {}",
        if orphans == "0" {
            orphans.bright_green().bold()
        } else {
            orphans.yellow().bold()
        }
    );
    println!();

    Ok(())
}

/// Prints one record without touching its click count.
async fn handle_lookup(service: &UrlService, code: &str) -> Result<()> {
    let record = service
        .get_record(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", "🔎 Short URL".bright_blue().bold());
    println!();
    println!("  Code:     {}", code.cyan());
    println!("  Long URL: {}", record.long_url.bright_white());
    println!(
        "  Clicks:   {}",
        record.click_count.to_string().bright_green()
    );
    println!("  Created:  {}", format_time(record.created_at));
    println!(
        "  Accessed: {}",
        record
            .last_accessed_at
            .map(format_time)
            .unwrap_or_else(|| "never".bright_black().to_string())
    );
    println!();

    Ok(())
}

async fn handle_orphan_action(
    action: OrphanAction,
    pool: &PgPool,
    service: &UrlService,
) -> Result<()> {
    match action {
        OrphanAction::List => list_orphans(pool).await,
        OrphanAction::Sweep { older_than, yes } => sweep_orphans(service, older_than, yes).await,
    }
}

/// Lists placeholders that never received a code, oldest first.
async fn list_orphans(pool: &PgPool) -> Result<()> {
    println!("{}", "🧹 Orphan placeholders".bright_blue().bold());
    println!();

    let rows: Vec<(i64, String, DateTime<Utc>)> = sqlx::query_as(
        "SELECT id, long_url, created_at FROM urls WHERE short_code IS NULL ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        println!("{}", "  No orphans found".green());
        println!();
        return Ok(());
    }

    println!(
        "  {:<8} {:<20} {}",
        "ID".bright_white().bold(),
        "Created".bright_white().bold(),
        "Long URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for (id, long_url, created_at) in &rows {
        println!(
            "  {:<8} {:<20} {}",
            id.to_string().bright_black(),
            format_time(*created_at),
            long_url.cyan()
        );
    }

    println!();
    println!("  Total: {}", rows.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes orphan placeholders older than `older_than` seconds.
async fn sweep_orphans(service: &UrlService, older_than: u64, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Sweep orphan placeholders".bright_blue().bold());
    println!();
    println!(
        "  Deleting placeholders without a code created more than {}s ago",
        older_than.to_string().cyan()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Proceed?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = service
        .sweep_orphans(Duration::from_secs(older_than))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to sweep orphans: {}", e))?;

    println!(
        "{} {}",
        "✅ Deleted".green().bold(),
        deleted.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}
