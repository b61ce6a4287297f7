//! CLI administration tool for snaplink.
//!
//! Runs analytics syncs, inspects the click queue, reads statistics and manages the
//! ad redirect setting without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Drain one batch of sampled clicks into the database
//! cargo run --bin admin -- sync
//!
//! # Show the analytics queue length
//! cargo run --bin admin -- queue
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Read or replace the ad redirect URL
//! cargo run --bin admin -- ad-url get
//! cargo run --bin admin -- ad-url set https://example.com/promo
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see [`snaplink::config`]. Commands touching the cache
//! require Redis.

use snaplink::application::services::{
    AnalyticsSync, SettingsService, StatsService, SyncOutcome,
};
use snaplink::config::{self, Config};
use snaplink::infrastructure::cache::{CacheService, RedisCache, keys};
use snaplink::infrastructure::persistence::{
    PgClickLogRepository, PgLinkRepository, PgSettingsRepository,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing snaplink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Run one analytics sync pass
    Sync {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show the analytics queue length
    Queue,

    /// Show statistics
    Stats,

    /// Manage the ad redirect URL
    AdUrl {
        #[command(subcommand)]
        action: AdUrlAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum AdUrlAction {
    /// Print the current URL
    Get,

    /// Replace the URL
    Set { url: String },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

/// Connections shared by all commands.
struct Admin {
    pool: Arc<PgPool>,
    config: Config,
}

impl Admin {
    async fn cache(&self) -> Result<Arc<dyn CacheService>> {
        let redis_url = self
            .config
            .redis_url
            .as_deref()
            .context("REDIS_URL must be set for this command")?;

        let cache = RedisCache::connect(redis_url)
            .await
            .context("Failed to connect to Redis")?;

        Ok(Arc::new(cache))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let admin = Admin {
        pool: Arc::new(pool),
        config,
    };

    match cli.command {
        Commands::Sync { yes } => handle_sync(&admin, yes).await?,
        Commands::Queue => handle_queue(&admin).await?,
        Commands::Stats => handle_stats(&admin).await?,
        Commands::AdUrl { action } => handle_ad_url(&admin, action).await?,
        Commands::Db { action } => handle_db_action(action, &admin.pool).await?,
    }

    Ok(())
}

/// Runs one sync pass after showing how much is queued.
async fn handle_sync(admin: &Admin, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔄 Analytics Sync".bright_blue().bold());
    println!();

    let cache = admin.cache().await?;
    let queued = cache.llen(keys::ANALYTICS_QUEUE).await?;

    println!("  Queued:     {}", queued.to_string().bright_white().bold());
    println!(
        "  Batch size: {}",
        admin.config.sync_batch_size.to_string().bright_white()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Run a sync pass now?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let sync = AnalyticsSync::new(
        cache,
        Arc::new(PgLinkRepository::new(admin.pool.clone())),
        Arc::new(PgClickLogRepository::new(admin.pool.clone())),
        admin.config.sync_batch_size,
    );

    match sync
        .sync()
        .await
        .map_err(|e| anyhow::anyhow!("Sync failed: {}", e))?
    {
        SyncOutcome::Empty => println!("{}", "  Nothing to sync".yellow()),
        SyncOutcome::AlreadyRunning => {
            println!("{}", "⚠️  Another sync is already running".yellow())
        }
        SyncOutcome::Synced(report) => {
            println!("{}", "✅ Sync complete".green().bold());
            println!();
            println!("  Read:      {}", report.read.to_string().bright_white());
            println!(
                "  Processed: {}",
                report.processed.to_string().bright_green().bold()
            );
            println!("  Skipped:   {}", report.skipped.to_string().yellow());
            println!("  Failed:    {}", report.failed.to_string().red());
        }
    }
    println!();

    Ok(())
}

async fn handle_queue(admin: &Admin) -> Result<()> {
    let cache = admin.cache().await?;
    let queued = cache.llen(keys::ANALYTICS_QUEUE).await?;

    println!(
        "  {}: {}",
        keys::ANALYTICS_QUEUE.bright_cyan(),
        queued.to_string().bright_white().bold()
    );

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links
/// - Reconciled click total
/// - Number of sampled click logs
/// - Analytics queue length, when Redis is configured
async fn handle_stats(admin: &Admin) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let cache = admin.cache().await?;
    let stats = StatsService::new(
        cache,
        Arc::new(PgLinkRepository::new(admin.pool.clone())),
        Arc::new(PgClickLogRepository::new(admin.pool.clone())),
    );

    let overview = stats
        .overview()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    println!(
        "  Links:          {}",
        overview.total_links.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:         {}",
        overview.total_clicks.to_string().bright_green().bold()
    );
    println!(
        "  Sampled clicks: {}",
        overview.sampled_clicks.to_string().bright_green().bold()
    );
    match overview.queue_length {
        Some(len) => println!("  Queued:         {}", len.to_string().bright_white()),
        None => println!("  Queued:         {}", "unavailable".bright_black()),
    }
    println!();

    Ok(())
}

async fn handle_ad_url(admin: &Admin, action: AdUrlAction) -> Result<()> {
    let settings = SettingsService::new(
        admin.cache().await?,
        Arc::new(PgSettingsRepository::new(admin.pool.clone())),
    );

    match action {
        AdUrlAction::Get => {
            println!("  {}", settings.ad_redirect_url().await.bright_white());
        }
        AdUrlAction::Set { url } => {
            let saved = settings
                .set_ad_redirect_url(&url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to update ad URL: {}", e))?;

            println!("{}", "✅ Ad redirect URL updated".green().bold());
            println!("  {}", saved.bright_white());
        }
    }

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

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
