use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reelshelf::{
    Ctx,
    config::AppConfig,
    db, logging, routes,
};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "reelshelf", version, about = "Catalog local movie and TV directories")]
struct Cli {
    /// Configuration file (defaults to ./reelshelf.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Drop records for vanished directories, then catalog new movie and TV directories
    Scrape,
    /// Resolve one title and print what would be stored
    Resolve {
        /// Free-text title, e.g. "The Bourne Legacy 2012"
        title: String,
    },
    /// Serve the JSON API and stored posters
    Serve,
    /// Delete every record, keep poster images
    ClearDb,
    /// Delete every record and every stored poster image
    ClearData,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _guard = logging::init(&config.log);

    let pool = db::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let ctx = Ctx::from_config(pool, config).context("Failed to build scraper")?;

    match cli.command {
        Command::Scrape => scrape(&ctx).await,
        Command::Resolve { title } => resolve(&ctx, &title).await,
        Command::Serve => serve(ctx).await,
        Command::ClearDb => clear_db(&ctx).await,
        Command::ClearData => clear_data(&ctx).await,
    }
}

async fn scrape(ctx: &Ctx) -> Result<()> {
    let report = ctx
        .catalog_agent
        .run(&ctx.config.movie_directory, &ctx.config.tv_directory)
        .await?;

    for failure in &report.failed {
        warn!("Not cataloged: {} ({})", failure.path.display(), failure.error);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn resolve(ctx: &Ctx, title: &str) -> Result<()> {
    let result = ctx.catalog_agent.resolver().resolve(title).await?;

    println!("{result}");
    if let Some(url) = result.picked_url() {
        println!("url: {url}");
    }
    if let Some(image) = &result.details.image {
        println!("image: {}", image.display());
    }
    for candidate in &result.candidates {
        println!("  - {} <{}>", candidate, candidate.title_url);
    }
    Ok(())
}

async fn serve(ctx: Ctx) -> Result<()> {
    let address = ctx.config.server.address();
    let app = routes::router(ctx);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

async fn clear_db(ctx: &Ctx) -> Result<()> {
    let records = ctx.clear_db().await?;
    info!("Removed {} records", records);
    Ok(())
}

async fn clear_data(ctx: &Ctx) -> Result<()> {
    let (records, images) = ctx.clear_data().await?;
    info!("Removed {} records and {} images", records, images);
    Ok(())
}
