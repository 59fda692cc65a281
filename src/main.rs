//! Demo site for the calendar date picker.
//!
//! Usage: cargo run
//!        cargo run -- --bind 127.0.0.1:8080
//!        cargo run -- --config picker.toml

mod candidates;
mod config;
mod error;
mod form;
mod picker;
mod range;
mod render;
mod routes;
mod storybook;

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dotenvy::EnvLoader;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::routes::AppState;

#[derive(Parser, Debug)]
#[command(name = "calendar-picker")]
#[command(about = "Serve the calendar date picker demo page")]
struct Args {
    /// TOML config file (default: picker.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config and PICKER_BIND)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // A missing .env file is fine
    let dotenv = EnvLoader::new().load().unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load(args.config.as_deref(), args.bind, |key| {
        dotenv.get(key).cloned().or_else(|| std::env::var(key).ok())
    })?;
    tracing::info!(
        bind = %config.bind,
        timezone = %config.timezone,
        min_year = config.bounds.min_year,
        max_year = config.bounds.max_year,
        "starting calendar picker demo"
    );

    fs::create_dir_all(&config.static_dir)?;

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    let app = routes::app(AppState::new(config));
    axum::serve(listener, app).await?;

    Ok(())
}
