use crate::cli::commands::{Cli, Commands, UserCommands};
use anyhow::{Context, Result};
use linkshelf::Config;
use linkshelf::auth::SessionManager;
use linkshelf::error::FetchError;
use linkshelf::links::{MetadataFetcher, ReaderClient, normalize_target_url, summarize_document};
use linkshelf::store::SqliteBookmarkStore;
use std::sync::Arc;
use tracing::info;

async fn add_user(config: &Config, email: &str, password: &str) -> linkshelf::Result<()> {
    let store = SqliteBookmarkStore::open(&config.database_path()).await?;
    let sessions = SessionManager::new(Arc::new(store), config.auth.token_ttl_secs);
    let user = sessions.register(email, password).await?;
    println!("✓ Created user {} ({})", user.email, user.id);
    Ok(())
}

async fn summarize(config: &Config, url: &str, full: bool) -> linkshelf::Result<()> {
    let reader = ReaderClient::new(
        &config.reader.base_url,
        &config.reader.options(&config.fetch),
    )?;
    let raw = reader.fetch_raw(url).await?;
    let summary = summarize_document(&raw);

    println!("{}", summary.summary);
    if full {
        println!();
        println!("{}", summary.full_content);
    }
    Ok(())
}

async fn metadata(config: &Config, url: &str) -> linkshelf::Result<()> {
    let target = normalize_target_url(url);
    let parsed = url::Url::parse(&target).map_err(|e| FetchError::InvalidUrl {
        url: target.clone(),
        message: e.to_string(),
    })?;
    let fetcher = MetadataFetcher::new(&config.fetch.options())?;
    let metadata = fetcher.try_fetch(&parsed).await?;
    let rendered =
        serde_json::to_string_pretty(&metadata).context("Failed to render page metadata")?;
    println!("{rendered}");
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("Config:    {}", config.config_path.display());
    println!("Workspace: {}", config.workspace_dir.display());
    println!("Database:  {}", config.database_path().display());
    println!();
    print!(
        "{}",
        toml::to_string_pretty(config).context("Failed to serialize config")?
    );
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            info!("Starting gateway on {host}:{port}");
            linkshelf::gateway::run_gateway(&host, port, config).await
        }
        Commands::User {
            user_command: UserCommands::Add { email, password },
        } => Ok(add_user(&config, &email, &password).await?),
        Commands::Summarize { url, full } => Ok(summarize(&config, &url, full).await?),
        Commands::Metadata { url } => Ok(metadata(&config, &url).await?),
        Commands::Config => show_config(&config),
    }
}
