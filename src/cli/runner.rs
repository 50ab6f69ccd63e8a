//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::engine::{SyncEngine, SyncResult};
use crate::http::HttpClient;
use crate::pagination::{HydraFetcher, PageCursor, PageFetcher, PaginationDriver};
use crate::store::{DuckDbStore, StoreGateway};
use anyhow::Context;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        match &self.cli.command {
            Commands::Sync { format } => self.sync(&config, *format).await,
            Commands::Check => self.check(&config).await,
            Commands::Ids => self.ids(&config).await,
        }
    }

    /// Load configuration and apply command-line overrides
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config =
            Config::load(self.cli.config.as_deref()).context("invalid configuration")?;
        if let Some(path) = &self.cli.store {
            config.store.path.clone_from(path);
            config.validate().context("invalid configuration")?;
        }
        Ok(config)
    }

    async fn sync(&self, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
        let store = Arc::new(open_store(config)?);
        let fetcher = Arc::new(build_fetcher(config)?);
        let driver = PaginationDriver::new(fetcher).with_guard(config.pagination_guard());

        info!(
            "Synchronizing {} into {}",
            config.source.base_url,
            store.location()
        );
        let engine = SyncEngine::new(driver, store).with_config(config.sync_config());
        let result = engine
            .synchronize()
            .await
            .context("synchronization failed")?;

        println!("{}", render_result(&result, format)?);
        Ok(())
    }

    async fn check(&self, config: &Config) -> anyhow::Result<()> {
        let fetcher = build_fetcher(config)?;
        let page = fetcher
            .fetch_page(&PageCursor::First)
            .await
            .with_context(|| format!("failed to fetch {}", fetcher.base_url()))?;

        let report = json!({
            "status": "SUCCEEDED",
            "url": fetcher.base_url().as_str(),
            "records": page.records.len(),
            "total_items": page.total_items,
            "has_next": !page.is_last(),
            "has_aggregations": page.aggregations.is_some(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    async fn ids(&self, config: &Config) -> anyhow::Result<()> {
        let store = open_store(config)?;
        for identifier in store.all_identifiers().await? {
            println!("{identifier}");
        }
        Ok(())
    }
}

fn open_store(config: &Config) -> anyhow::Result<DuckDbStore> {
    DuckDbStore::open(&config.store.path)
        .with_context(|| format!("failed to open store at {}", config.store.path))
}

fn build_fetcher(config: &Config) -> anyhow::Result<HydraFetcher> {
    let client = HttpClient::with_config(config.http_client_config())?;
    let fetcher = HydraFetcher::new(
        client,
        &config.source.base_url,
        config.source.items_per_page,
    )?;
    Ok(fetcher)
}

/// Format a run summary for stdout
pub(crate) fn render_result(result: &SyncResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Pretty => Ok(format!("Synchronized {result}")),
    }
}
