//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, TargetArgs};
use crate::collection::Collection;
use crate::config::CollectionConfig;
use crate::error::{Error, Result, ResultExt};
use crate::pagination::PaginationTracker;
use crate::query_string::{QueryParamSynchronizer, UrlQueryStore};
use crate::types::RequestParams;
use serde_json::{json, Value};
use tracing::info;

/// Address bar used when the config selects the synchronizer without one
const DEFAULT_ADDRESS_BAR: &str = "http://localhost/";

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
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch { target } => self.fetch(target).await,
            Commands::Walk { target, max_pages } => self.walk(target, *max_pages).await,
        }
    }

    /// Load the config file if given and apply flag overrides
    pub fn resolve_config(&self, target: &TargetArgs) -> Result<CollectionConfig> {
        let mut config = match &self.cli.config {
            Some(path) => CollectionConfig::from_file(path)?,
            None => {
                let path = target
                    .path
                    .as_ref()
                    .ok_or_else(|| Error::config("Collection path not specified (use --path or --config)"))?;
                CollectionConfig::new(path)
            }
        };

        if let Some(path) = &target.path {
            config.path.clone_from(path);
        }
        if target.url.is_some() {
            config.base_url.clone_from(&target.url);
        }
        if target.items_path.is_some() {
            config.items_path.clone_from(&target.items_path);
        }

        let mut overrides = RequestParams::new();
        overrides.page = target.page;
        overrides.limit = target.limit;
        for (key, value) in &target.filters {
            overrides.insert(key.clone(), parse_filter_value(value));
        }
        config.params.merge(overrides);
        if target.address_bar.is_some() {
            config.mixins.query_string = true;
        }

        config.validate()?;
        Ok(config)
    }

    async fn fetch(&self, target: &TargetArgs) -> Result<()> {
        let (config, store) = self.prepare(target)?;
        let mut collection = Collection::from_config_with_store(&config, store.clone())?;
        collection.refresh().await?;
        print_line(&page_summary(&collection, &store));
        Ok(())
    }

    async fn walk(&self, target: &TargetArgs, max_pages: u32) -> Result<()> {
        let (config, store) = self.prepare(target)?;
        let mut collection = Collection::from_config_with_store(&config, store.clone())?;
        if collection.mixin::<PaginationTracker>().is_none() {
            let mut tracker = PaginationTracker::with_config(config.pagination.clone());
            tracker.seed_filters(&config.params.filters);
            collection = collection.mix(tracker)?;
        }

        collection.refresh().await?;
        let mut pages = 1;
        print_line(&page_summary(&collection, &store));

        while pages < max_pages && collection.has_next_page() {
            if !collection.next_page().await?.is_moved() {
                break;
            }
            pages += 1;
            print_line(&page_summary(&collection, &store));
        }

        info!("Walked {} pages of {}", pages, collection.path());
        Ok(())
    }

    /// Resolve the config and the address bar the synchronizer writes into
    fn prepare(&self, target: &TargetArgs) -> Result<(CollectionConfig, UrlQueryStore)> {
        let config = self.resolve_config(target)?;
        let address_bar = target.address_bar.as_deref().unwrap_or(DEFAULT_ADDRESS_BAR);
        let store = UrlQueryStore::parse(address_bar)
            .with_context(|| format!("Invalid address bar URL '{address_bar}'"))?;
        Ok((config, store))
    }
}

/// Interpret a filter flag as JSON when it parses, otherwise as text
fn parse_filter_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn page_summary(collection: &Collection, address_bar: &UrlQueryStore) -> Value {
    let total_count = collection
        .mixin::<PaginationTracker>()
        .and_then(PaginationTracker::total_count);
    let mut summary = json!({
        "page": collection.params().page,
        "limit": collection.params().limit,
        "total_count": total_count,
        "has_next_page": collection.has_next_page(),
        "has_prev_page": collection.has_prev_page(),
        "items": collection.items(),
    });
    if collection
        .mixin::<QueryParamSynchronizer<UrlQueryStore>>()
        .is_some()
    {
        summary["address_bar"] = Value::String(address_bar.url().to_string());
    }
    summary
}

fn print_line(value: &Value) {
    println!("{value}");
}
