//! List command: load a module's list and print each record.
//!
//! The first page is loaded, then `--pages` more are paginated. Load
//! failures arrive as collection events and abort the command.

use std::sync::Arc;

use anyhow::{Context, Result};
use ox_core::QueryParams;
use ox_sdk::collections::{CollectionEvent, LoaderConfig, Passthrough};
use ox_sdk::SDK;
use serde_json::Value;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::info;

use super::render::{self, RECORD_POINT};
use crate::cli::ListArgs;
use crate::config::Config;
use crate::error::OxError;

/// Execute list command.
pub async fn execute(args: ListArgs, config: &Config) -> Result<()> {
    let sdk = SDK::new(config.sdk.clone())?;
    for line in run(&args, &sdk).await? {
        println!("{}", line);
    }
    Ok(())
}

/// Load and render; returns one line per record.
pub async fn run(args: &ListArgs, sdk: &SDK) -> Result<Vec<String>> {
    if let Some(ref path) = args.rampup {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rampup file {}", path.display()))?;
        let value: Value = serde_json::from_str(&content).context("Failed to parse rampup file")?;
        let added = sdk.rampup().load_json(value).await?;
        info!("Loaded {} rampup entries", added);
    }

    render::register_defaults(sdk.extensions()).await?;
    let point = sdk.extensions().point(RECORD_POINT).await;

    let mut loader_config = LoaderConfig::new(args.module.clone())
        .with_limit(args.limit.unwrap_or(sdk.config().page_size));
    loader_config.ignore = sdk.config().ignore_params.clone();
    if let Some(ref columns) = args.columns {
        loader_config = loader_config.with_columns(columns.clone());
    }
    let loader = sdk.loader_with(loader_config).with_hooks(Arc::new(Passthrough));

    let params: QueryParams = args.params.iter().cloned().collect();
    let collection = loader.collection_for(&params).await;
    let mut events = collection.subscribe();

    loader.load(&params).await;
    let mut complete = check_events(&mut events, &args.module)?;

    for _ in 0..args.pages {
        if complete {
            break;
        }
        loader.paginate(&params).await;
        complete = check_events(&mut events, &args.module)?;
    }

    let mut lines = Vec::new();
    for record in collection.records().await {
        let line = if args.json {
            serde_json::to_string(&record)?
        } else {
            render::render(&point, &record).await?
        };
        lines.push(line);
    }
    Ok(lines)
}

/// Drain pending events. Fails on a load failure, returns whether the end
/// of the list was reached.
fn check_events(
    events: &mut broadcast::Receiver<CollectionEvent>,
    module: &str,
) -> Result<bool> {
    let mut complete = false;
    loop {
        match events.try_recv() {
            Ok(CollectionEvent::Failed { operation, error }) => {
                return Err(OxError::LoadFailed {
                    module: module.to_string(),
                    operation: operation.to_string(),
                    error,
                }
                .into());
            }
            Ok(CollectionEvent::Complete) => complete = true,
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    Ok(complete)
}
