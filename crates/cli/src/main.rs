//! `stockroll`: compute inventory for a batch of product configurations.
//!
//! Usage:
//!   stockroll [--request <file>] (--variants-file <file> | --database-url <url>)
//!
//! The request is an `InventoryRequest` JSON document (stdin when no file is
//! given). Results are printed to stdout as a JSON array.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::info;

use stockroll_infra::{
    InMemoryVariantStore, InventoryConfig, InventoryContext, InventoryRequest, PostgresVariantStore,
    VariantStore, compute_inventory,
};
use stockroll_inventory::LowQuantityPolicyKind;

/// Variant inventory aggregation.
#[derive(Parser, Debug)]
#[command(name = "stockroll", about = "Compute variant inventory for product configurations", version)]
struct Cli {
    /// Request JSON file; reads stdin when omitted.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    request: Option<PathBuf>,

    /// JSON snapshot of catalog variants; takes precedence over the database.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    variants_file: Option<PathBuf>,

    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Bulk fetch timeout in milliseconds.
    #[arg(long)]
    fetch_timeout_ms: Option<u64>,

    /// Worker threads (defaults to available parallelism).
    #[arg(long)]
    workers: Option<usize>,

    /// Low-quantity rule: `target` or `option`.
    #[arg(long)]
    policy: Option<LowQuantityPolicyKind>,

    /// Pretty-print the result array.
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn apply(&self, config: &mut InventoryConfig) {
        if let Some(url) = &self.database_url {
            config.database_url = Some(url.clone());
        }
        if let Some(ms) = self.fetch_timeout_ms {
            config.fetch_timeout = Duration::from_millis(ms.max(1));
        }
        if let Some(workers) = self.workers {
            config.worker_threads = Some(workers.max(1));
        }
        if let Some(policy) = self.policy {
            config.low_quantity_policy = policy;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroll_observability::init();

    let cli = Cli::parse();
    let mut config = InventoryConfig::from_env().context("invalid environment configuration")?;
    cli.apply(&mut config);

    let request = read_request(cli.request.as_deref()).await?;
    let store = open_store(&cli, &config).await?;
    let context = InventoryContext::from_config(store, &config)?;

    info!(
        configurations = request.product_configurations.len(),
        workers = context.engine().worker_threads(),
        "computing inventory"
    );

    let results = compute_inventory(&context, request).await?;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    println!("{output}");
    Ok(())
}

async fn read_request(path: Option<&std::path::Path>) -> anyhow::Result<InventoryRequest> {
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read request {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("failed to read request from stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("request is not a valid InventoryRequest document")
}

async fn open_store(cli: &Cli, config: &InventoryConfig) -> anyhow::Result<Arc<dyn VariantStore>> {
    if let Some(path) = &cli.variants_file {
        let store = InMemoryVariantStore::from_json_file(path)?;
        info!(variants = store.len(), path = %path.display(), "loaded variant snapshot");
        return Ok(Arc::new(store));
    }

    let Some(url) = config.database_url.as_deref() else {
        bail!("no variant source: pass --variants-file or set DATABASE_URL");
    };
    let store = PostgresVariantStore::connect(url, config.db_max_connections).await?;
    Ok(Arc::new(store))
}
