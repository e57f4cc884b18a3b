//! relgraph demo - resolves a schema and opens a store against it.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relgraph_demo::{run, Args};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relgraph_demo=info,relgraph_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.into_config();

    tracing::info!(
        store = %config.store_name,
        preview = config.is_preview(),
        schema = ?config.schema_path,
        "configuration loaded"
    );

    match run(&config) {
        Ok(counts) => {
            for (entity, count) in counts {
                tracing::info!(entity = %entity, count, "records");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "demo failed");
            Err(e.into())
        }
    }
}
