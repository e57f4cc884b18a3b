//! Demo configuration.

use clap::Parser;
use relgraph_core::StoreConfig;
use std::path::PathBuf;

/// Default store name.
pub const DEFAULT_STORE_NAME: &str = "Example";

/// Default number of preview records seeded on start.
pub const DEFAULT_SEED_COUNT: usize = 10;

/// Demo configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Name of the store to open.
    pub store_name: String,

    /// Store settings. Temporary when no data path was given.
    pub store: StoreConfig,

    /// Optional JSON file with entity declarations.
    pub schema_path: Option<PathBuf>,

    /// Number of `Item` records to seed.
    pub seed: usize,
}

impl DemoConfig {
    /// Check if the store is discarded on exit.
    pub fn is_preview(&self) -> bool {
        self.store.temporary
    }
}

/// Command-line arguments for the demo.
#[derive(Parser, Debug)]
#[command(name = "relgraph-demo")]
#[command(version, about = "relgraph example application", long_about = None)]
pub struct Args {
    /// Name of the store to open.
    #[arg(short, long, default_value = DEFAULT_STORE_NAME)]
    pub name: String,

    /// Store directory. Without it the store is an in-memory preview.
    #[arg(short, long)]
    pub data_path: Option<PathBuf>,

    /// JSON file with entity declarations (defaults to the built-in Item/Child schema).
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Number of Item records to seed.
    #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
    pub seed: usize,
}

impl Args {
    /// Convert command-line arguments to demo configuration.
    pub fn into_config(self) -> DemoConfig {
        let store = match self.data_path {
            Some(path) => StoreConfig::new(path),
            None => StoreConfig::temporary(),
        };

        DemoConfig {
            store_name: self.name,
            store,
            schema_path: self.schema,
            seed: self.seed,
        }
    }
}
