//! relgraph demo library.
//!
//! Declares the example schema, resolves it, opens a store against it and
//! seeds preview records.

pub mod config;
pub mod error;
pub mod example;

pub use config::{Args, DemoConfig};
pub use error::Error;
pub use example::{build_graph, describe, example_entities, run, seed};
