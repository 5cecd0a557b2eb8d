pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use crate::core::{
    etl::ImportEngine,
    transport::{DryRunSink, HttpBulkTransport},
};
pub use config::{toml_config::TomlConfig, ImportSettings};
pub use domain::model::ImportSummary;
pub use utils::error::{ImportError, Result};
