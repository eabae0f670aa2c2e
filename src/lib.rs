pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod export;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::ScraperConfig;

pub use crate::core::{
    engine::{CauseListEngine, RunOptions, RunReport},
    fallback::FallbackProvider,
    pipeline::CauseListPipeline,
    session::SessionManager,
};
pub use export::Exporter;
pub use utils::error::{Result, ScrapeError};
