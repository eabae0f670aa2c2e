pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::engine::RunOptions;
#[cfg(feature = "cli")]
use crate::domain::model::QueryParams;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use toml_config::ScraperConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ecourts-causelist")]
#[command(about = "Fetch a court complex's daily cause list and save it as PDF, JSON and CSV")]
pub struct CliConfig {
    #[arg(long, default_value = "Maharashtra")]
    pub state: String,

    #[arg(long, default_value = "Pune")]
    pub district: String,

    #[arg(long, default_value = "Pune, Civil and Criminal Court")]
    pub court_complex: String,

    /// Cause list date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<String>,

    /// Do not wait for the popup to be filled by hand
    #[arg(long)]
    pub no_manual_fill: bool,

    /// Run a launched browser without a window
    #[arg(long)]
    pub headless: bool,

    /// TOML file with portal, browser, layout, timeout and output settings
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long)]
    pub download_dir: Option<String>,

    #[arg(long)]
    pub debug_port: Option<u16>,

    #[arg(long)]
    pub chrome_path: Option<String>,

    /// Only attach to an already running browser
    #[arg(long)]
    pub no_launch: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn query(&self) -> QueryParams {
        let date = self
            .date
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        QueryParams::new(
            self.state.trim(),
            self.district.trim(),
            self.court_complex.trim(),
            date,
        )
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            allow_manual_fill: !self.no_manual_fill,
        }
    }

    /// Load `--config` (or defaults) and apply command-line overrides on top.
    pub fn scraper_config(&self) -> Result<ScraperConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📄 Loading configuration from {}", path);
                ScraperConfig::from_file(path)?
            }
            None => ScraperConfig::default(),
        };

        if let Some(dir) = &self.download_dir {
            config.output.download_dir = dir.clone();
        }
        if let Some(port) = self.debug_port {
            config.browser.debug_port = port;
        }
        if let Some(path) = &self.chrome_path {
            config.browser.chrome_path = Some(path.clone());
        }
        if self.no_launch {
            config.browser.try_launch = false;
        }
        if self.headless {
            config.browser.headless = true;
        }
        Ok(config)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("state", &self.state)?;
        validation::validate_non_empty_string("district", &self.district)?;
        validation::validate_non_empty_string("court_complex", &self.court_complex)?;

        if let Some(date) = &self.date {
            if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(crate::utils::error::ScrapeError::InvalidConfigValueError {
                    field: "date".to_string(),
                    value: date.clone(),
                    reason: "Expected YYYY-MM-DD".to_string(),
                });
            }
        }
        if let Some(dir) = &self.download_dir {
            validation::validate_path("download_dir", dir)?;
        }
        if let Some(port) = self.debug_port {
            validation::validate_range("debug_port", port, 1, u16::MAX)?;
        }
        Ok(())
    }
}
