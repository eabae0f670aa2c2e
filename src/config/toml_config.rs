use crate::adapters::chrome::DebugEndpoint;
use crate::core::navigator::FormLayout;
use crate::core::pipeline::{PipelineSettings, Retry, TableWait, ECOURTS_CAUSE_LIST_URL};
use crate::core::session::{default_user_data_dir, SessionSettings};
use crate::core::table::default_table_strategies;
use crate::domain::model::Selector;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

/// Every knob of a scrape run. All sections and keys are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub portal: PortalConfig,
    pub browser: BrowserConfig,
    pub layout: LayoutConfig,
    pub timeouts: TimeoutConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub base_url: String,
    pub settle_delay_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: ECOURTS_CAUSE_LIST_URL.to_string(),
            settle_delay_ms: 1200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub host: String,
    pub debug_port: u16,
    pub chrome_path: Option<String>,
    pub user_data_dir: Option<String>,
    pub try_launch: bool,
    pub headless: bool,
    pub launch_ready_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            debug_port: 9222,
            chrome_path: None,
            user_data_dir: None,
            try_launch: true,
            headless: false,
            launch_ready_timeout_secs: 15,
            poll_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub state_ids: Vec<String>,
    pub district_ids: Vec<String>,
    pub complex_ids: Vec<String>,
    pub table_selectors: Vec<Selector>,
    pub clickable_selector: String,
    pub proceed_keywords: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let form = FormLayout::default();
        let clickable_selector = match form.clickable {
            Selector::Css(css) => css,
            other => other.to_string(),
        };
        Self {
            state_ids: form.state_ids,
            district_ids: form.district_ids,
            complex_ids: form.complex_ids,
            table_selectors: default_table_strategies(),
            clickable_selector,
            proceed_keywords: form.proceed_keywords,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub field_wait_ms: u64,
    pub table_poll_ms: u64,
    pub auto_wait: TableWaitConfig,
    pub manual_wait: TableWaitConfig,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            field_wait_ms: 5000,
            table_poll_ms: 1000,
            auto_wait: TableWaitConfig::default(),
            manual_wait: TableWaitConfig::default(),
        }
    }
}

/// Overrides for one branch's [`TableWait`]; unset keys keep the branch default.
///
/// `retry = false` drops the retry, `retry = true` adds one where the branch
/// has none (delay 0, same timeout as the first wait unless given).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableWaitConfig {
    pub timeout_secs: Option<u64>,
    pub retry: Option<bool>,
    pub retry_delay_secs: Option<u64>,
    pub retry_timeout_secs: Option<u64>,
}

impl TableWaitConfig {
    pub fn resolve(&self, base: TableWait) -> TableWait {
        let timeout = self
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(base.timeout);

        let retry = if self.retry == Some(false) {
            None
        } else {
            let wanted = self.retry == Some(true)
                || base.retry.is_some()
                || self.retry_timeout_secs.is_some();
            wanted.then(|| Retry {
                delay: self
                    .retry_delay_secs
                    .map(Duration::from_secs)
                    .or(base.retry.map(|r| r.delay))
                    .unwrap_or(Duration::ZERO),
                timeout: self
                    .retry_timeout_secs
                    .map(Duration::from_secs)
                    .or(base.retry.map(|r| r.timeout))
                    .unwrap_or(timeout),
            })
        };

        TableWait { timeout, retry }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub download_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: "downloads".to_string(),
        }
    }
}

impl ScraperConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScrapeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CHROME_PATH})；未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn form_layout(&self) -> FormLayout {
        FormLayout {
            state_ids: self.layout.state_ids.clone(),
            district_ids: self.layout.district_ids.clone(),
            complex_ids: self.layout.complex_ids.clone(),
            clickable: Selector::css(self.layout.clickable_selector.as_str()),
            proceed_keywords: self
                .layout
                .proceed_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            field_wait: Duration::from_millis(self.timeouts.field_wait_ms),
            poll_interval: Duration::from_millis(self.browser.poll_interval_ms),
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            base_url: self.portal.base_url.clone(),
            settle_delay: Duration::from_millis(self.portal.settle_delay_ms),
            form: self.form_layout(),
            table_strategies: self.layout.table_selectors.clone(),
            table_poll: Duration::from_millis(self.timeouts.table_poll_ms),
            auto_wait: self.timeouts.auto_wait.resolve(TableWait::auto_default()),
            manual_wait: self.timeouts.manual_wait.resolve(TableWait::manual_default()),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            endpoint: DebugEndpoint::new(self.browser.host.as_str(), self.browser.debug_port),
            chrome_path: self.browser.chrome_path.as_ref().map(PathBuf::from),
            user_data_dir: self
                .browser
                .user_data_dir
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(default_user_data_dir),
            try_launch: self.browser.try_launch,
            headless: self.browser.headless,
            ready_timeout: Duration::from_secs(self.browser.launch_ready_timeout_secs),
            poll_interval: Duration::from_millis(self.browser.poll_interval_ms),
        }
    }

    pub fn download_dir(&self) -> &str {
        &self.output.download_dir
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("portal.base_url", &self.portal.base_url)?;
        validation::validate_non_empty_string("browser.host", &self.browser.host)
            .map_err(|_| ScrapeError::MissingConfigError {
                field: "browser.host".to_string(),
            })?;
        validation::validate_range("browser.debug_port", self.browser.debug_port, 1, u16::MAX)?;
        validation::validate_positive_number(
            "browser.poll_interval_ms",
            self.browser.poll_interval_ms,
            1,
        )?;
        if let Some(dir) = &self.browser.user_data_dir {
            validation::validate_path("browser.user_data_dir", dir)?;
        }
        if let Some(path) = &self.browser.chrome_path {
            validation::validate_path("browser.chrome_path", path)?;
        }

        validation::validate_non_empty_list("layout.state_ids", &self.layout.state_ids)?;
        validation::validate_non_empty_list("layout.district_ids", &self.layout.district_ids)?;
        validation::validate_non_empty_list("layout.complex_ids", &self.layout.complex_ids)?;
        validation::validate_non_empty_list("layout.table_selectors", &self.layout.table_selectors)?;

        validation::validate_positive_number("timeouts.table_poll_ms", self.timeouts.table_poll_ms, 1)?;
        for (field, wait, base) in [
            ("timeouts.auto_wait", &self.timeouts.auto_wait, TableWait::auto_default()),
            ("timeouts.manual_wait", &self.timeouts.manual_wait, TableWait::manual_default()),
        ] {
            let has_retry_keys = wait.retry_delay_secs.is_some() || wait.retry_timeout_secs.is_some();
            if has_retry_keys && wait.resolve(base).retry.is_none() {
                return Err(ScrapeError::ConfigValidationError {
                    field: field.to_string(),
                    message: "retry settings given but the retry is disabled".to_string(),
                });
            }
        }

        validation::validate_path("output.download_dir", &self.output.download_dir)?;
        Ok(())
    }
}

impl Validate for ScraperConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ScraperConfig::from_toml_str("").unwrap();

        assert_eq!(config.portal.base_url, ECOURTS_CAUSE_LIST_URL);
        assert_eq!(config.browser.debug_port, 9222);
        assert_eq!(config.layout.state_ids[0], "selState");
        assert_eq!(config.layout.table_selectors.len(), 6);
        assert!(config.validate().is_ok());

        let settings = config.pipeline_settings();
        assert_eq!(settings.auto_wait, TableWait::auto_default());
        assert_eq!(settings.manual_wait, TableWait::manual_default());
        assert_eq!(
            settings.form.clickable,
            Selector::css("button, input[type='submit'], input[type='button']")
        );
    }

    #[test]
    fn test_parse_layout_overrides() {
        let toml_content = r#"
[portal]
base_url = "http://localhost:8080/causelist"
settle_delay_ms = 0

[layout]
state_ids = ["stateCode"]
table_selectors = [
  { by = "css", value = "table.causelist" },
  { by = "xpath", value = "//table[@summary='cases']" },
]
proceed_keywords = ["Go"]

[timeouts]
table_poll_ms = 50
auto_wait = { timeout_secs = 10, retry_delay_secs = 1, retry_timeout_secs = 5 }
"#;

        let config = ScraperConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let settings = config.pipeline_settings();
        assert_eq!(settings.base_url, "http://localhost:8080/causelist");
        assert_eq!(settings.form.state_ids, vec!["stateCode"]);
        assert_eq!(settings.form.district_ids[0], "selDistrict");
        assert_eq!(settings.form.proceed_keywords, vec!["go"]);
        assert_eq!(
            settings.table_strategies[1],
            Selector::XPath("//table[@summary='cases']".to_string())
        );
        assert_eq!(
            settings.auto_wait.retry,
            Some(Retry {
                delay: Duration::from_secs(1),
                timeout: Duration::from_secs(5),
            })
        );
    }

    #[test]
    fn test_partial_wait_keeps_branch_retry() {
        let toml_content = r#"
[timeouts.manual_wait]
timeout_secs = 60

[timeouts.auto_wait]
retry = true
"#;

        let settings = ScraperConfig::from_toml_str(toml_content)
            .unwrap()
            .pipeline_settings();

        assert_eq!(settings.manual_wait.timeout, Duration::from_secs(60));
        assert_eq!(settings.manual_wait.retry, TableWait::manual_default().retry);
        assert_eq!(
            settings.auto_wait.retry,
            Some(Retry {
                delay: Duration::ZERO,
                timeout: Duration::from_secs(30),
            })
        );
    }

    #[test]
    fn test_retry_can_be_switched_off() {
        let config =
            ScraperConfig::from_toml_str("[timeouts.manual_wait]\nretry = false").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline_settings().manual_wait.retry, None);

        let contradictory = ScraperConfig::from_toml_str(
            "[timeouts.manual_wait]\nretry = false\nretry_delay_secs = 3",
        )
        .unwrap();
        assert!(contradictory.validate().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CAUSELIST_TEST_CHROME", "/opt/chrome/chrome");

        let toml_content = r#"
[browser]
chrome_path = "${CAUSELIST_TEST_CHROME}"
"#;

        let config = ScraperConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.browser.chrome_path.as_deref(), Some("/opt/chrome/chrome"));

        std::env::remove_var("CAUSELIST_TEST_CHROME");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = ScraperConfig::from_toml_str("[portal]\nbase_url = \"invalid-url\"").unwrap();
        assert!(invalid_url.validate().is_err());

        let no_ids = ScraperConfig::from_toml_str("[layout]\ncomplex_ids = []").unwrap();
        assert!(no_ids.validate().is_err());

        let zero_port = ScraperConfig::from_toml_str("[browser]\ndebug_port = 0").unwrap();
        assert!(zero_port.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\ndownload_dir = \"./causelists\"\n")
            .unwrap();

        let config = ScraperConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.download_dir(), "./causelists");
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        let err = ScraperConfig::from_toml_str("[browser\n").unwrap_err();
        assert!(matches!(err, ScrapeError::ConfigValidationError { .. }));
    }
}
