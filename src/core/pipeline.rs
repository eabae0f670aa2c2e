use crate::core::navigator::{FormLayout, FormNavigator};
use crate::core::table::{await_table, default_table_strategies, parse_table};
use crate::domain::model::{QueryParams, ResultBundle, RunOutcome, Selector};
use crate::domain::ports::{Browser, Storage};
use crate::export::Exporter;
use crate::utils::error::{Result, ScrapeError};
use std::fmt;
use std::time::Duration;

pub const ECOURTS_CAUSE_LIST_URL: &str =
    "https://services.ecourts.gov.in/ecourtindia_v6/?p=cause_list/";

/// A second, shorter wait after a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    pub delay: Duration,
    pub timeout: Duration,
}

/// How long one branch waits for the result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableWait {
    pub timeout: Duration,
    pub retry: Option<Retry>,
}

impl TableWait {
    /// After the popup was filled automatically.
    pub fn auto_default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: None,
        }
    }

    /// While a person completes the popup in the browser window.
    pub fn manual_default() -> Self {
        Self {
            timeout: Duration::from_secs(90),
            retry: Some(Retry {
                delay: Duration::from_secs(2),
                timeout: Duration::from_secs(30),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub base_url: String,
    /// Pause after navigation before touching the page.
    pub settle_delay: Duration,
    pub form: FormLayout,
    pub table_strategies: Vec<Selector>,
    pub table_poll: Duration,
    pub auto_wait: TableWait,
    pub manual_wait: TableWait,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            base_url: ECOURTS_CAUSE_LIST_URL.to_string(),
            settle_delay: Duration::from_millis(1200),
            form: FormLayout::default(),
            table_strategies: default_table_strategies(),
            table_poll: Duration::from_secs(1),
            auto_wait: TableWait::auto_default(),
            manual_wait: TableWait::manual_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Navigated,
    FormAttempted { filled: bool },
    WaitingForTable(WaitMode),
    TableFound,
    TableMissing,
    Parsed { records: usize },
    Exported,
    EmptyResult,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Start => write!(f, "Start"),
            PipelineState::Navigated => write!(f, "Navigated"),
            PipelineState::FormAttempted { filled } => write!(f, "FormAttempted(filled={})", filled),
            PipelineState::WaitingForTable(mode) => write!(f, "WaitingForTable({:?})", mode),
            PipelineState::TableFound => write!(f, "TableFound"),
            PipelineState::TableMissing => write!(f, "TableMissing"),
            PipelineState::Parsed { records } => write!(f, "Parsed({} records)", records),
            PipelineState::Exported => write!(f, "Exported"),
            PipelineState::EmptyResult => write!(f, "EmptyResult"),
        }
    }
}

/// Navigate → fill popup → wait for table → parse → export, for one query.
///
/// Not safe to run twice at once against the same tab.
pub struct CauseListPipeline<S: Storage> {
    settings: PipelineSettings,
    navigator: FormNavigator,
    exporter: Exporter<S>,
}

impl<S: Storage> CauseListPipeline<S> {
    pub fn new(settings: PipelineSettings, exporter: Exporter<S>) -> Self {
        let navigator = FormNavigator::new(settings.form.clone());
        Self {
            settings,
            navigator,
            exporter,
        }
    }

    pub async fn run<B: Browser>(
        &self,
        browser: &B,
        query: &QueryParams,
        allow_manual_fill: bool,
    ) -> Result<ResultBundle> {
        let mut state = PipelineState::Start;

        browser.goto(&self.settings.base_url).await?;
        tokio::time::sleep(self.settings.settle_delay).await;
        advance(&mut state, PipelineState::Navigated);

        let filled = self
            .navigator
            .populate_and_submit(browser, &query.state, &query.district, &query.court_complex)
            .await;
        advance(&mut state, PipelineState::FormAttempted { filled });

        let (mode, wait) = if !filled && allow_manual_fill {
            tracing::warn!(
                "⚠️  Could not auto-fill the location popup; complete it in the browser window and click Proceed"
            );
            (WaitMode::Manual, self.settings.manual_wait)
        } else {
            (WaitMode::Auto, self.settings.auto_wait)
        };
        advance(&mut state, PipelineState::WaitingForTable(mode));

        let table = match self.wait_for_table(browser, wait).await? {
            Some(table) => {
                advance(&mut state, PipelineState::TableFound);
                table
            }
            None => {
                advance(&mut state, PipelineState::TableMissing);
                advance(&mut state, PipelineState::EmptyResult);
                return Ok(ResultBundle::empty());
            }
        };

        let records = parse_table(&table).await?;
        advance(&mut state, PipelineState::Parsed { records: records.len() });

        let paths = self
            .exporter
            .export_all(&records, &query.file_stem(), &query.title())
            .await?;
        advance(&mut state, PipelineState::Exported);

        Ok(ResultBundle {
            csv: paths.csv,
            json: paths.json,
            pdf: paths.pdf,
            records,
            outcome: RunOutcome::Exported,
        })
    }

    /// `Ok(None)` once every allowed attempt has timed out.
    async fn wait_for_table<B: Browser>(
        &self,
        browser: &B,
        wait: TableWait,
    ) -> Result<Option<B::Element>> {
        let strategies = &self.settings.table_strategies;
        let poll = self.settings.table_poll;

        match await_table(browser, strategies, wait.timeout, poll).await {
            Ok(table) => return Ok(Some(table)),
            Err(ScrapeError::TableNotFound { timeout }) => {
                tracing::info!("⏳ No result table within {:?}", timeout)
            }
            Err(e) => return Err(e),
        }

        let Some(retry) = wait.retry else {
            return Ok(None);
        };

        tokio::time::sleep(retry.delay).await;
        match await_table(browser, strategies, retry.timeout, poll).await {
            Ok(table) => Ok(Some(table)),
            Err(ScrapeError::TableNotFound { timeout }) => {
                tracing::info!("⏳ No result table on retry within {:?}", timeout);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!("pipeline: {} -> {}", state, next);
    *state = next;
}
