use crate::adapters::chrome::{find_chrome, launch_chrome, ChromeSession, DebugEndpoint};
use crate::domain::ports::SessionProvider;
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub endpoint: DebugEndpoint,
    /// Explicit browser executable; discovered when absent.
    pub chrome_path: Option<PathBuf>,
    pub user_data_dir: PathBuf,
    /// Start a browser when nothing answers on the endpoint.
    pub try_launch: bool,
    pub headless: bool,
    /// Upper bound on waiting for a launched browser's endpoint.
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
}

pub fn default_user_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("ecourts-causelist")
        .join("chrome-profile")
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            endpoint: DebugEndpoint::new("127.0.0.1", 9222),
            chrome_path: None,
            user_data_dir: default_user_data_dir(),
            try_launch: true,
            headless: false,
            ready_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Attach to a debugging browser, launching one if allowed.
pub struct SessionManager {
    settings: SessionSettings,
    http: reqwest::Client,
}

impl SessionManager {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    async fn launch_and_attach(&self, first: ScrapeError) -> Result<ChromeSession> {
        let executable = self
            .settings
            .chrome_path
            .clone()
            .or_else(find_chrome)
            .ok_or_else(|| ScrapeError::SessionUnavailable {
                reason: format!(
                    "{} | Chrome executable not found; pass --chrome-path or install Chrome",
                    first
                ),
            })?;

        let endpoint = &self.settings.endpoint;
        let child = launch_chrome(
            &executable,
            endpoint,
            &self.settings.user_data_dir,
            self.settings.headless,
        )
        .map_err(|e| ScrapeError::SessionUnavailable {
            reason: format!("{} | failed to launch {}: {}", first, executable.display(), e),
        })?;

        if !endpoint
            .wait_until_ready(&self.http, self.settings.ready_timeout, self.settings.poll_interval)
            .await
        {
            tracing::warn!(
                "Debug endpoint still silent after {:?}; attaching anyway",
                self.settings.ready_timeout
            );
        }

        match ChromeSession::attach(endpoint, &self.http).await {
            Ok(session) => Ok(session.with_launched(Some(child))),
            Err(second) => {
                let mut child = child;
                if let Err(e) = child.kill().await {
                    tracing::debug!("Ignoring browser teardown error: {}", e);
                }
                Err(ScrapeError::SessionUnavailable {
                    reason: format!("{} | {}", first, second),
                })
            }
        }
    }
}

#[async_trait]
impl SessionProvider for SessionManager {
    type Session = ChromeSession;

    async fn acquire(&self) -> Result<ChromeSession> {
        let endpoint = &self.settings.endpoint;
        match ChromeSession::attach(endpoint, &self.http).await {
            Ok(session) => Ok(session),
            Err(first) if self.settings.try_launch => {
                tracing::info!(
                    "No browser on {}:{} ({}); launching one",
                    endpoint.host,
                    endpoint.port,
                    first
                );
                self.launch_and_attach(first).await
            }
            Err(first) => Err(ScrapeError::SessionUnavailable {
                reason: first.to_string(),
            }),
        }
    }

    async fn release(&self, session: ChromeSession) {
        session.shutdown().await;
        tracing::debug!("Browser session released");
    }
}
