//! Chrome over the DevTools protocol, attached through its remote-debugging port.

use crate::domain::model::{DomQuery, Selector};
use crate::domain::ports::{Browser, PageElement};
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::Browser as CdpBrowser;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// `host:port` of a browser started with `--remote-debugging-port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEndpoint {
    pub host: String,
    pub port: u16,
}

impl DebugEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn version_url(&self) -> String {
        format!("http://{}:{}/json/version", self.host, self.port)
    }

    /// The browser-level websocket URL advertised by `/json/version`.
    pub async fn websocket_url(&self, http: &reqwest::Client) -> Result<String> {
        let version: serde_json::Value = http
            .get(self.version_url())
            .timeout(Duration::from_secs(2))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        version
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ScrapeError::ProcessingError {
                message: format!("{} did not advertise webSocketDebuggerUrl", self.version_url()),
            })
    }

    /// Poll until the endpoint answers or `timeout` elapses.
    pub async fn wait_until_ready(
        &self,
        http: &reqwest::Client,
        timeout: Duration,
        poll_interval: Duration,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match self.websocket_url(http).await {
                Ok(_) => return true,
                Err(e) => tracing::debug!("Debug endpoint not ready: {}", e),
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            tokio::time::sleep(poll_interval.min(deadline - now)).await;
        }
    }
}

/// Locate a Chrome/Chromium executable on this machine.
pub fn find_chrome() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHROME_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser", "chrome"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    let common: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &["/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"]
    } else {
        &[]
    };
    common.iter().map(PathBuf::from).find(|p| p.exists())
}

pub fn launch_args(endpoint: &DebugEndpoint, user_data_dir: &Path, headless: bool) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={}", endpoint.port),
        format!("--user-data-dir={}", user_data_dir.display()),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--disable-extensions".to_string(),
    ];
    if headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

/// Start a detached browser exposing `endpoint`.
pub fn launch_chrome(
    executable: &Path,
    endpoint: &DebugEndpoint,
    user_data_dir: &Path,
    headless: bool,
) -> Result<Child> {
    std::fs::create_dir_all(user_data_dir)?;
    let child = Command::new(executable)
        .args(launch_args(endpoint, user_data_dir, headless))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    tracing::info!(
        "🚀 Launched {} (pid {:?}) on port {}",
        executable.display(),
        child.id(),
        endpoint.port
    );
    Ok(child)
}

/// Whether the session's tab was already open or opened by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabOrigin {
    Reused,
    Opened,
}

impl TabOrigin {
    /// A tab the user had open stays open after the run.
    pub fn closes_on_release(self) -> bool {
        self == TabOrigin::Opened
    }
}

/// An attached tab plus whatever is needed to tear it down.
pub struct ChromeSession {
    // Kept alive for the lifetime of the page.
    _browser: CdpBrowser,
    page: Page,
    origin: TabOrigin,
    pump: JoinHandle<()>,
    launched: Option<Child>,
}

impl ChromeSession {
    /// Connect over CDP and take the first open tab, or open a blank one.
    pub async fn attach(endpoint: &DebugEndpoint, http: &reqwest::Client) -> Result<Self> {
        let ws_url = endpoint.websocket_url(http).await?;
        let (mut browser, mut handler) = CdpBrowser::connect(ws_url).await?;

        let pump = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler: {}", e);
                }
            }
        });

        // A fresh client knows no targets until asked for them.
        if let Err(e) = browser.fetch_targets().await {
            tracing::debug!("Listing open tabs failed: {}", e);
        }
        let existing = browser.pages().await.unwrap_or_default().into_iter().next();
        let (page, origin) = match existing {
            Some(page) => (page, TabOrigin::Reused),
            None => (browser.new_page("about:blank").await?, TabOrigin::Opened),
        };

        tracing::info!(
            "🔗 Attached to browser at {}:{} ({:?} tab)",
            endpoint.host,
            endpoint.port,
            origin
        );
        Ok(Self {
            _browser: browser,
            page,
            origin,
            pump,
            launched: None,
        })
    }

    pub fn with_launched(mut self, child: Option<Child>) -> Self {
        self.launched = child;
        self
    }

    /// Undo whatever `attach` and the launch created; a reused tab stays open.
    pub async fn shutdown(self) {
        if self.origin.closes_on_release() {
            if let Err(e) = self.page.close().await {
                tracing::debug!("Ignoring tab close error: {}", e);
            }
        }
        self.pump.abort();
        if let Some(mut child) = self.launched {
            if let Err(e) = child.kill().await {
                tracing::debug!("Ignoring browser teardown error: {}", e);
            }
        }
    }
}

#[async_trait]
impl Browser for ChromeSession {
    type Element = ChromeElement;

    async fn goto(&self, url: &str) -> Result<()> {
        tracing::info!("🌐 Opening {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn find(&self, selector: &Selector) -> Result<Option<ChromeElement>> {
        let found = match selector.query() {
            DomQuery::Css(css) => self.page.find_element(css).await,
            DomQuery::XPath(xpath) => self.page.find_xpath(xpath).await,
        };
        match found {
            Ok(element) => Ok(Some(ChromeElement(element))),
            Err(e) => {
                tracing::trace!("{} not found: {}", selector, e);
                Ok(None)
            }
        }
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<ChromeElement>> {
        let found = match selector.query() {
            DomQuery::Css(css) => self.page.find_elements(css).await,
            DomQuery::XPath(xpath) => self.page.find_xpaths(xpath).await,
        };
        match found {
            Ok(elements) => Ok(elements.into_iter().map(ChromeElement).collect()),
            Err(e) => {
                tracing::trace!("{} not found: {}", selector, e);
                Ok(Vec::new())
            }
        }
    }
}

pub struct ChromeElement(Element);

#[async_trait]
impl PageElement for ChromeElement {
    async fn text(&self) -> Result<String> {
        Ok(self.0.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.0.attribute(name).await?)
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self>> {
        let DomQuery::Css(css) = selector.query() else {
            return Err(ScrapeError::ProcessingError {
                message: format!("{} is only supported on the page", selector),
            });
        };
        match self.0.find_elements(css).await {
            Ok(elements) => Ok(elements.into_iter().map(ChromeElement).collect()),
            Err(e) => {
                tracing::trace!("{} not found under element: {}", selector, e);
                Ok(Vec::new())
            }
        }
    }

    async fn click(&self) -> Result<()> {
        self.0.click().await?;
        Ok(())
    }

    async fn choose(&self) -> Result<()> {
        // Options have no box model to click; select through the DOM and let
        // the page's change handlers run.
        self.0
            .call_js_fn(
                "function() { this.selected = true; \
                 const s = this.closest('select'); \
                 if (s) { s.dispatchEvent(new Event('change', { bubbles: true })); } }",
                false,
            )
            .await?;
        Ok(())
    }
}
