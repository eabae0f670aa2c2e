#![allow(dead_code)]

use async_trait::async_trait;
use ecourts_causelist::core::navigator::FormLayout;
use ecourts_causelist::core::pipeline::{PipelineSettings, Retry, TableWait};
use ecourts_causelist::domain::model::Selector;
use ecourts_causelist::domain::ports::{Browser, PageElement, SessionProvider};
use ecourts_causelist::{Result, ScrapeError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Clicks and option choices, in the order they happened.
pub type ActionLog = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Default)]
pub struct FakeElement {
    pub name: String,
    pub text: String,
    pub attrs: HashMap<String, String>,
    pub children: HashMap<Selector, Vec<FakeElement>>,
    /// Child lookups fail instead of returning a list.
    pub broken: bool,
    log: ActionLog,
}

impl FakeElement {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_children(mut self, tag: &str, children: Vec<FakeElement>) -> Self {
        self.children.insert(Selector::tag(tag), children);
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    fn share_log(&mut self, log: &ActionLog) {
        self.log = log.clone();
        for children in self.children.values_mut() {
            for child in children {
                child.share_log(log);
            }
        }
    }
}

#[async_trait]
impl PageElement for FakeElement {
    async fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.attrs.get(name).cloned())
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self>> {
        if self.broken {
            return Err(ScrapeError::ProcessingError {
                message: format!("{} is detached", self.name),
            });
        }
        Ok(self.children.get(selector).cloned().unwrap_or_default())
    }

    async fn click(&self) -> Result<()> {
        self.log.lock().unwrap().push(format!("click:{}", self.name));
        Ok(())
    }

    async fn choose(&self) -> Result<()> {
        self.log.lock().unwrap().push(format!("choose:{}", self.name));
        Ok(())
    }
}

struct Entry {
    elements: Vec<FakeElement>,
    /// Lookups that still report nothing before the element shows up.
    hidden_for: u32,
}

/// A page whose DOM is a fixed map from selector to elements.
#[derive(Default)]
pub struct FakeBrowser {
    entries: Mutex<HashMap<Selector, Entry>>,
    lookups: Mutex<HashMap<Selector, u32>>,
    visited: Mutex<Vec<String>>,
    fail_goto: bool,
    log: ActionLog,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_navigation() -> Self {
        Self {
            fail_goto: true,
            ..Default::default()
        }
    }

    pub fn with(self, selector: Selector, element: FakeElement) -> Self {
        self.with_all(selector, vec![element])
    }

    pub fn with_all(self, selector: Selector, elements: Vec<FakeElement>) -> Self {
        self.appearing_after(selector, elements, 0)
    }

    /// `selector` resolves only from lookup number `hidden_for + 1` on.
    pub fn appearing_after(
        self,
        selector: Selector,
        mut elements: Vec<FakeElement>,
        hidden_for: u32,
    ) -> Self {
        for element in &mut elements {
            element.share_log(&self.log);
        }
        self.entries.lock().unwrap().insert(
            selector,
            Entry {
                elements,
                hidden_for,
            },
        );
        self
    }

    pub fn actions(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn lookups(&self, selector: &Selector) -> u32 {
        self.lookups.lock().unwrap().get(selector).copied().unwrap_or(0)
    }

    fn resolve(&self, selector: &Selector) -> Vec<FakeElement> {
        let count = {
            let mut lookups = self.lookups.lock().unwrap();
            let count = lookups.entry(selector.clone()).or_insert(0);
            *count += 1;
            *count
        };
        match self.entries.lock().unwrap().get(selector) {
            Some(entry) if count > entry.hidden_for => entry.elements.clone(),
            _ => Vec::new(),
        }
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> Result<()> {
        if self.fail_goto {
            return Err(ScrapeError::ProcessingError {
                message: format!("navigation to {} refused", url),
            });
        }
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn find(&self, selector: &Selector) -> Result<Option<FakeElement>> {
        Ok(self.resolve(selector).into_iter().next())
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<FakeElement>> {
        Ok(self.resolve(selector))
    }
}

/// Hands out one prepared browser and records whether it came back.
pub struct FakeSessions {
    browser: Mutex<Option<FakeBrowser>>,
    released: Arc<AtomicBool>,
}

impl FakeSessions {
    pub fn new(browser: FakeBrowser) -> Self {
        Self {
            browser: Mutex::new(Some(browser)),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            browser: Mutex::new(None),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn released_flag(&self) -> Arc<AtomicBool> {
        self.released.clone()
    }
}

#[async_trait]
impl SessionProvider for FakeSessions {
    type Session = FakeBrowser;

    async fn acquire(&self) -> Result<FakeBrowser> {
        self.browser
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ScrapeError::SessionUnavailable {
                reason: "no debugging browser on 127.0.0.1:9222".to_string(),
            })
    }

    async fn release(&self, _session: FakeBrowser) {
        self.released.store(true, Ordering::SeqCst);
    }
}

pub fn select(name: &str, options: &[&str]) -> FakeElement {
    let options = options
        .iter()
        .map(|text| FakeElement::new(&format!("{}={}", name, text), text))
        .collect();
    FakeElement::new(name, "").with_children("option", options)
}

pub fn cells(tag: &str, values: &[&str]) -> FakeElement {
    let cells = values.iter().map(|v| FakeElement::new(tag, v)).collect();
    FakeElement::new("tr", "").with_children(tag, cells)
}

/// `<table>` with a `<th>` header row followed by `<td>` rows.
pub fn table(headers: &[&str], rows: &[&[&str]]) -> FakeElement {
    let mut trs = vec![cells("th", headers)];
    trs.extend(rows.iter().map(|row| cells("td", row)));
    FakeElement::new("table", "").with_children("tr", trs)
}

pub fn empty_table() -> FakeElement {
    FakeElement::new("table", "")
}

pub fn clickable() -> Selector {
    FormLayout::default().clickable
}

/// The default popup of the portal, with one Proceed button.
pub fn populated_popup(browser: FakeBrowser) -> FakeBrowser {
    browser
        .with(
            Selector::id("selState"),
            select("state", &["Select State", "Goa", "Maharashtra"]),
        )
        .with(
            Selector::id("selDistrict"),
            select("district", &["Select District", "Pune", "Mumbai"]),
        )
        .with(
            Selector::id("selCourtComplex"),
            select(
                "complex",
                &["Select Complex", "Pune, Civil and Criminal Court", "Baramati"],
            ),
        )
        .with_all(
            clickable(),
            vec![
                FakeElement::new("close", "Close"),
                FakeElement::new("proceed", "Proceed"),
            ],
        )
}

/// Zero settle delay and millisecond waits.
pub fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        base_url: "http://portal.test/cause_list/".to_string(),
        settle_delay: Duration::ZERO,
        form: FormLayout {
            field_wait: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            ..FormLayout::default()
        },
        table_strategies: vec![Selector::id("resultTable")],
        table_poll: Duration::from_millis(1),
        auto_wait: TableWait {
            timeout: Duration::ZERO,
            retry: None,
        },
        manual_wait: TableWait {
            timeout: Duration::ZERO,
            retry: Some(Retry {
                delay: Duration::ZERO,
                timeout: Duration::ZERO,
            }),
        },
    }
}
