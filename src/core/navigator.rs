use crate::domain::model::Selector;
use crate::domain::ports::{Browser, PageElement};
use crate::utils::error::Result;
use std::time::Duration;
use tokio::time::Instant;

/// Known identifiers for the location popup, tried in order.
#[derive(Debug, Clone)]
pub struct FormLayout {
    pub state_ids: Vec<String>,
    pub district_ids: Vec<String>,
    pub complex_ids: Vec<String>,
    /// Elements considered for the Proceed/Submit click.
    pub clickable: Selector,
    pub proceed_keywords: Vec<String>,
    /// How long to wait for each candidate field to appear.
    pub field_wait: Duration,
    pub poll_interval: Duration,
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for FormLayout {
    fn default() -> Self {
        Self {
            state_ids: ids(&[
                "selState",
                "sess_state_code",
                "state",
                "sess_state",
                "sel_state",
                "statecode",
            ]),
            district_ids: ids(&[
                "selDistrict",
                "sess_dist_code",
                "dist",
                "sess_dist",
                "sel_district",
                "distcode",
            ]),
            complex_ids: ids(&[
                "selCourtComplex",
                "court_complex_code",
                "courtComplex",
                "selCourt",
                "court_complex",
            ]),
            clickable: Selector::css("button, input[type='submit'], input[type='button']"),
            proceed_keywords: ids(&["proceed", "submit", "ok"]),
            field_wait: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Poll for `selector` until it resolves or `wait` elapses.
///
/// Lookup errors count as "not there yet".
pub async fn locate_within<B: Browser>(
    browser: &B,
    selector: &Selector,
    wait: Duration,
    poll_interval: Duration,
) -> Option<B::Element> {
    let deadline = Instant::now() + wait;
    loop {
        match browser.find(selector).await {
            Ok(Some(element)) => return Some(element),
            Ok(None) => {}
            Err(e) => tracing::debug!("Lookup of {} failed: {}", selector, e),
        }

        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Fills the state/district/court-complex popup on a best-effort basis.
pub struct FormNavigator {
    layout: FormLayout,
}

impl FormNavigator {
    pub fn new(layout: FormLayout) -> Self {
        Self { layout }
    }

    /// Returns true iff at least one of the three fields was located.
    ///
    /// A located field counts even when no option matched; the chosen option
    /// is never verified.
    pub async fn populate_and_submit<B: Browser>(
        &self,
        browser: &B,
        state: &str,
        district: &str,
        court_complex: &str,
    ) -> bool {
        let fields: [(&str, &[String], &str); 3] = [
            ("state", &self.layout.state_ids, state),
            ("district", &self.layout.district_ids, district),
            ("court complex", &self.layout.complex_ids, court_complex),
        ];

        let mut filled_any = false;
        for (label, candidates, desired) in fields {
            if self.fill_field(browser, label, candidates, desired).await {
                filled_any = true;
            }
        }

        if !self.click_proceed(browser).await {
            tracing::debug!("No proceed/submit control found; popup may need a manual click");
        }

        filled_any
    }

    async fn fill_field<B: Browser>(
        &self,
        browser: &B,
        label: &str,
        candidates: &[String],
        desired: &str,
    ) -> bool {
        for id in candidates {
            let selector = Selector::id(id.as_str());
            let Some(field) =
                locate_within(browser, &selector, self.layout.field_wait, self.layout.poll_interval)
                    .await
            else {
                continue;
            };

            match select_option(&field, desired).await {
                Ok(Some(text)) => {
                    tracing::info!("✏️  {} field '{}' set to '{}'", label, id, text)
                }
                Ok(None) => tracing::warn!(
                    "{} field '{}' has no option containing '{}'",
                    label,
                    id,
                    desired
                ),
                Err(e) => tracing::debug!("Selecting {} option in '{}' failed: {}", label, id, e),
            }
            return true;
        }

        tracing::debug!("No {} field matched any known identifier", label);
        false
    }

    async fn click_proceed<B: Browser>(&self, browser: &B) -> bool {
        let candidates = match browser.find_all(&self.layout.clickable).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::debug!("Looking up clickable elements failed: {}", e);
                return false;
            }
        };

        for element in candidates {
            let mut label = element.text().await.unwrap_or_default();
            if label.trim().is_empty() {
                label = element.attribute("value").await.ok().flatten().unwrap_or_default();
            }
            let folded = label.to_lowercase();
            if !self
                .layout
                .proceed_keywords
                .iter()
                .any(|k| folded.contains(k.as_str()))
            {
                continue;
            }

            return match element.click().await {
                Ok(()) => {
                    tracing::info!("👉 Clicked '{}'", label.trim());
                    true
                }
                Err(e) => {
                    tracing::debug!("Clicking '{}' failed: {}", label.trim(), e);
                    false
                }
            };
        }
        false
    }
}

/// Choose the first `<option>` whose text contains `desired`, ignoring case.
/// Returns the chosen option's text.
pub async fn select_option<E: PageElement>(select: &E, desired: &str) -> Result<Option<String>> {
    let desired = desired.trim().to_lowercase();
    if desired.is_empty() {
        return Ok(None);
    }

    for option in select.find_all(&Selector::tag("option")).await? {
        let text = option.text().await?;
        if text.trim().to_lowercase().contains(&desired) {
            option.choose().await?;
            return Ok(Some(text.trim().to_string()));
        }
    }
    Ok(None)
}
