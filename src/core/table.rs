use crate::domain::model::{Record, Selector};
use crate::domain::ports::{Browser, PageElement};
use crate::utils::error::{Result, ScrapeError};
use std::time::Duration;
use tokio::time::Instant;

/// Where the result table has been seen across portal versions, tried in order.
pub fn default_table_strategies() -> Vec<Selector> {
    vec![
        Selector::id("resultTable"),
        Selector::id("result_table"),
        Selector::id("result"),
        Selector::css("table#resultTable"),
        Selector::css("table[id*='result'], table[class*='result'], table[class*='cause']"),
        Selector::tag("table"),
    ]
}

/// Poll `strategies` until one yields a table, or fail with `TableNotFound`.
///
/// A located table with zero rows is passed over for the next strategy; one
/// whose rows cannot be read is accepted as is. At least one poll happens
/// even with a zero timeout.
pub async fn await_table<B: Browser>(
    browser: &B,
    strategies: &[Selector],
    timeout: Duration,
    poll_interval: Duration,
) -> Result<B::Element> {
    let deadline = Instant::now() + timeout;
    let mut polls = 0u32;

    loop {
        polls += 1;
        for selector in strategies {
            let element = match browser.find(selector).await {
                Ok(Some(element)) => element,
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!("Table lookup {} failed: {}", selector, e);
                    continue;
                }
            };

            match element.find_all(&Selector::tag("tr")).await {
                Ok(rows) if !rows.is_empty() => {
                    tracing::info!("📋 Result table found via {} ({} rows)", selector, rows.len());
                    return Ok(element);
                }
                Ok(_) => tracing::debug!("{} matched a table with no rows", selector),
                Err(e) => {
                    tracing::debug!("Rows of {} not inspectable ({}); using it anyway", selector, e);
                    return Ok(element);
                }
            }
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::debug!("Gave up on result table after {} polls", polls);
            return Err(ScrapeError::TableNotFound { timeout });
        }
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Turn a rendered table into records keyed by its header row.
pub async fn parse_table<E: PageElement>(table: &E) -> Result<Vec<Record>> {
    let rows = table.find_all(&Selector::tag("tr")).await?;
    let Some((header_row, body)) = rows.split_first() else {
        return Ok(Vec::new());
    };

    let mut header_cells = header_row.find_all(&Selector::tag("th")).await?;
    if header_cells.is_empty() {
        header_cells = header_row.find_all(&Selector::tag("td")).await?;
    }

    let mut headers = Vec::with_capacity(header_cells.len());
    for (i, cell) in header_cells.iter().enumerate() {
        let text = cell.text().await?;
        let text = text.trim();
        headers.push(if text.is_empty() {
            format!("col{}", i + 1)
        } else {
            text.to_string()
        });
    }

    let mut records = Vec::new();
    for row in body {
        let cells = row.find_all(&Selector::tag("td")).await?;
        if cells.is_empty() {
            continue;
        }

        let mut record = Record::new();
        for (i, cell) in cells.iter().enumerate() {
            let key = headers
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("col{}", i + 1));
            record.insert(key, cell.text().await?.trim());
        }
        records.push(record);
    }

    tracing::debug!("Parsed {} records over {} columns", records.len(), headers.len());
    Ok(records)
}
