mod common;

use common::*;
use ecourts_causelist::core::table::{await_table, default_table_strategies, parse_table};
use ecourts_causelist::domain::model::Selector;
use ecourts_causelist::ScrapeError;
use std::time::Duration;

const POLL: Duration = Duration::from_millis(1);

#[tokio::test]
async fn test_parse_uses_header_row_as_keys() {
    let table = table(
        &["Sr No", "Case Number", "Party"],
        &[&["1", "CC/12/2024", "A vs B"], &["2", "CC/13/2024", "C vs D"]],
    );

    let records = parse_table(&table).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("Sr No"), Some("1"));
    assert_eq!(records[1].get("Party"), Some("C vs D"));
    assert_eq!(
        records[0].keys().collect::<Vec<_>>(),
        vec!["Sr No", "Case Number", "Party"]
    );
}

#[tokio::test]
async fn test_blank_headers_and_extra_cells_get_placeholders() {
    let table = table(&["Sr No", "  ", ""], &[&["1", "CC/12", "A vs B", "Court 4"]]);

    let records = parse_table(&table).await.unwrap();

    assert_eq!(
        records[0].keys().collect::<Vec<_>>(),
        vec!["Sr No", "col2", "col3", "col4"]
    );
    assert_eq!(records[0].get("col4"), Some("Court 4"));
}

#[tokio::test]
async fn test_all_blank_headers_become_numbered_columns() {
    let table = table(&["", " ", "\n"], &[&["1", "CC/12", "A vs B"]]);

    let records = parse_table(&table).await.unwrap();

    assert_eq!(
        records[0].keys().collect::<Vec<_>>(),
        vec!["col1", "col2", "col3"]
    );
    assert_eq!(records[0].get("col3"), Some("A vs B"));
}

#[tokio::test]
async fn test_short_rows_only_carry_their_cells() {
    let table = table(&["Sr No", "Case", "Party"], &[&["1"]]);

    let records = parse_table(&table).await.unwrap();

    assert_eq!(records[0].len(), 1);
    assert!(!records[0].contains_key("Party"));
}

#[tokio::test]
async fn test_td_header_and_cell_trimming() {
    let table = FakeElement::new("table", "").with_children(
        "tr",
        vec![
            cells("td", &[" Court ", " Judge "]),
            cells("th", &["Morning Session"]),
            cells("td", &["  4 ", "\nHon. X\n"]),
        ],
    );

    let records = parse_table(&table).await.unwrap();

    assert_eq!(records.len(), 1, "rows without <td> are skipped");
    assert_eq!(records[0].get("Court"), Some("4"));
    assert_eq!(records[0].get("Judge"), Some("Hon. X"));
}

#[tokio::test]
async fn test_header_only_and_empty_tables_parse_to_nothing() {
    assert!(parse_table(&table(&["Sr No"], &[])).await.unwrap().is_empty());
    assert!(parse_table(&empty_table()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_await_skips_tables_without_rows() {
    let browser = FakeBrowser::new()
        .with(Selector::id("resultTable"), empty_table())
        .with(Selector::tag("table"), table(&["Sr No"], &[&["1"]]));

    let found = await_table(&browser, &default_table_strategies(), Duration::ZERO, POLL)
        .await
        .unwrap();

    assert_eq!(parse_table(&found).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_await_accepts_uninspectable_table() {
    let browser = FakeBrowser::new().with(Selector::id("result"), empty_table().broken());

    let found = await_table(&browser, &default_table_strategies(), Duration::ZERO, POLL)
        .await
        .unwrap();

    assert!(found.broken);
}

#[tokio::test]
async fn test_await_polls_until_table_appears() {
    let browser = FakeBrowser::new().appearing_after(
        Selector::id("resultTable"),
        vec![table(&["Sr No"], &[&["1"]])],
        3,
    );

    let result = await_table(
        &browser,
        &[Selector::id("resultTable")],
        Duration::from_secs(5),
        POLL,
    )
    .await;

    tokio_test::assert_ok!(result);
    assert_eq!(browser.lookups(&Selector::id("resultTable")), 4);
}

#[tokio::test]
async fn test_await_times_out() {
    let browser = FakeBrowser::new();
    let timeout = Duration::from_millis(20);

    let err = await_table(&browser, &default_table_strategies(), timeout, Duration::from_millis(5))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ScrapeError::TableNotFound { timeout: t } if t == timeout));
    assert!(browser.lookups(&Selector::tag("table")) >= 2);
}
