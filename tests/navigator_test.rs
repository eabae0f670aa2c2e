mod common;

use common::*;
use ecourts_causelist::core::navigator::{select_option, FormLayout, FormNavigator};
use ecourts_causelist::domain::model::Selector;
use std::time::Duration;

fn navigator() -> FormNavigator {
    FormNavigator::new(FormLayout {
        field_wait: Duration::ZERO,
        poll_interval: Duration::from_millis(1),
        ..FormLayout::default()
    })
}

#[tokio::test]
async fn test_fills_all_fields_and_clicks_proceed() {
    let browser = populated_popup(FakeBrowser::new());

    let filled = navigator()
        .populate_and_submit(&browser, "Maharashtra", "Pune", "Pune, Civil and Criminal Court")
        .await;

    assert!(filled);
    assert_eq!(
        browser.actions(),
        vec![
            "choose:state=Maharashtra",
            "choose:district=Pune",
            "choose:complex=Pune, Civil and Criminal Court",
            "click:proceed",
        ]
    );
}

#[tokio::test]
async fn test_later_candidate_ids_are_tried_in_order() {
    let browser = FakeBrowser::new()
        .with(Selector::id("sess_state_code"), select("state", &["Maharashtra"]))
        .with(Selector::id("state"), select("other", &["Maharashtra"]));

    let filled = navigator()
        .populate_and_submit(&browser, "Maharashtra", "Pune", "Pune")
        .await;

    assert!(filled);
    assert_eq!(browser.actions(), vec!["choose:state=Maharashtra"]);
    assert_eq!(browser.lookups(&Selector::id("selState")), 1);
    assert_eq!(browser.lookups(&Selector::id("state")), 0);
}

#[tokio::test]
async fn test_option_match_is_case_insensitive_substring() {
    let field = select("complex", &["Baramati", "PUNE, CIVIL AND CRIMINAL COURT"]);

    let chosen = select_option(&field, "civil and criminal").await.unwrap();

    assert_eq!(chosen.as_deref(), Some("PUNE, CIVIL AND CRIMINAL COURT"));
}

#[tokio::test]
async fn test_empty_desired_value_selects_nothing() {
    let field = select("state", &["Goa", "Maharashtra"]);

    assert_eq!(select_option(&field, "  ").await.unwrap(), None);
}

#[tokio::test]
async fn test_located_field_counts_as_filled_without_match() {
    let browser = FakeBrowser::new().with(Selector::id("selState"), select("state", &["Goa", "Kerala"]));

    let filled = navigator()
        .populate_and_submit(&browser, "Maharashtra", "Pune", "Pune")
        .await;

    assert!(filled);
    assert!(browser.actions().is_empty());
}

#[tokio::test]
async fn test_no_fields_reports_not_filled() {
    let browser = FakeBrowser::new();

    let filled = navigator()
        .populate_and_submit(&browser, "Maharashtra", "Pune", "Pune")
        .await;

    assert!(!filled);
}

#[tokio::test]
async fn test_proceed_matches_value_attribute_of_inputs() {
    let browser = FakeBrowser::new().with_all(
        clickable(),
        vec![
            FakeElement::new("reset", "").with_attr("value", "Reset"),
            FakeElement::new("submit", "").with_attr("value", "SUBMIT"),
        ],
    );

    navigator()
        .populate_and_submit(&browser, "Maharashtra", "Pune", "Pune")
        .await;

    assert_eq!(browser.actions(), vec!["click:submit"]);
}

#[tokio::test]
async fn test_no_keyword_means_no_click() {
    let browser = FakeBrowser::new().with_all(
        clickable(),
        vec![FakeElement::new("close", "Close"), FakeElement::new("help", "Help")],
    );

    navigator()
        .populate_and_submit(&browser, "Maharashtra", "Pune", "Pune")
        .await;

    assert!(browser.actions().is_empty());
}
