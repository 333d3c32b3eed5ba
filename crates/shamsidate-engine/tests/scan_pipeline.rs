//! End-to-end scans over realistic document trees.

use pretty_assertions::assert_eq;
use shamsidate_engine::{
    ChangeMonitor, Engine, MonitorOptions, NodeId, ScanOptions, Tree, TreeEvent,
};
use std::time::Duration;

const ASSUMED_YEAR: i32 = 2024;

fn engine() -> Engine {
    Engine::new(ScanOptions::new(ASSUMED_YEAR))
}

/// A small news-page-shaped tree with dates in text, attributes, scripts
/// and relative-time widgets.
fn news_page() -> (Tree, Vec<NodeId>) {
    let mut tree = Tree::new("body");
    let article = tree.push_element(tree.root(), "article");
    let headline = tree.push_text(article, "Elections held on 2024-03-20 across the country");
    let byline = tree.push_text(article, "Filed 11/4/1979, updated March 20, 2024");
    let stamp = tree.push_element(article, "span");
    tree.set_attr(stamp, "title", "published 2024-03-20 08:15");
    let widget = tree.push_element(article, "span");
    tree.set_attr(widget, "data-relative", "");
    let widget_text = tree.push_text(widget, "2024-03-20");
    let relative = tree.push_text(article, "3 hours ago");
    let script = tree.push_element(tree.root(), "script");
    let script_text = tree.push_text(script, "var when = '2024-03-20';");
    (
        tree,
        vec![headline, byline, widget_text, relative, script_text, stamp],
    )
}

#[test]
fn full_page_scan_converts_only_what_it_should() {
    let (mut tree, nodes) = news_page();
    let [headline, byline, widget_text, relative, script_text, stamp] = nodes[..] else {
        unreachable!()
    };

    let mut engine = engine();
    let stats = engine.initial_scan(&mut tree);

    assert_eq!(
        tree.text(headline),
        Some("Elections held on 1403/01/01 across the country")
    );
    assert_eq!(
        tree.text(byline),
        Some("Filed 1358/08/13, updated 1403/01/01")
    );
    assert_eq!(tree.attr(stamp, "title"), Some("published 1403/01/01 08:15"));
    // Untouchables: relative widgets, relative phrases, script content.
    assert_eq!(tree.text(widget_text), Some("2024-03-20"));
    assert_eq!(tree.text(relative), Some("3 hours ago"));
    assert_eq!(tree.text(script_text), Some("var when = '2024-03-20';"));

    assert_eq!(stats.conversions, 3);
    assert_eq!(stats.attribute_conversions, 1);
    assert!(engine.last_profile().is_some());
}

#[test]
fn second_pass_over_unchanged_tree_mutates_nothing() {
    let (mut tree, _) = news_page();
    let mut engine = engine();
    engine.initial_scan(&mut tree);
    let snapshot = tree.clone();

    // A fresh engine has no processing marks; idempotence must hold on the
    // text alone.
    let stats = crate::engine().initial_scan(&mut tree);

    assert_eq!(tree, snapshot);
    assert!(!stats.changed_anything());
}

#[test]
fn rescan_request_converges_a_tree_grown_behind_the_engines_back() {
    let (mut tree, _) = news_page();
    let mut engine = engine();
    engine.initial_scan(&mut tree);

    let late = tree.push_text(tree.root(), "correction issued 31.12.2024");
    let stats = engine.process_batch(
        &mut tree,
        vec![TreeEvent::RescanRequested { timestamp_ms: 1234 }],
    );

    assert_eq!(tree.text(late), Some("correction issued 1403/10/11"));
    assert_eq!(stats.conversions, 1);
}

#[test]
fn monitor_feeds_incremental_inserts_through_the_engine() {
    let (mut tree, _) = news_page();
    let mut engine = engine();
    engine.initial_scan(&mut tree);

    let (tx, monitor) = ChangeMonitor::channel(MonitorOptions {
        debounce: Duration::from_millis(10),
        ..MonitorOptions::default()
    });

    let first = tree.push_element(tree.root(), "div");
    let first_text = tree.push_text(first, "live update 2024-12-31 23:59");
    let second = tree.push_element(tree.root(), "div");
    let second_text = tree.push_text(second, "more at 05/06/2024");
    tx.send(TreeEvent::SubtreeInserted { node: first }).unwrap();
    tx.send(TreeEvent::SubtreeInserted { node: second }).unwrap();
    drop(tx);

    monitor.run(&mut engine, &mut tree);

    assert_eq!(tree.text(first_text), Some("live update 1403/10/11 23:59"));
    // Both fields plausible: month-first default applies.
    assert_eq!(tree.text(second_text), Some("more at 1403/02/17"));
}

#[test]
fn mixed_unit_with_converted_and_fresh_dates_converges() {
    let mut tree = Tree::new("body");
    let node = tree.push_text(tree.root(), "window 1403/01/01 to 2024-12-31");
    let mut engine = engine();
    engine.initial_scan(&mut tree);
    assert_eq!(tree.text(node), Some("window 1403/01/01 to 1403/10/11"));

    // And once fully converted, the unit is guarded on the next pass.
    let stats = engine.process_batch(
        &mut tree,
        vec![TreeEvent::RescanRequested { timestamp_ms: 0 }],
    );
    assert_eq!(tree.text(node), Some("window 1403/01/01 to 1403/10/11"));
    assert!(!stats.changed_anything());
}

#[test]
fn out_of_range_dates_survive_every_entry_point() {
    let mut tree = Tree::new("body");
    let node = tree.push_text(tree.root(), "founded 1850-05-06, reopened 2200-01-01");
    let mut engine = engine();

    let stats = engine.initial_scan(&mut tree);

    assert_eq!(
        tree.text(node),
        Some("founded 1850-05-06, reopened 2200-01-01")
    );
    assert_eq!(stats.conversions, 0);
    assert_eq!(stats.warnings, 2);
}

#[test]
fn bare_month_annotation_round_trips_through_the_pipeline() {
    let mut tree = Tree::new("body");
    let node = tree.push_text(tree.root(), "the Nov schedule");
    let mut engine = engine();

    engine.initial_scan(&mut tree);
    assert_eq!(tree.text(node), Some("the Nov (آبان) schedule"));

    let stats = crate::engine().initial_scan(&mut tree);
    assert_eq!(tree.text(node), Some("the Nov (آبان) schedule"));
    assert!(!stats.changed_anything());
}
