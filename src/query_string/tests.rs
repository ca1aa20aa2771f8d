//! Tests for query string module

use super::*;
use crate::collection::{Mixin, RequestContext};
use crate::navigation::NavigationEvent;
use crate::types::{RequestParams, RequestTicket};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn before<S: QueryStore>(sync: &mut QueryParamSynchronizer<S>, params: &RequestParams) {
    let mut outgoing = params.clone();
    let mut resident = params.clone();
    let mut ctx = RequestContext {
        ticket: RequestTicket(1),
        outgoing: &mut outgoing,
        resident: &mut resident,
    };
    sync.before_request(&mut ctx);
}

fn map(value: Value) -> BTreeMap<String, Value> {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// MemoryQueryStore Tests
// ============================================================================

#[test]
fn test_memory_store_set_get_remove() {
    let store = MemoryQueryStore::new();
    assert!(store.is_empty());

    store.set("userId", Some(json!(1)));
    assert_eq!(store.get("userId"), Some(json!(1)));
    assert_eq!(store.len(), 1);

    store.set("userId", Some(Value::Null));
    assert!(store.get("userId").is_none());

    store.set("demo", Some(json!(true)));
    store.set("demo", None);
    assert!(store.is_empty());
}

#[test]
fn test_memory_store_clones_share_state() {
    let store = MemoryQueryStore::new();
    let handle = store.clone();
    handle.set("q", Some(json!("cats")));
    assert_eq!(store.get_all(), map(json!({"q": "cats"})));
}

// ============================================================================
// UrlQueryStore Tests
// ============================================================================

#[test]
fn test_url_store_writes_query_string() {
    let store = UrlQueryStore::parse("https://app.example.com/trips").unwrap();
    store.set("userId", Some(json!(1)));
    store.set("demo", Some(json!(true)));
    assert_eq!(store.url().as_str(), "https://app.example.com/trips?userId=1&demo=true");

    assert_eq!(store.get("userId"), Some(json!("1")));
    assert_eq!(store.get_all(), map(json!({"userId": "1", "demo": "true"})));
}

#[test]
fn test_url_store_replace_keeps_position() {
    let store = UrlQueryStore::parse("https://app.example.com/?a=1&b=2&a=3").unwrap();
    store.set("a", Some(json!("x")));
    assert_eq!(store.url().as_str(), "https://app.example.com/?a=x&b=2");
}

#[test]
fn test_url_store_empty_query_removed() {
    let store = UrlQueryStore::parse("https://app.example.com/trips?tab=all").unwrap();
    store.set("tab", None);
    assert_eq!(store.url().as_str(), "https://app.example.com/trips");
    assert!(store.get_all().is_empty());
}

#[test]
fn test_url_store_expands_arrays() {
    let store = UrlQueryStore::parse("https://app.example.com/trips?tab=all").unwrap();
    store.set("tags", Some(json!(["a", "b"])));
    assert_eq!(
        store.url().as_str(),
        "https://app.example.com/trips?tab=all&tags=a&tags=b"
    );
    assert_eq!(store.get("tags"), Some(json!(["a", "b"])));
    assert_eq!(store.get_all(), map(json!({"tab": "all", "tags": ["a", "b"]})));

    store.set("tags", Some(json!("c")));
    assert_eq!(store.url().as_str(), "https://app.example.com/trips?tab=all&tags=c");

    store.set("tags", Some(json!([])));
    assert_eq!(store.url().as_str(), "https://app.example.com/trips?tab=all");
}

#[test]
fn test_url_store_rejects_bad_url() {
    assert!(UrlQueryStore::parse("not a url").is_err());
}

// ============================================================================
// Synchronizer Tests
// ============================================================================

#[test]
fn test_mirrors_request_params() {
    let store = MemoryQueryStore::new();
    let mut sync = QueryParamSynchronizer::new(store.clone());

    before(
        &mut sync,
        &RequestParams::new().with_filter("userId", 1).with_filter("demo", true),
    );
    assert_eq!(store.get_all(), map(json!({"userId": 1, "demo": true})));
    assert_eq!(sync.mirrored(), &map(json!({"userId": 1, "demo": true})));
}

#[test]
fn test_mirrors_page_and_limit() {
    let store = MemoryQueryStore::new();
    let mut sync = QueryParamSynchronizer::new(store.clone());

    before(&mut sync, &RequestParams::new().with_page(1).with_limit(10));
    assert_eq!(store.get_all(), map(json!({"page": 1, "limit": 10})));
}

#[test]
fn test_next_request_replaces_mirror() {
    let store = MemoryQueryStore::new();
    let mut sync = QueryParamSynchronizer::new(store.clone());

    before(
        &mut sync,
        &RequestParams::new().with_filter("userId", 1).with_filter("demo", true),
    );
    before(
        &mut sync,
        &RequestParams::new()
            .with_filter("userId", 1)
            .with_filter("demo", false)
            .with_filter("cats", "meow"),
    );
    assert_eq!(
        store.get_all(),
        map(json!({"userId": 1, "demo": false, "cats": "meow"}))
    );

    before(&mut sync, &RequestParams::new());
    assert!(store.is_empty());
    assert!(sync.mirrored().is_empty());
}

#[test]
fn test_foreign_keys_untouched() {
    let store = MemoryQueryStore::new();
    store.set("tab", Some(json!("upcoming")));
    let mut sync = QueryParamSynchronizer::new(store.clone());

    before(&mut sync, &RequestParams::new().with_filter("userId", 1));
    before(&mut sync, &RequestParams::new());
    sync.on_navigation(NavigationEvent::RouteChanged);

    assert_eq!(store.get_all(), map(json!({"tab": "upcoming"})));
}

#[test]
fn test_navigation_clears_mirror() {
    let store = MemoryQueryStore::new();
    let mut sync = QueryParamSynchronizer::new(store.clone());
    before(
        &mut sync,
        &RequestParams::new().with_filter("userId", 1).with_filter("demo", true),
    );

    sync.on_navigation(NavigationEvent::StateChanged);
    assert!(store.is_empty());

    // idempotent
    sync.on_navigation(NavigationEvent::RouteChanged);
    assert_eq!(sync.clear(), 0);
    assert!(store.is_empty());
}

#[test]
fn test_clear_on_empty_mirror() {
    let mut sync = QueryParamSynchronizer::new(MemoryQueryStore::new());
    assert_eq!(sync.clear(), 0);
}

#[test]
fn test_declares_order_after_paginate() {
    let sync = QueryParamSynchronizer::new(MemoryQueryStore::new());
    assert_eq!(sync.name(), QUERY_STRING_MIXIN);
    assert_eq!(sync.runs_after(), &[crate::pagination::PAGINATE_MIXIN]);
}

#[test]
fn test_address_bar_matches_request_query() {
    let store = UrlQueryStore::parse("https://app.example.com/").unwrap();
    let mut sync = QueryParamSynchronizer::new(store.clone());
    let params = RequestParams::new()
        .with_page(2)
        .with_limit(5)
        .with_filter("tags", json!(["a", "b"]))
        .with_filter("demo", true);

    before(&mut sync, &params);

    let mut written: Vec<(String, String)> = store
        .url()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    written.sort();
    assert_eq!(written, params.to_query_pairs());
}

#[test]
fn test_two_synchronizers_share_address_bar() {
    let store = UrlQueryStore::parse("https://app.example.com/").unwrap();
    let mut trips = QueryParamSynchronizer::new(store.clone());
    let mut users = QueryParamSynchronizer::new(store.clone());

    before(&mut trips, &RequestParams::new().with_filter("tripId", 4));
    before(&mut users, &RequestParams::new().with_filter("userId", 9));
    trips.clear();

    assert_eq!(store.url().as_str(), "https://app.example.com/?userId=9");
}
