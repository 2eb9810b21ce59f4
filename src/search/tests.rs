//! Tests for the search module

use super::*;
use crate::config::ClientConfig;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scheduler_for(server: &MockServer) -> Scheduler {
    Scheduler::builder()
        .config(ClientConfig::builder().base_url(server.uri()).build())
        .build()
        .unwrap()
}

/// Bounded so a matcher mismatch fails the test instead of hanging it
fn test_retry() -> Retry {
    Retry::new(Duration::from_millis(10)).with_attempts(2)
}

fn repos(names: &[&str]) -> serde_json::Value {
    json!(names
        .iter()
        .map(|name| json!({"full_name": name, "stargazers_count": 1}))
        .collect::<Vec<_>>())
}

#[tokio::test]
async fn test_search_walks_pages_and_pads_ticks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "link",
                    format!("<{}/page2>; rel=\"next\"", server.uri()).as_str(),
                )
                .set_body_json(json!({"items": repos(&["a/1", "a/2", "a/3"])})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": repos(&["b/1", "b/2"])
        })))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server);

    let ticks = Arc::new(AtomicUsize::new(0));
    let plans = Arc::new(Mutex::new(Vec::new()));
    let handled = Arc::new(Mutex::new(Vec::new()));

    let tick_counter = Arc::clone(&ticks);
    let plan_log = Arc::clone(&plans);
    let handled_log = Arc::clone(&handled);

    Search::new("rust")
        .limit(10)
        .retry(test_retry())
        .on_tick(move || {
            tick_counter.fetch_add(1, Ordering::SeqCst);
        })
        .on_plan(move |limit| plan_log.lock().unwrap().push(limit))
        .run(&scheduler, |item| {
            handled_log
                .lock()
                .unwrap()
                .push(item["full_name"].as_str().unwrap_or("").to_string());
            true
        })
        .await
        .unwrap();

    // Raw item order is preserved across the page boundary
    assert_eq!(
        *handled.lock().unwrap(),
        vec!["a/1", "a/2", "a/3", "b/1", "b/2"]
    );
    // 5 real results, then padding up to the limit
    assert_eq!(ticks.load(Ordering::SeqCst), 10);
    assert_eq!(*plans.lock().unwrap(), vec![10]);
}

#[tokio::test]
async fn test_search_stops_at_limit_mid_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": repos(&["a/1", "a/2", "a/3", "a/4", "a/5"])
        })))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server);

    let ticks = Arc::new(AtomicUsize::new(0));
    let handled = Arc::new(AtomicUsize::new(0));

    let tick_counter = Arc::clone(&ticks);
    let handled_counter = Arc::clone(&handled);

    Search::new("rust")
        .limit(2)
        .retry(test_retry())
        .on_tick(move || {
            tick_counter.fetch_add(1, Ordering::SeqCst);
        })
        .run(&scheduler, move |_| {
            handled_counter.fetch_add(1, Ordering::SeqCst);
            true
        })
        .await
        .unwrap();

    assert_eq!(ticks.load(Ordering::SeqCst), 2);
    // The walk stops as soon as the limit is met; no extra items are pulled
    assert_eq!(handled.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_search_counts_only_accepted_results() {
    let server = MockServer::start().await;

    let names: Vec<String> = (0..150).map(|n| format!("owner/repo-{n}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"items": repos(&name_refs)})),
        )
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server);

    let ticks = Arc::new(AtomicUsize::new(0));
    let accepted = Arc::new(AtomicUsize::new(0));
    let seen = AtomicUsize::new(0);

    let tick_counter = Arc::clone(&ticks);
    let accepted_counter = Arc::clone(&accepted);

    Search::new("rust")
        .limit(100)
        .retry(test_retry())
        .on_tick(move || {
            tick_counter.fetch_add(1, Ordering::SeqCst);
        })
        .run(&scheduler, move |_| {
            // Accept the 1st and 2nd of every 3 raw results
            let n = seen.fetch_add(1, Ordering::SeqCst);
            let keep = n % 3 != 2;
            if keep {
                accepted_counter.fetch_add(1, Ordering::SeqCst);
            }
            keep
        })
        .await
        .unwrap();

    assert_eq!(accepted.load(Ordering::SeqCst), 100);
    assert_eq!(ticks.load(Ordering::SeqCst), 100);
}

#[tokio::test]
async fn test_search_with_no_results_still_plans_and_ticks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server);

    let ticks = Arc::new(AtomicUsize::new(0));
    let plans = Arc::new(Mutex::new(Vec::new()));

    let tick_counter = Arc::clone(&ticks);
    let plan_log = Arc::clone(&plans);

    Search::new("no such repo anywhere")
        .limit(7)
        .retry(test_retry())
        .on_tick(move || {
            tick_counter.fetch_add(1, Ordering::SeqCst);
        })
        .on_plan(move |limit| plan_log.lock().unwrap().push(limit))
        .run(&scheduler, |_| true)
        .await
        .unwrap();

    assert_eq!(ticks.load(Ordering::SeqCst), 7);
    assert_eq!(*plans.lock().unwrap(), vec![7]);
}

#[tokio::test]
async fn test_search_missing_results_array_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "no items here"})),
        )
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server);

    let result = Search::new("rust")
        .limit(5)
        .retry(test_retry())
        .run(&scheduler, |_| true)
        .await;

    assert!(matches!(result, Err(Error::MissingResults { .. })));
}

#[tokio::test]
async fn test_search_malformed_link_header_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", "page2; rel=\"next\"")
                .set_body_json(json!({"items": repos(&["a/1"])})),
        )
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server);

    let result = Search::new("rust")
        .limit(5)
        .retry(test_retry())
        .run(&scheduler, |_| true)
        .await;

    assert!(matches!(result, Err(Error::LinkHeader { .. })));
}

#[tokio::test]
async fn test_search_retries_failed_page_fetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": repos(&["a/1"])
        })))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server);

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let status_log = Arc::clone(&statuses);

    Search::new("rust")
        .limit(1)
        .retry(Retry::new(Duration::from_millis(10)).with_attempts(3))
        .on_status(move |status| status_log.lock().unwrap().push(status.to_string()))
        .run(&scheduler, |_| true)
        .await
        .unwrap();

    let statuses = statuses.lock().unwrap();
    assert!(statuses.iter().any(|s| s.contains("Retrying shortly")));
}

#[tokio::test]
async fn test_search_omits_default_sort() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "rust cli"))
        .and(query_param("order", "desc"))
        .and(query_param_is_missing("sort"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server);

    Search::new("rust cli")
        .limit(1)
        .retry(test_retry())
        .run(&scheduler, |_| true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_search_sends_explicit_sort_and_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "rust"))
        .and(query_param("sort", "stars"))
        .and(query_param("order", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let scheduler = scheduler_for(&server);

    Search::new("rust")
        .limit(1)
        .sort(SortKey::Stars)
        .order(SortOrder::Asc)
        .retry(test_retry())
        .run(&scheduler, |_| true)
        .await
        .unwrap();
}
