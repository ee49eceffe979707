//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small retailer and drive the real
//! HTTP fetcher through whole keyword runs.

use crate::common::{
    coordinator, crawl, detail_page, eastbay_rules, listing_page, serve, test_config,
    two_colors_two_sizes,
};
use shoe_scout::crawler::{CrawlSettings, HttpFetcher};
use shoe_scout::state::ProductOutcome;
use shoe_scout::{Coordinator, RunControl};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_air_max_end_to_end() {
    let server = MockServer::start().await;

    // Page 1: two products, the second one a kids' model
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "air max"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &[("100", "/p/100"), ("200", "/p/200")],
            Some("/results/2?q=air+max"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    // Page 2 repeats product 100 under another URL
    serve(
        &server,
        "/results/2",
        200,
        listing_page(&[("100", "/p/100?cm=page2")], None),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/p/100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(
            "Nike Air Max 90 Men's Running Shoes",
            "Nike",
            &two_colors_two_sizes(),
        )))
        .expect(1)
        .mount(&server)
        .await;

    serve(
        &server,
        "/p/200",
        200,
        detail_page("Nike Air Max 90 Kids' Preschool", "Nike", &two_colors_two_sizes()),
    )
    .await;

    let coordinator = coordinator(&server, &test_config());
    let (report, records) = crawl(&coordinator, "  air max ").await;

    assert_eq!(report.keyword, "air max");
    assert_eq!(report.listing_pages, 2);
    assert_eq!(report.references_seen, 3);
    assert_eq!(report.duplicates_skipped, 1);
    assert_eq!(report.count(ProductOutcome::Extracted), 1);
    assert_eq!(report.count(ProductOutcome::OutOfScope), 1);
    assert_eq!(report.records_emitted, 4);

    assert_eq!(records.len(), 4);
    for record in &records {
        assert_eq!(record.keyword, "air max");
        assert_eq!(record.brand, "Nike");
        assert_eq!(record.name, "Nike Air Max 90");
        assert_eq!(record.gender, "Man");
        assert_eq!(record.width, "D - Medium");
        assert_eq!(record.retailer, "Eastbay.com");
        assert!(record.url.ends_with("/p/100"));
    }

    let mut combos: Vec<(String, String, String)> = records
        .iter()
        .map(|r| (r.color.clone(), r.size.clone(), r.price.clone()))
        .collect();
    combos.sort();
    assert_eq!(
        combos,
        vec![
            ("Black/White".into(), "09.0".into(), "$129.99".into()),
            ("Black/White".into(), "10.0".into(), "$119.99".into()),
            ("Triple White".into(), "09.0".into(), "$129.99".into()),
            ("Triple White".into(), "10.0".into(), "$119.99".into()),
        ]
    );

    let black = records.iter().find(|r| r.color == "Black/White").unwrap();
    assert_eq!(
        black.image_url,
        "https://images.eastbay.com/is/image/EBFL2/1234501"
    );
}

#[tokio::test]
async fn test_malformed_payload_is_skipped() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/search",
        200,
        listing_page(&[("1", "/p/broken"), ("2", "/p/good")], None),
    )
    .await;
    serve(
        &server,
        "/p/broken",
        200,
        detail_page("Nike Air Zoom Men's", "Nike", r#"{"1": ["a", "b""#),
    )
    .await;
    serve(
        &server,
        "/p/good",
        200,
        detail_page("Nike Air Zoom Men's", "Nike", &two_colors_two_sizes()),
    )
    .await;

    let coordinator = coordinator(&server, &test_config());
    let (report, records) = crawl(&coordinator, "zoom").await;

    assert_eq!(report.count(ProductOutcome::NoVariants), 1);
    assert_eq!(report.count(ProductOutcome::Extracted), 1);
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.url.ends_with("/p/good")));
}

#[tokio::test]
async fn test_network_errors_do_not_stop_the_run() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/search",
        200,
        listing_page(
            &[("1", "/p/flaky"), ("2", "/p/gone"), ("3", "/p/fine")],
            None,
        ),
    )
    .await;

    // 5xx is retried once, then given up on
    Mock::given(method("GET"))
        .and(path("/p/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    // 404 is not retried
    Mock::given(method("GET"))
        .and(path("/p/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    serve(
        &server,
        "/p/fine",
        200,
        detail_page("Nike Pegasus 40 Men's", "Nike", &two_colors_two_sizes()),
    )
    .await;

    let coordinator = coordinator(&server, &test_config());
    let (report, records) = crawl(&coordinator, "pegasus").await;

    assert_eq!(report.count(ProductOutcome::FetchFailed), 2);
    assert_eq!(report.count(ProductOutcome::Extracted), 1);
    assert_eq!(records.len(), 4);
}

#[tokio::test]
async fn test_pagination_loop_guard() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[("1", "/p/1")], Some("/results/2?q=loop"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Page 2 links straight back to page 1
    Mock::given(method("GET"))
        .and(path("/results/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[("1", "/p/1")], Some("/search?q=loop"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    serve(
        &server,
        "/p/1",
        200,
        detail_page("Nike Air Force 1 Men's", "Nike", &two_colors_two_sizes()),
    )
    .await;

    let coordinator = coordinator(&server, &test_config());
    let (report, records) = crawl(&coordinator, "loop").await;

    assert_eq!(report.listing_pages, 2);
    assert_eq!(report.duplicates_skipped, 1);
    assert_eq!(records.len(), 4);
}

#[tokio::test]
async fn test_failed_listing_only_ends_its_keyword() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[("7", "/p/7")], None)))
        .mount(&server)
        .await;

    serve(
        &server,
        "/p/7",
        200,
        detail_page("Brooks Ghost 15 Men's", "Brooks", &two_colors_two_sizes()),
    )
    .await;

    let coordinator = coordinator(&server, &test_config());
    let keywords = vec!["broken".to_string(), "ghost".to_string()];
    let (tx, mut rx) = mpsc::channel(64);

    let reports = coordinator
        .run_keywords(&keywords, 2, &tx, &RunControl::new())
        .await;
    drop(tx);

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].listing_failures, 1);
    assert_eq!(reports[0].records_emitted, 0);
    assert_eq!(reports[1].records_emitted, 4);

    let mut count = 0;
    while let Some(record) = rx.recv().await {
        assert_eq!(record.keyword, "ghost");
        assert_eq!(record.brand, "Brooks");
        count += 1;
    }
    assert_eq!(count, 4);
}

#[tokio::test]
async fn test_robots_disallowed_products_are_skipped() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/robots.txt",
        200,
        "User-agent: *\nDisallow: /p/private",
    )
    .await;
    serve(
        &server,
        "/search",
        200,
        listing_page(&[("1", "/p/private"), ("2", "/p/public")], None),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/p/private"))
        .respond_with(ResponseTemplate::new(200).set_body_string("never fetched"))
        .expect(0)
        .mount(&server)
        .await;

    serve(
        &server,
        "/p/public",
        200,
        detail_page("Nike Vomero Men's", "Nike", &two_colors_two_sizes()),
    )
    .await;

    let mut config = test_config();
    config.crawler.respect_robots = true;
    let coordinator = coordinator(&server, &config);
    let (report, records) = crawl(&coordinator, "vomero").await;

    assert_eq!(report.count(ProductOutcome::RobotsDenied), 1);
    assert_eq!(report.count(ProductOutcome::Extracted), 1);
    assert_eq!(records.len(), 4);
}

#[tokio::test]
async fn test_cancelled_run_fetches_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[], None)))
        .expect(0)
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, &test_config());
    let control = RunControl::new();
    control.cancel();
    let (tx, _rx) = mpsc::channel(8);

    let report = coordinator.run_keyword("air max", &tx, &control).await;
    assert!(report.stopped_early);
    assert_eq!(report.listing_pages, 0);
}

#[tokio::test]
async fn test_run_timeout_keeps_records_already_sent() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/search",
        200,
        listing_page(&[("1", "/p/1")], Some("/results/2?q=timeout")),
    )
    .await;
    serve(
        &server,
        "/p/1",
        200,
        detail_page("Nike Air Max 90 Men's", "Nike", &two_colors_two_sizes()),
    )
    .await;

    // Page 2 arrives after the deadline has passed
    Mock::given(method("GET"))
        .and(path("/results/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[("2", "/p/late")], Some("/results/3?q=timeout")))
                .set_delay(Duration::from_millis(800)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/late"))
        .respond_with(ResponseTemplate::new(200).set_body_string("never fetched"))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/results/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[], None)))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config();
    let fetcher = HttpFetcher::new(&config.crawler, &config.http).unwrap();
    let settings = CrawlSettings {
        run_timeout: Some(Duration::from_millis(400)),
        ..CrawlSettings::from_config(&config)
    };
    let coordinator = Coordinator::new(Arc::new(fetcher), eastbay_rules(&server), settings);
    let (report, records) = crawl(&coordinator, "timeout").await;

    assert!(report.stopped_early);
    assert_eq!(report.listing_pages, 2);
    assert_eq!(report.count(ProductOutcome::Extracted), 1);
    assert_eq!(report.count(ProductOutcome::Cancelled), 1);
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.url.ends_with("/p/1")));
}
