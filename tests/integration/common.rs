//! Shared fixtures: a retailer served by a wiremock server

use shoe_scout::config::Config;
use shoe_scout::crawler::{CrawlReport, CrawlSettings, HttpFetcher};
use shoe_scout::rules::{builtin_rule_set, CompiledRules};
use shoe_scout::{Coordinator, ProductVariantRecord, RunControl};
use std::sync::Arc;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config tuned for fast tests: no pacing, one quick retry
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.min_request_interval_ms = 0;
    config.crawler.max_retries = 1;
    config.crawler.retry_delay_ms = 10;
    config.crawler.request_timeout_secs = 5;
    config.crawler.connect_timeout_secs = 2;
    config.http.user_agent = "ScoutTest/1.0".to_string();
    config
}

/// The eastbay rule set pointed at the mock server
pub fn eastbay_rules(server: &MockServer) -> Arc<CompiledRules> {
    let mut rules = builtin_rule_set("eastbay")
        .expect("preset parses")
        .expect("preset exists");
    rules.search_url = format!("{}/search?q={{keyword}}", server.uri());
    Arc::new(CompiledRules::compile(rules).expect("preset compiles"))
}

pub fn coordinator(server: &MockServer, config: &Config) -> Coordinator<HttpFetcher> {
    let fetcher = HttpFetcher::new(&config.crawler, &config.http).expect("client builds");
    Coordinator::new(
        Arc::new(fetcher),
        eastbay_rules(server),
        CrawlSettings::from_config(config),
    )
}

/// Runs one keyword and collects everything it sent
pub async fn crawl(
    coordinator: &Coordinator<HttpFetcher>,
    keyword: &str,
) -> (CrawlReport, Vec<ProductVariantRecord>) {
    let (tx, mut rx) = mpsc::channel(256);
    let report = coordinator
        .run_keyword(keyword, &tx, &RunControl::new())
        .await;
    drop(tx);

    let mut records = Vec::new();
    while let Some(record) = rx.recv().await {
        records.push(record);
    }
    (report, records)
}

/// A search results page in the eastbay layout
pub fn listing_page(items: &[(&str, &str)], next: Option<&str>) -> String {
    let items: String = items
        .iter()
        .map(|(id, href)| {
            format!(
                r#"<li data-model="{}"><a href="{}"><img src="/t.jpg"></a><a href="{}">Details</a></li>"#,
                id, href, href
            )
        })
        .collect();
    let next = next
        .map(|n| {
            format!(
                r#"<div class="endeca_pagination"><a class="prev" href="/search">prev</a><a class="next" href="{}">next</a></div>"#,
                n
            )
        })
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html><html><body><div id="endeca_search_results"><ul>{}</ul></div>{}</body></html>"#,
        items, next
    )
}

/// A product page in the eastbay layout with the given `styles` payload
pub fn detail_page(title: &str, brand: &str, styles: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head>
<meta name="title" content="{title}">
<script type="text/javascript">var tagMgt = {{}}; tagMgt.brand = "{brand}"; tagMgt.sku = "x";</script>
</head><body>
<div class="content_container">
  <script>var model = {{"NM": "{title}"}};</script>
  <script>var styles = {styles};</script>
</div>
</body></html>"#
    )
}

/// Two colors, each in two sizes
pub fn two_colors_two_sizes() -> String {
    let style = |color: &str, sku: &str| {
        format!(
            r#"["{sku}", "", "", "", "", "", "$129.99", [[" 09.0 ", "", "$129.99"], [" 10.0 ", "", "$119.99"]], "", "", "", "", "", "", "", "{color}", "D - Medium"]"#
        )
    };
    format!(
        r#"{{"1234501": {}, "1234502": {}}}"#,
        style("Black/White", "1234501"),
        style("Triple White", "1234502")
    )
}

pub async fn serve(server: &MockServer, at: &str, status: u16, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body.into())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}
