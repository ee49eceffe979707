//! Integration tests for sinks and configuration files

use crate::common::{coordinator, detail_page, listing_page, serve, test_config, two_colors_two_sizes};
use shoe_scout::config::{load_config, load_config_with_hash, OutputFormat};
use shoe_scout::output::{open_sink, spawn_writer, SqliteSink};
use shoe_scout::{ConfigError, RunControl};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use tokio::sync::mpsc;
use wiremock::MockServer;

async fn mount_single_product(server: &MockServer) {
    serve(server, "/search", 200, listing_page(&[("9", "/p/9")], None)).await;
    serve(
        server,
        "/p/9",
        200,
        detail_page("Nike Air Max 270, Special Edition Men's", "Nike", &two_colors_two_sizes()),
    )
    .await;
}

#[tokio::test]
async fn test_csv_header_and_rows() {
    let server = MockServer::start().await;
    mount_single_product(&server).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("eastbay_test.csv");
    let sink = open_sink(OutputFormat::Csv, &output).unwrap();

    let (tx, rx) = mpsc::channel(16);
    let writer = spawn_writer(sink, rx);
    let coordinator = coordinator(&server, &test_config());
    let reports = coordinator
        .run_keywords(&["air max".to_string()], 1, &tx, &RunControl::new())
        .await;
    drop(tx);

    let written = writer.await.unwrap().unwrap();
    assert_eq!(written, 4);
    assert_eq!(reports[0].records_emitted, 4);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        header,
        vec![
            "Keyword", "Brand", "Shoe", "Price", "URL", "Image URL", "Size", "Width", "Color",
            "Gender", "Retailer"
        ]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(row.len(), 11);
        assert_eq!(&row[0], "air max");
        assert_eq!(&row[1], "Nike");
        // The comma in the name survives quoting
        assert_eq!(&row[2], "Nike Air Max 270, Special Edition");
        assert!(row[3].starts_with('$'));
        assert!(row[4].ends_with("/p/9"));
        assert_eq!(&row[9], "Man");
        assert_eq!(&row[10], "Eastbay.com");
    }
}

#[tokio::test]
async fn test_sqlite_output() {
    let server = MockServer::start().await;
    mount_single_product(&server).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("eastbay_test.db");
    let sink = open_sink(OutputFormat::Sqlite, &output).unwrap();

    let (tx, rx) = mpsc::channel(16);
    let writer = spawn_writer(sink, rx);
    let coordinator = coordinator(&server, &test_config());
    coordinator
        .run_keywords(&["air max".to_string()], 1, &tx, &RunControl::new())
        .await;
    drop(tx);
    assert_eq!(writer.await.unwrap().unwrap(), 4);

    let stored = SqliteSink::open(&output).unwrap();
    assert_eq!(stored.count().unwrap(), 4);
    let rows = stored.rows_for_keyword("air max").unwrap();
    assert!(rows.iter().all(|r| r.brand == "Nike"));
}

#[test]
fn test_config_file_with_custom_retailer() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[crawler]
max-concurrent-details = 8
keyword-concurrency = 2

[http]
proxies = ["http://10.0.0.1:3128", "socks5://10.0.0.2:1080"]

[output]
format = "sqlite"
directory = "out"

[[retailer]]
name = "runshop"
retailer = "RunShop"
search-url = "https://runshop.example/search?q={{keyword}}"

[retailer.listing]
item-selector = ".product"
next-page-selector = "a.next"

[retailer.title]
selector = "h1"
default-gender = "Unisex"
name-mode = "full-title"

[retailer.brand]
kind = "title-token"
index = 0

[retailer.variants]
layout = "positional"
image-template = "https://img.runshop.example/{{id}}"

[retailer.variants.payload]
script-selector = "script"
start-sentinel = "var styles = "

[retailer.variants.fields]
price = 0
sizes = 1
color = 2
width = 3
size-label = 0
"#
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(file.path()).unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(config.crawler.max_concurrent_details, 8);
    assert_eq!(config.http.proxies.len(), 2);
    assert_eq!(config.output.format, OutputFormat::Sqlite);

    let rule_set = config.rule_set("runshop").unwrap().unwrap();
    assert_eq!(rule_set.retailer, "RunShop");
    assert_eq!(rule_set.file_prefix(), "runshop");

    // Built-ins stay available next to custom rule sets
    assert!(config.rule_set("jackrabbit").unwrap().is_some());
    assert!(config.rule_set("nowhere").unwrap().is_none());
}

#[test]
fn test_config_rejects_bad_selector() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[[retailer]]
name = "broken"
retailer = "Broken"
search-url = "https://broken.example/search?q={{keyword}}"

[retailer.listing]
item-selector = "div[["

[retailer.title]
selector = "h1"

[retailer.variants]
layout = "positional"

[retailer.variants.payload]
script-selector = "script"
start-sentinel = "var styles = "

[retailer.variants.fields]
price = 0
sizes = 1
color = 2
width = 3
size-label = 0
"#
    )
    .unwrap();

    let result = load_config(file.path());
    assert!(matches!(result, Err(ConfigError::InvalidSelector { .. })));
}

#[test]
fn test_config_rejects_out_of_range_values() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[crawler]\nmax-concurrent-details = 0").unwrap();
    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::Validation(_))
    ));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[http]\nproxies = [\"ftp://proxy.example\"]").unwrap();
    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::InvalidUrl(_))
    ));
}
