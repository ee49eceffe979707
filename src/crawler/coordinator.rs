//! Crawler coordinator - main crawl orchestration logic
//!
//! One keyword run walks the listing pages of one retailer strictly in order,
//! deduplicates the product references it finds and hands each new one to a
//! detail task. Detail tasks run concurrently up to the configured worker
//! count and send their records to a single writer through a channel.

use crate::config::Config;
use crate::crawler::parser::parse_listing;
use crate::crawler::Fetcher;
use crate::extract::{extract, ExtractionFailure};
use crate::model::{ProductReference, ProductVariantRecord};
use crate::robots::RobotsGate;
use crate::rules::CompiledRules;
use crate::state::{ProductOutcome, RunControl, VisitedSet};
use crate::url::build_search_url;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use url::Url;

/// Progress summary interval, in completed products
const PROGRESS_EVERY: usize = 10;

/// Capacity of the channel behind [`Coordinator::records`]
const RECORD_BUFFER: usize = 256;

/// Knobs of one keyword run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Detail pages fetched concurrently
    pub max_concurrent_details: usize,

    /// Listing pages followed; None means until no next link
    pub max_listing_pages: Option<u32>,

    /// Per-keyword time limit
    pub run_timeout: Option<Duration>,

    /// Check robots.txt before every fetch
    pub respect_robots: bool,

    /// Agent name matched against robots.txt groups
    pub robots_agent: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_concurrent_details: 4,
            max_listing_pages: None,
            run_timeout: None,
            respect_robots: false,
            robots_agent: "*".to_string(),
        }
    }
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent_details: config.crawler.max_concurrent_details.max(1) as usize,
            max_listing_pages: config.crawler.max_listing_pages(),
            run_timeout: config.crawler.run_timeout(),
            respect_robots: config.crawler.respect_robots,
            robots_agent: config.http.user_agent.clone(),
        }
    }
}

/// What one keyword run did
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub keyword: String,
    pub retailer: String,

    /// Listing pages fetched and parsed
    pub listing_pages: usize,

    /// Listing pages that could not be fetched
    pub listing_failures: usize,

    /// Product references found across all listing pages
    pub references_seen: usize,

    /// References dropped because their id was already dispatched
    pub duplicates_skipped: usize,

    pub records_emitted: usize,

    /// Detail tasks that panicked
    pub task_failures: usize,

    /// Dispatched products per final outcome
    pub outcomes: BTreeMap<ProductOutcome, usize>,

    /// The run stopped on cancellation or timeout
    pub stopped_early: bool,

    pub duration: Duration,
}

impl CrawlReport {
    fn new(keyword: &str, retailer: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            retailer: retailer.to_string(),
            ..Self::default()
        }
    }

    pub fn count(&self, outcome: ProductOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Products that went through the detail extractor
    pub fn products_dispatched(&self) -> usize {
        self.outcomes.values().sum()
    }
}

/// Result of one detail task
#[derive(Debug)]
struct DetailResult {
    url: Url,
    outcome: ProductOutcome,
    records: usize,
}

/// Main crawler coordinator structure
///
/// Holds nothing keyword-specific: every call to [`Coordinator::run_keyword`]
/// starts with a fresh visited set.
pub struct Coordinator<F: Fetcher> {
    fetcher: Arc<F>,
    rules: Arc<CompiledRules>,
    settings: CrawlSettings,
}

impl<F: Fetcher> Clone for Coordinator<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            rules: Arc::clone(&self.rules),
            settings: self.settings.clone(),
        }
    }
}

impl<F: Fetcher> Coordinator<F> {
    pub fn new(fetcher: Arc<F>, rules: Arc<CompiledRules>, settings: CrawlSettings) -> Self {
        Self {
            fetcher,
            rules,
            settings,
        }
    }

    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    /// Crawls one keyword, sending every record to `sink`
    ///
    /// Never fails: network and extraction errors are logged and counted in
    /// the returned report. The run ends when the last listing page has no
    /// next link, a listing page cannot be fetched, pagination loops, the
    /// page limit is reached or `control` stops.
    pub async fn run_keyword(
        &self,
        keyword: &str,
        sink: &mpsc::Sender<ProductVariantRecord>,
        control: &RunControl,
    ) -> CrawlReport {
        let keyword = keyword.trim();
        let started = Instant::now();
        let control = control.child(self.settings.run_timeout);
        let mut report = CrawlReport::new(keyword, self.rules.retailer());

        let rule_set = self.rules.rules();
        let mut next = match build_search_url(&rule_set.search_url, keyword, &rule_set.keyword_suffix) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::error!("[{}] Cannot build search URL: {}", keyword, e);
                None
            }
        };

        let visited = VisitedSet::new();
        let mut listings_seen: HashSet<String> = HashSet::new();
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent_details.max(1)));
        let robots = self
            .settings
            .respect_robots
            .then(|| Arc::new(RobotsGate::new(self.settings.robots_agent.clone())));
        let mut tasks: JoinSet<DetailResult> = JoinSet::new();

        tracing::info!("[{}] Starting {} crawl", keyword, self.rules.retailer());

        'pages: while let Some(url) = next.take() {
            if control.is_stopped() {
                report.stopped_early = true;
                break;
            }

            if let Some(max) = self.settings.max_listing_pages {
                if report.listing_pages >= max as usize {
                    tracing::info!("[{}] Reached the limit of {} listing pages", keyword, max);
                    break;
                }
            }

            if !listings_seen.insert(url.to_string()) {
                tracing::warn!("[{}] Pagination loops back to {}, stopping", keyword, url);
                break;
            }

            if let Some(gate) = &robots {
                if !gate.is_allowed(self.fetcher.as_ref(), &url).await {
                    tracing::warn!("[{}] Listing page {} disallowed by robots.txt", keyword, url);
                    break;
                }
            }

            tracing::debug!("[{}] Fetching listing page {}", keyword, url);
            let page = match self.fetcher.fetch(&url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("[{}] Listing page failed, pagination ends: {}", keyword, e);
                    report.listing_failures += 1;
                    break;
                }
            };
            report.listing_pages += 1;

            let listing = parse_listing(&page.body, &page.url, &self.rules);
            tracing::debug!(
                "[{}] Listing page {} has {} products",
                keyword,
                report.listing_pages,
                listing.products.len()
            );

            for product in listing.products {
                report.references_seen += 1;

                if !visited.mark_if_new(&product.id) {
                    report.duplicates_skipped += 1;
                    tracing::trace!("[{}] Already dispatched {}", keyword, product.id);
                    continue;
                }

                while let Some(joined) = tasks.try_join_next() {
                    self.record_result(&mut report, joined);
                }

                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    break 'pages;
                };

                let fetcher = Arc::clone(&self.fetcher);
                let rules = Arc::clone(&self.rules);
                let robots = robots.clone();
                let sink = sink.clone();
                let control = control.clone();
                let keyword = keyword.to_string();

                tasks.spawn(async move {
                    let result = process_product(
                        fetcher.as_ref(),
                        &rules,
                        robots.as_deref(),
                        product,
                        &keyword,
                        &sink,
                        &control,
                    )
                    .await;
                    drop(permit);
                    result
                });
            }

            next = listing.next_page;
        }

        while let Some(joined) = tasks.join_next().await {
            self.record_result(&mut report, joined);
        }

        if control.is_stopped() {
            report.stopped_early = true;
        }
        report.duration = started.elapsed();

        tracing::info!(
            "[{}] Finished: {} listing pages, {} products, {} records in {:.1}s{}",
            keyword,
            report.listing_pages,
            report.products_dispatched(),
            report.records_emitted,
            report.duration.as_secs_f64(),
            if report.stopped_early { " (stopped early)" } else { "" }
        );

        report
    }

    /// Crawls one keyword in the background, yielding records as they arrive
    ///
    /// Dropping the stream without draining it stops the run once its
    /// channel fills up.
    pub fn records(&self, keyword: &str, control: RunControl) -> RecordStream {
        let (tx, rx) = mpsc::channel(RECORD_BUFFER);
        let coordinator = self.clone();
        let keyword = keyword.to_string();

        let handle = tokio::spawn(async move { coordinator.run_keyword(&keyword, &tx, &control).await });

        RecordStream { rx, handle }
    }

    /// Crawls several keywords, at most `concurrency` at a time
    ///
    /// Keyword runs share nothing but the fetcher and the sink. Reports come
    /// back in the order the keywords were given; a keyword whose task
    /// panicked is logged and left out.
    pub async fn run_keywords(
        &self,
        keywords: &[String],
        concurrency: usize,
        sink: &mpsc::Sender<ProductVariantRecord>,
        control: &RunControl,
    ) -> Vec<CrawlReport> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut runs: JoinSet<(usize, CrawlReport)> = JoinSet::new();

        for (index, keyword) in keywords.iter().enumerate() {
            if control.is_cancelled() {
                tracing::info!("Cancelled, not starting \"{}\"", keyword);
                break;
            }

            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };

            let coordinator = self.clone();
            let keyword = keyword.clone();
            let sink = sink.clone();
            let control = control.clone();

            runs.spawn(async move {
                let report = coordinator.run_keyword(&keyword, &sink, &control).await;
                drop(permit);
                (index, report)
            });
        }

        let mut reports = Vec::with_capacity(keywords.len());
        while let Some(joined) = runs.join_next().await {
            match joined {
                Ok(entry) => reports.push(entry),
                Err(e) => tracing::error!("Keyword run failed: {}", e),
            }
        }

        reports.sort_by_key(|(index, _)| *index);
        reports.into_iter().map(|(_, report)| report).collect()
    }

    fn record_result(&self, report: &mut CrawlReport, joined: Result<DetailResult, JoinError>) {
        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("[{}] Detail task failed: {}", report.keyword, e);
                report.task_failures += 1;
                return;
            }
        };

        *report.outcomes.entry(result.outcome).or_insert(0) += 1;
        report.records_emitted += result.records;

        if result.outcome.is_success() {
            tracing::info!(
                "[{}] {} -> {} records",
                report.keyword,
                result.url,
                result.records
            );
        }

        let done = report.products_dispatched();
        if done % PROGRESS_EVERY == 0 {
            tracing::info!(
                "[{}] Progress: {} products done, {} extracted, {} records",
                report.keyword,
                done,
                report.count(ProductOutcome::Extracted),
                report.records_emitted
            );
        }
    }
}

/// Fetches and extracts one product, sending its records
async fn process_product<F: Fetcher>(
    fetcher: &F,
    rules: &CompiledRules,
    robots: Option<&RobotsGate>,
    product: ProductReference,
    keyword: &str,
    sink: &mpsc::Sender<ProductVariantRecord>,
    control: &RunControl,
) -> DetailResult {
    let finish = |outcome, records| DetailResult {
        url: product.url.clone(),
        outcome,
        records,
    };

    if control.is_stopped() {
        return finish(ProductOutcome::Cancelled, 0);
    }

    if let Some(gate) = robots {
        if !gate.is_allowed(fetcher, &product.url).await {
            tracing::debug!("[{}] {} disallowed by robots.txt", keyword, product.url);
            return finish(ProductOutcome::RobotsDenied, 0);
        }
    }

    let page = match fetcher.fetch(&product.url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("[{}] Detail page failed: {}", keyword, e);
            return finish(ProductOutcome::FetchFailed, 0);
        }
    };

    let records = match extract(&page.body, &page.url, keyword, rules) {
        Ok(records) => records,
        Err(failure) => {
            log_failure(keyword, &page.url, &failure);
            return finish(ProductOutcome::from(&failure), 0);
        }
    };

    let mut sent = 0;
    for record in records {
        if sink.send(record).await.is_err() {
            tracing::warn!("[{}] Record channel closed, dropping remaining rows", keyword);
            break;
        }
        sent += 1;
    }

    finish(ProductOutcome::Extracted, sent)
}

fn log_failure(keyword: &str, url: &Url, failure: &ExtractionFailure) {
    match failure {
        ExtractionFailure::OutOfScopeProduct { .. } => {
            tracing::trace!("[{}] Skipping {}: {}", keyword, url, failure)
        }
        ExtractionFailure::NoVariantsFound {
            source: Some(parse_failure),
        } => tracing::debug!(
            "[{}] Skipping {}: {} ({}; payload starts {:?})",
            keyword,
            url,
            failure,
            parse_failure,
            parse_failure.raw.chars().take(80).collect::<String>()
        ),
        _ => tracing::debug!("[{}] Skipping {}: {}", keyword, url, failure),
    }
}

/// Records of one keyword run, produced lazily by a background task
pub struct RecordStream {
    rx: mpsc::Receiver<ProductVariantRecord>,
    handle: JoinHandle<CrawlReport>,
}

impl RecordStream {
    /// Next record, or None once the run has finished
    pub async fn next(&mut self) -> Option<ProductVariantRecord> {
        self.rx.recv().await
    }

    /// Waits for the run to finish and returns its report
    ///
    /// Records not yet taken with [`RecordStream::next`] are discarded.
    pub async fn finish(self) -> Result<CrawlReport, JoinError> {
        drop(self.rx);
        self.handle.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{FetchError, FetchedPage};
    use crate::rules::builtin_rule_set;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned pages; unknown URLs are 404s
    #[derive(Default)]
    struct MemoryFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl MemoryFetcher {
        fn with(mut self, url: &str, body: impl Into<String>) -> Self {
            self.pages.insert(url.to_string(), body.into());
            self
        }

        fn count(&self, url: &str) -> usize {
            self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
        }
    }

    impl Fetcher for MemoryFetcher {
        async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.pages.get(url.as_str()) {
                Some(body) => Ok(FetchedPage {
                    url: url.clone(),
                    status: 200,
                    body: body.clone(),
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    const SHOP: &str = "https://shop.test";

    fn rules() -> Arc<CompiledRules> {
        let mut rules = builtin_rule_set("eastbay").unwrap().unwrap();
        rules.search_url = format!("{}/search?q={{keyword}}", SHOP);
        Arc::new(CompiledRules::compile(rules).unwrap())
    }

    fn listing(items: &[(&str, &str)], next: Option<&str>) -> String {
        let items: String = items
            .iter()
            .map(|(id, href)| format!(r#"<li data-model="{}"><a href="{}">p</a></li>"#, id, href))
            .collect();
        let next = next
            .map(|n| format!(r#"<div class="endeca_pagination"><a class="next" href="{}">next</a></div>"#, n))
            .unwrap_or_default();
        format!(
            r#"<html><body><div id="endeca_search_results"><ul>{}</ul></div>{}</body></html>"#,
            items, next
        )
    }

    fn detail(title: &str, styles: &str) -> String {
        format!(
            r#"<html><head><meta name="title" content="{}"><script>tagMgt.brand = "Nike";</script></head>
<body><div class="content_container"><script>var styles = {};</script></div></body></html>"#,
            title, styles
        )
    }

    fn two_by_two() -> String {
        let style = |color: &str| {
            format!(
                r#"["", "", "", "", "", "", "$120.00", [["8.0"], ["9.0"]], "", "", "", "", "", "", "", "{}", "D"]"#,
                color
            )
        };
        format!(r#"{{"A": {}, "B": {}}}"#, style("Black"), style("White"))
    }

    async fn run(fetcher: MemoryFetcher, settings: CrawlSettings) -> (CrawlReport, Vec<ProductVariantRecord>, Arc<MemoryFetcher>) {
        let fetcher = Arc::new(fetcher);
        let coordinator = Coordinator::new(Arc::clone(&fetcher), rules(), settings);
        let (tx, mut rx) = mpsc::channel(64);

        let report = coordinator.run_keyword("air max", &tx, &RunControl::new()).await;
        drop(tx);

        let mut records = Vec::new();
        while let Some(r) = rx.recv().await {
            records.push(r);
        }
        (report, records, fetcher)
    }

    #[tokio::test]
    async fn test_duplicates_across_pages_dispatched_once() {
        let fetcher = MemoryFetcher::default()
            .with(
                &format!("{}/search?q=air+max", SHOP),
                listing(&[("1", "/p/1"), ("2", "/p/2")], Some("/search?q=air+max&page=2")),
            )
            .with(
                &format!("{}/search?q=air+max&page=2", SHOP),
                listing(&[("1", "/p/1?from=page2")], None),
            )
            .with(&format!("{}/p/1", SHOP), detail("Nike Air Max 90 Men's", &two_by_two()))
            .with(&format!("{}/p/2", SHOP), detail("Nike Air Max Kids' Preschool", "{}"));

        let (report, records, fetcher) = run(fetcher, CrawlSettings::default()).await;

        assert_eq!(report.listing_pages, 2);
        assert_eq!(report.references_seen, 3);
        assert_eq!(report.duplicates_skipped, 1);
        assert_eq!(report.count(ProductOutcome::Extracted), 1);
        assert_eq!(report.count(ProductOutcome::OutOfScope), 1);
        assert_eq!(report.records_emitted, 4);
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.keyword == "air max"));
        assert_eq!(fetcher.count(&format!("{}/p/1", SHOP)), 1);
        assert_eq!(fetcher.count(&format!("{}/p/1?from=page2", SHOP)), 0);
    }

    #[tokio::test]
    async fn test_detail_failures_do_not_stop_the_run() {
        let fetcher = MemoryFetcher::default()
            .with(
                &format!("{}/search?q=air+max", SHOP),
                listing(&[("1", "/p/missing"), ("2", "/p/broken"), ("3", "/p/good")], None),
            )
            .with(&format!("{}/p/broken", SHOP), detail("Nike Air Men's", r#"{"A": ["#))
            .with(&format!("{}/p/good", SHOP), detail("Nike Air Men's", &two_by_two()));

        let (report, records, _) = run(fetcher, CrawlSettings::default()).await;

        assert_eq!(report.count(ProductOutcome::FetchFailed), 1);
        assert_eq!(report.count(ProductOutcome::NoVariants), 1);
        assert_eq!(report.count(ProductOutcome::Extracted), 1);
        assert_eq!(records.len(), 4);
    }

    #[tokio::test]
    async fn test_pagination_loop_is_cut() {
        let fetcher = MemoryFetcher::default()
            .with(
                &format!("{}/search?q=air+max", SHOP),
                listing(&[], Some("/search?q=air+max&page=2")),
            )
            .with(
                &format!("{}/search?q=air+max&page=2", SHOP),
                listing(&[], Some("/search?q=air+max")),
            );

        let (report, _, fetcher) = run(fetcher, CrawlSettings::default()).await;
        assert_eq!(report.listing_pages, 2);
        assert_eq!(fetcher.count(&format!("{}/search?q=air+max", SHOP)), 1);
    }

    #[tokio::test]
    async fn test_listing_page_limit() {
        let fetcher = MemoryFetcher::default()
            .with(
                &format!("{}/search?q=air+max", SHOP),
                listing(&[], Some("/search?q=air+max&page=2")),
            )
            .with(
                &format!("{}/search?q=air+max&page=2", SHOP),
                listing(&[], None),
            );
        let settings = CrawlSettings {
            max_listing_pages: Some(1),
            ..CrawlSettings::default()
        };

        let (report, _, _) = run(fetcher, settings).await;
        assert_eq!(report.listing_pages, 1);
    }

    #[tokio::test]
    async fn test_failed_listing_ends_keyword() {
        let (report, records, _) = run(MemoryFetcher::default(), CrawlSettings::default()).await;
        assert_eq!(report.listing_pages, 0);
        assert_eq!(report.listing_failures, 1);
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_run_fetches_nothing() {
        let fetcher = Arc::new(MemoryFetcher::default().with(
            &format!("{}/search?q=air+max", SHOP),
            listing(&[("1", "/p/1")], None),
        ));
        let coordinator = Coordinator::new(Arc::clone(&fetcher), rules(), CrawlSettings::default());
        let (tx, _rx) = mpsc::channel(8);
        let control = RunControl::new();
        control.cancel();

        let report = coordinator.run_keyword("air max", &tx, &control).await;
        assert!(report.stopped_early);
        assert_eq!(report.listing_pages, 0);
        assert!(fetcher.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_caller_deadline_fetches_nothing() {
        let fetcher = Arc::new(MemoryFetcher::default().with(
            &format!("{}/search?q=air+max", SHOP),
            listing(&[("1", "/p/1")], None),
        ));
        let coordinator = Coordinator::new(Arc::clone(&fetcher), rules(), CrawlSettings::default());
        let (tx, _rx) = mpsc::channel(8);
        let control = RunControl::with_timeout(Duration::ZERO);

        let report = coordinator.run_keyword("air max", &tx, &control).await;
        assert!(report.stopped_early);
        assert_eq!(report.listing_pages, 0);
        assert!(fetcher.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_timeout_stops_keyword() {
        let fetcher = Arc::new(MemoryFetcher::default().with(
            &format!("{}/search?q=air+max", SHOP),
            listing(&[("1", "/p/1")], None),
        ));
        let settings = CrawlSettings {
            run_timeout: Some(Duration::ZERO),
            ..CrawlSettings::default()
        };
        let coordinator = Coordinator::new(Arc::clone(&fetcher), rules(), settings);
        let (tx, _rx) = mpsc::channel(8);

        let report = coordinator.run_keyword("air max", &tx, &RunControl::new()).await;
        assert!(report.stopped_early);
        assert_eq!(report.listing_pages, 0);
        assert_eq!(report.records_emitted, 0);
        assert!(fetcher.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_stream() {
        let fetcher = Arc::new(
            MemoryFetcher::default()
                .with(&format!("{}/search?q=air+max", SHOP), listing(&[("1", "/p/1")], None))
                .with(&format!("{}/p/1", SHOP), detail("Nike Air Men's", &two_by_two())),
        );
        let coordinator = Coordinator::new(fetcher, rules(), CrawlSettings::default());

        let mut stream = coordinator.records("air max", RunControl::new());
        let mut count = 0;
        while let Some(record) = stream.next().await {
            assert_eq!(record.brand, "Nike");
            count += 1;
        }
        let report = stream.finish().await.unwrap();

        assert_eq!(count, 4);
        assert_eq!(report.records_emitted, 4);
    }

    #[tokio::test]
    async fn test_run_keywords_keeps_input_order() {
        let fetcher = Arc::new(
            MemoryFetcher::default()
                .with(&format!("{}/search?q=air+max", SHOP), listing(&[("1", "/p/1")], None))
                .with(&format!("{}/search?q=pegasus", SHOP), listing(&[("2", "/p/2")], None))
                .with(&format!("{}/p/1", SHOP), detail("Nike Air Men's", &two_by_two()))
                .with(&format!("{}/p/2", SHOP), detail("Nike Pegasus Men's", &two_by_two())),
        );
        let coordinator = Coordinator::new(fetcher, rules(), CrawlSettings::default());
        let (tx, mut rx) = mpsc::channel(64);
        let keywords = vec!["air max".to_string(), " pegasus ".to_string()];

        let reports = coordinator
            .run_keywords(&keywords, 2, &tx, &RunControl::new())
            .await;
        drop(tx);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].keyword, "air max");
        assert_eq!(reports[1].keyword, "pegasus");

        let mut pegasus = 0;
        while let Some(record) = rx.recv().await {
            if record.keyword == "pegasus" {
                pegasus += 1;
            }
        }
        assert_eq!(pegasus, 4);
    }
}
