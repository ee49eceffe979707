//! Run statistics
//!
//! Folds the per-keyword crawl reports into one summary and prints it.

use crate::crawler::CrawlReport;
use crate::state::ProductOutcome;
use std::collections::BTreeMap;
use std::time::Duration;

/// Statistics for a whole run
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// One report per keyword, in completion order
    pub keywords: Vec<CrawlReport>,

    /// Rows the writer persisted
    pub rows_written: u64,
}

impl CrawlStatistics {
    pub fn new(keywords: Vec<CrawlReport>, rows_written: u64) -> Self {
        Self {
            keywords,
            rows_written,
        }
    }

    pub fn listing_pages(&self) -> usize {
        self.keywords.iter().map(|r| r.listing_pages).sum()
    }

    pub fn products_dispatched(&self) -> usize {
        self.keywords.iter().map(|r| r.products_dispatched()).sum()
    }

    pub fn duplicates_skipped(&self) -> usize {
        self.keywords.iter().map(|r| r.duplicates_skipped).sum()
    }

    pub fn records_emitted(&self) -> usize {
        self.keywords.iter().map(|r| r.records_emitted).sum()
    }

    /// Product counts per outcome, summed over keywords
    pub fn outcome_totals(&self) -> BTreeMap<ProductOutcome, usize> {
        let mut totals = BTreeMap::new();
        for report in &self.keywords {
            for (outcome, count) in &report.outcomes {
                *totals.entry(*outcome).or_insert(0) += count;
            }
        }
        totals
    }

    /// Share of dispatched products that yielded records, in percent
    pub fn success_rate(&self) -> f64 {
        let dispatched = self.products_dispatched();
        if dispatched == 0 {
            return 0.0;
        }
        let extracted: usize = self
            .keywords
            .iter()
            .map(|r| r.count(ProductOutcome::Extracted))
            .sum();
        (extracted as f64 / dispatched as f64) * 100.0
    }

    /// True if any keyword run was cut short by cancellation or timeout
    pub fn stopped_early(&self) -> bool {
        self.keywords.iter().any(|r| r.stopped_early)
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    for report in &stats.keywords {
        println!("Keyword \"{}\" ({}):", report.keyword, report.retailer);
        println!("  Listing pages: {}", report.listing_pages);
        if report.listing_failures > 0 {
            println!("  Listing failures: {}", report.listing_failures);
        }
        println!(
            "  Products: {} ({} duplicates skipped)",
            report.products_dispatched(),
            report.duplicates_skipped
        );
        println!("  Records: {}", report.records_emitted);
        print_outcomes(&report.outcomes);
        if report.task_failures > 0 {
            println!("  Crashed tasks: {}", report.task_failures);
        }
        println!(
            "  Duration: {}{}",
            format_duration(report.duration),
            if report.stopped_early { " (stopped early)" } else { "" }
        );
        println!();
    }

    if stats.keywords.len() > 1 {
        println!("Totals:");
        println!("  Listing pages: {}", stats.listing_pages());
        println!(
            "  Products: {} ({} duplicates skipped)",
            stats.products_dispatched(),
            stats.duplicates_skipped()
        );
        println!("  Records: {}", stats.records_emitted());
        print_outcomes(&stats.outcome_totals());
        println!();
    }

    println!("Rows written: {}", stats.rows_written);
    println!("Success rate: {:.1}%", stats.success_rate());
}

fn print_outcomes(outcomes: &BTreeMap<ProductOutcome, usize>) {
    let mut counts: Vec<_> = outcomes.iter().filter(|(_, count)| **count > 0).collect();
    counts.sort_by(|a, b| b.1.cmp(a.1));

    for (outcome, count) in counts {
        println!("    {}: {}", outcome, count);
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
