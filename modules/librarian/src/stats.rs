use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::pipeline::{IngestReport, IngestStatus};

/// Pipeline steps, in the order a page passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Fetch,
    Summarize,
    Classify,
    Keywords,
    Embed,
    StorePage,
    StoreCategory,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Summarize => "summarize",
            Stage::Classify => "classify",
            Stage::Keywords => "keywords",
            Stage::Embed => "embed",
            Stage::StorePage => "store_page",
            Stage::StoreCategory => "store_category",
        };
        f.pad(name)
    }
}

/// Stats from an ingestion run.
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub bookmarks_seen: u32,
    pub pages_stored: u32,
    pub pages_skipped: u32,
    pub categories_written: u32,
    /// HAS_KEYWORD edges written, one per keyword per stored category.
    pub keyword_links_written: u32,
    pub failures: BTreeMap<Stage, u32>,
    pub stage_time: BTreeMap<Stage, Duration>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &IngestReport) {
        self.bookmarks_seen += 1;
        match report.status {
            IngestStatus::Stored => self.pages_stored += 1,
            IngestStatus::Skipped { .. } => self.pages_skipped += 1,
        }
        self.categories_written += report.categories_written as u32;
        self.keyword_links_written += (report.categories_written * report.keywords.len()) as u32;

        for stage in &report.failed_stages {
            *self.failures.entry(*stage).or_default() += 1;
        }
        for (stage, elapsed) in &report.timings {
            *self.stage_time.entry(*stage).or_default() += *elapsed;
        }
    }

    pub fn failures_at(&self, stage: Stage) -> u32 {
        self.failures.get(&stage).copied().unwrap_or(0)
    }

    pub fn total_failures(&self) -> u32 {
        self.failures.values().sum()
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Ingestion Run Complete ===")?;
        writeln!(f, "Bookmarks seen:     {}", self.bookmarks_seen)?;
        writeln!(f, "Pages stored:       {}", self.pages_stored)?;
        writeln!(f, "Pages skipped:      {}", self.pages_skipped)?;
        writeln!(f, "Categories written: {}", self.categories_written)?;
        writeln!(f, "Keyword links:      {}", self.keyword_links_written)?;
        if !self.failures.is_empty() {
            writeln!(f, "\nFailures:")?;
            for (stage, count) in &self.failures {
                writeln!(f, "  {stage:<15} {count}")?;
            }
        }
        if !self.stage_time.is_empty() {
            writeln!(f, "\nTime per stage:")?;
            for (stage, elapsed) in &self.stage_time {
                writeln!(f, "  {stage:<15} {:.2}s", elapsed.as_secs_f64())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: IngestStatus, categories: usize, keywords: usize) -> IngestReport {
        IngestReport {
            url: "https://example.com/a".into(),
            status,
            categories_written: categories,
            category_failures: 0,
            keywords: (0..keywords).map(|i| format!("kw{i}")).collect(),
            failed_stages: vec![],
            timings: vec![(Stage::Fetch, Duration::from_millis(250))],
        }
    }

    #[test]
    fn record_accumulates_counts_and_time() {
        let mut stats = RunStats::new();
        stats.record(&report(IngestStatus::Stored, 2, 3));

        let mut skipped = report(
            IngestStatus::Skipped {
                stage: Stage::Fetch,
                reason: "404".into(),
            },
            0,
            0,
        );
        skipped.failed_stages.push(Stage::Fetch);
        stats.record(&skipped);

        assert_eq!(stats.bookmarks_seen, 2);
        assert_eq!(stats.pages_stored, 1);
        assert_eq!(stats.pages_skipped, 1);
        assert_eq!(stats.categories_written, 2);
        assert_eq!(stats.keyword_links_written, 6);
        assert_eq!(stats.failures_at(Stage::Fetch), 1);
        assert_eq!(stats.total_failures(), 1);
        assert_eq!(stats.stage_time[&Stage::Fetch], Duration::from_millis(500));
    }

    #[test]
    fn display_lists_failures_by_stage() {
        let mut stats = RunStats::new();
        stats.failures.insert(Stage::Embed, 2);
        let out = stats.to_string();
        assert!(out.contains("Ingestion Run Complete"));
        assert!(out.contains("embed"));
    }
}
