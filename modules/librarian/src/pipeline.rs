use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, warn};

use librarian_common::{Bookmark, CategoryNode, KeywordNode, Outcome, PageNode};

use crate::classifier::CategoryClassifier;
use crate::embedder::TextEmbedder;
use crate::keywords::KeywordExtractor;
use crate::source::read_url;
use crate::stats::{RunStats, Stage};
use crate::summarizer::Summarizer;
use crate::traits::{KnowledgeStore, LanguageModel, PageFetcher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestStatus {
    Stored,
    Skipped { stage: Stage, reason: String },
}

/// What happened to one URL.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub url: String,
    pub status: IngestStatus,
    pub categories_written: usize,
    pub category_failures: usize,
    /// Keywords linked to every written category.
    pub keywords: Vec<String>,
    /// One entry per failed step, including non-fatal ones.
    pub failed_stages: Vec<Stage>,
    pub timings: Vec<(Stage, Duration)>,
}

impl IngestReport {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            status: IngestStatus::Stored,
            categories_written: 0,
            category_failures: 0,
            keywords: Vec::new(),
            failed_stages: Vec::new(),
            timings: Vec::new(),
        }
    }

    fn skip(mut self, stage: Stage, reason: String) -> Self {
        info!(url = self.url.as_str(), %stage, reason = reason.as_str(), "Skipping page");
        self.status = IngestStatus::Skipped { stage, reason };
        self
    }

    pub fn is_stored(&self) -> bool {
        self.status == IngestStatus::Stored
    }
}

/// Fetch → summarize → classify + keywords → embed → store, one URL at a time.
pub struct Ingestor {
    fetcher: Arc<dyn PageFetcher>,
    summarizer: Summarizer,
    classifier: CategoryClassifier,
    keywords: KeywordExtractor,
    embedder: Arc<dyn TextEmbedder>,
    store: Arc<dyn KnowledgeStore>,
}

impl Ingestor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn TextEmbedder>,
        store: Arc<dyn KnowledgeStore>,
    ) -> Self {
        Self {
            fetcher,
            summarizer: Summarizer::new(model.clone()),
            classifier: CategoryClassifier::new(model.clone()),
            keywords: KeywordExtractor::new(model),
            embedder,
            store,
        }
    }

    /// Swap the default keyword extractor (e.g. for a different tagger).
    pub fn with_keyword_extractor(mut self, keywords: KeywordExtractor) -> Self {
        self.keywords = keywords;
        self
    }

    /// Ingest a single page. `title_hint` (usually the bookmark title) wins
    /// over the page's own `<title>` unless it is blank or just the URL.
    pub async fn ingest_url(&self, url: &str, title_hint: Option<&str>) -> IngestReport {
        let mut report = IngestReport::new(url);
        info!(url, "Ingesting page");

        // Fetch
        let started = Instant::now();
        let fetched = read_url(self.fetcher.as_ref(), url).await;
        report.timings.push((Stage::Fetch, started.elapsed()));
        let page = match fetched {
            Outcome::Success(page) => page,
            Outcome::Empty(reason) => return report.skip(Stage::Fetch, reason),
            Outcome::Failed(reason) => {
                report.failed_stages.push(Stage::Fetch);
                return report.skip(Stage::Fetch, reason);
            }
        };

        // Summarize
        let started = Instant::now();
        let summarized = self.summarizer.summarize(&page.text).await;
        report.timings.push((Stage::Summarize, started.elapsed()));
        let summary = match summarized {
            Outcome::Success(summary) => summary,
            Outcome::Empty(reason) => return report.skip(Stage::Summarize, reason),
            Outcome::Failed(reason) => {
                report.failed_stages.push(Stage::Summarize);
                return report.skip(Stage::Summarize, reason);
            }
        };

        // Classify
        let started = Instant::now();
        let labels = self.classifier.classify(&summary).await;
        report.timings.push((Stage::Classify, started.elapsed()));
        let labels = non_fatal(&mut report, Stage::Classify, labels);

        // Keywords
        let started = Instant::now();
        let keywords = self.keywords.extract(&summary).await;
        report.timings.push((Stage::Keywords, started.elapsed()));
        let keywords = non_fatal(&mut report, Stage::Keywords, keywords);

        // Embed
        let started = Instant::now();
        let embedding = match self.embedder.embed(&summary).await {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                warn!(url, error = %e, "Embedding failed, storing page without it");
                report.failed_stages.push(Stage::Embed);
                None
            }
        };
        report.timings.push((Stage::Embed, started.elapsed()));

        // Store page
        let now = Utc::now();
        let title = title_hint
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != url)
            .map(String::from)
            .or(page.title)
            .unwrap_or_default();
        let page_node = PageNode::new(url, title, summary.as_str(), now);

        let started = Instant::now();
        let saved = self.store.save_page(&page_node, embedding.as_deref()).await;
        report.timings.push((Stage::StorePage, started.elapsed()));
        if let Err(e) = saved {
            error!(url, error = %e, "Failed to store page");
            report.failed_stages.push(Stage::StorePage);
            return report.skip(Stage::StorePage, format!("store failed: {e:#}"));
        }

        // Store categories
        let keyword_nodes: Vec<KeywordNode> =
            keywords.iter().map(|k| KeywordNode::new(k, now)).collect();
        let mut seen = HashSet::new();
        let started = Instant::now();
        for label in &labels {
            let category = CategoryNode::new(label, summary.as_str(), now);
            if category.key.is_empty() || !seen.insert(category.key.clone()) {
                continue;
            }
            match self.store.save_category(url, &category, &keyword_nodes).await {
                Ok(()) => report.categories_written += 1,
                Err(e) => {
                    warn!(url, category = category.name.as_str(), error = %e, "Failed to store category");
                    report.category_failures += 1;
                    report.failed_stages.push(Stage::StoreCategory);
                }
            }
        }
        report.timings.push((Stage::StoreCategory, started.elapsed()));

        info!(
            url,
            categories = report.categories_written,
            keywords = keywords.len(),
            "Page stored"
        );
        report.keywords = keywords;
        report
    }

    /// Ingest every bookmark in order. A failing bookmark is logged and
    /// counted; the batch always runs to the end.
    pub async fn ingest_bookmarks(&self, bookmarks: &[Bookmark]) -> RunStats {
        let mut stats = RunStats::new();
        info!(count = bookmarks.len(), "Starting ingestion run");

        for (i, bookmark) in bookmarks.iter().enumerate() {
            let report = self.ingest_url(&bookmark.url, Some(&bookmark.title)).await;
            if let IngestStatus::Skipped { stage, reason } = &report.status {
                warn!(
                    n = i + 1,
                    url = bookmark.url.as_str(),
                    %stage,
                    reason = reason.as_str(),
                    "Bookmark not stored"
                );
            }
            stats.record(&report);
        }

        info!("{stats}");
        stats
    }
}

/// Steps after the summary never stop the page from being stored.
fn non_fatal(report: &mut IngestReport, stage: Stage, outcome: Outcome<Vec<String>>) -> Vec<String> {
    match outcome {
        Outcome::Success(items) => items,
        Outcome::Empty(reason) => {
            info!(url = report.url.as_str(), %stage, reason = reason.as_str(), "Nothing produced");
            Vec::new()
        }
        Outcome::Failed(reason) => {
            warn!(url = report.url.as_str(), %stage, reason = reason.as_str(), "Step failed");
            report.failed_stages.push(stage);
            Vec::new()
        }
    }
}
