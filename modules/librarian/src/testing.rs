// Test mocks for the ingestion pipeline and query tool.
//
// One mock per trait boundary:
// - MockFetcher (PageFetcher): HashMap-based URL→HTML
// - ScriptedModel (LanguageModel): canned answers keyed by task
// - FixedEmbedder (TextEmbedder): deterministic hash-based vectors
// - MockGraphStore (KnowledgeStore): in-memory graph with rollback
// - MockSearch (KnowledgeSearch): canned hits per leg
//
// Plus `page_hit` for building search results.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use librarian_common::{
    normalize_key, CategoryNode, KeywordNode, PageNode, SearchHit, SearchLeg,
};

use crate::embedder::TextEmbedder;
use crate::traits::{CompletionRequest, KnowledgeSearch, KnowledgeStore, LanguageModel, PageFetcher};

/// Standard embedding dimension for test vectors.
pub const TEST_EMBEDDING_DIM: usize = 16;

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// HashMap-based page fetcher. Returns `Err` for unregistered URLs.
pub struct MockFetcher {
    pages: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Register a page whose body is a single paragraph.
    pub fn on_text(self, url: &str, paragraph: &str) -> Self {
        let html = format!("<html><body><p>{paragraph}</p></body></html>");
        self.on_page(url, &html)
    }

    /// Every URL requested, in order, including unregistered ones.
    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(html.clone()),
            None => bail!("MockFetcher: no page registered for {url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedModel
// ---------------------------------------------------------------------------

/// Language model with one canned answer (or error) per task name.
/// Unscripted tasks fail. Every request is recorded.
pub struct ScriptedModel {
    responses: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, task: &str, response: &str) -> Self {
        self.responses.insert(task.to_string(), Ok(response.to_string()));
        self
    }

    pub fn fail(mut self, task: &str, message: &str) -> Self {
        self.responses.insert(task.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, task: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.task == task).count()
    }

    pub fn last_call(&self, task: &str) -> Option<CompletionRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.task == task)
            .cloned()
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.lock().unwrap().push(request.clone());
        match self.responses.get(request.task) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(anyhow!("{message}")),
            None => bail!("ScriptedModel: no response scripted for task {}", request.task),
        }
    }
}

// ---------------------------------------------------------------------------
// FixedEmbedder
// ---------------------------------------------------------------------------

/// Deterministic embedder for testing. Registered texts get exact vectors;
/// unmatched texts get a unique hash-based vector (low similarity to everything).
pub struct FixedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
    fail: bool,
}

impl FixedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            dimension,
            fail: false,
        }
    }

    /// Every call returns an error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(TEST_EMBEDDING_DIM)
        }
    }

    /// Register a text→vector mapping for controlled similarity.
    pub fn on_text(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Generate a deterministic hash-based vector for unmatched text.
    fn hash_vector(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut vec = vec![0.0f32; self.dimension];
        let mut state = seed;
        for v in vec.iter_mut() {
            // Simple LCG PRNG
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            *v = ((state >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0;
        }
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vec.iter_mut() {
                *v /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl TextEmbedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail {
            bail!("FixedEmbedder: embedding unavailable");
        }
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.hash_vector(text)))
    }
}

// ---------------------------------------------------------------------------
// MockGraphStore
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct GraphState {
    pages: HashMap<String, PageNode>,
    embeddings: HashMap<String, Vec<f32>>,
    categories: HashMap<String, CategoryNode>,
    keywords: HashMap<String, KeywordNode>,
    /// (page url, category key)
    page_categories: BTreeSet<(String, String)>,
    /// (category key, keyword key)
    category_keywords: BTreeSet<(String, String)>,
}

/// In-memory graph with the same upsert rules as the Neo4j writer.
///
/// `save_category` stages its writes on a copy and swaps it in only when
/// every step succeeds, so an injected failure leaves nothing behind.
pub struct MockGraphStore {
    state: Mutex<GraphState>,
    fail_pages: bool,
    /// Category keys whose unit fails right after the Category upsert.
    fail_categories: HashSet<String>,
}

impl MockGraphStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GraphState::default()),
            fail_pages: false,
            fail_categories: HashSet::new(),
        }
    }

    /// Make every `save_page` return an error.
    pub fn failing_pages(mut self) -> Self {
        self.fail_pages = true;
        self
    }

    /// Make `save_category` fail for this category name (any casing).
    pub fn failing_category(mut self, name: &str) -> Self {
        self.fail_categories.insert(normalize_key(name));
        self
    }

    pub fn page(&self, url: &str) -> Option<PageNode> {
        self.state.lock().unwrap().pages.get(url).cloned()
    }

    pub fn page_embedding(&self, url: &str) -> Option<Vec<f32>> {
        self.state.lock().unwrap().embeddings.get(url).cloned()
    }

    pub fn page_count(&self) -> usize {
        self.state.lock().unwrap().pages.len()
    }

    pub fn category(&self, name: &str) -> Option<CategoryNode> {
        self.state
            .lock()
            .unwrap()
            .categories
            .get(&normalize_key(name))
            .cloned()
    }

    pub fn category_count(&self) -> usize {
        self.state.lock().unwrap().categories.len()
    }

    pub fn keyword_count(&self) -> usize {
        self.state.lock().unwrap().keywords.len()
    }

    /// Display names of the categories linked from `url`, sorted by key.
    pub fn categories_of(&self, url: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .page_categories
            .iter()
            .filter(|(u, _)| u == url)
            .filter_map(|(_, key)| state.categories.get(key).map(|c| c.name.clone()))
            .collect()
    }

    /// Display names of the keywords linked from a category, sorted by key.
    pub fn keywords_of(&self, category: &str) -> Vec<String> {
        let key = normalize_key(category);
        let state = self.state.lock().unwrap();
        state
            .category_keywords
            .iter()
            .filter(|(c, _)| *c == key)
            .filter_map(|(_, k)| state.keywords.get(k).map(|kw| kw.name.clone()))
            .collect()
    }

    pub fn keyword_edge_count(&self) -> usize {
        self.state.lock().unwrap().category_keywords.len()
    }
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for MockGraphStore {
    async fn save_page(&self, page: &PageNode, embedding: Option<&[f32]>) -> Result<()> {
        if self.fail_pages {
            bail!("MockGraphStore: page writes disabled");
        }
        let mut state = self.state.lock().unwrap();
        match state.pages.get_mut(&page.url) {
            Some(existing) => {
                if !page.title.is_empty() {
                    existing.title = page.title.clone();
                }
                existing.summary = page.summary.clone();
                existing.last_updated = page.last_updated;
            }
            None => {
                state.pages.insert(page.url.clone(), page.clone());
            }
        }
        if let Some(embedding) = embedding {
            state.embeddings.insert(page.url.clone(), embedding.to_vec());
        }
        Ok(())
    }

    async fn save_category(
        &self,
        page_url: &str,
        category: &CategoryNode,
        keywords: &[KeywordNode],
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let mut staged = state.clone();

        match staged.categories.get_mut(&category.key) {
            Some(existing) => {
                existing.description = category.description.clone();
                existing.last_updated = category.last_updated;
            }
            None => {
                staged.categories.insert(category.key.clone(), category.clone());
            }
        }

        if self.fail_categories.contains(&category.key) {
            bail!("MockGraphStore: injected failure for category {}", category.name);
        }

        if staged.pages.contains_key(page_url) {
            staged
                .page_categories
                .insert((page_url.to_string(), category.key.clone()));
        }

        for keyword in keywords {
            match staged.keywords.get_mut(&keyword.key) {
                Some(existing) => existing.last_updated = keyword.last_updated,
                None => {
                    staged.keywords.insert(keyword.key.clone(), keyword.clone());
                }
            }
            staged
                .category_keywords
                .insert((category.key.clone(), keyword.key.clone()));
        }

        *state = staged;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockSearch
// ---------------------------------------------------------------------------

/// Canned hits for each search leg, with per-leg failure switches.
pub struct MockSearch {
    text_hits: Vec<SearchHit>,
    vector_hits: Vec<SearchHit>,
    fail_text: bool,
    fail_vector: bool,
    text_queries: Mutex<Vec<String>>,
    limits: Mutex<(Option<usize>, Option<usize>)>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self {
            text_hits: Vec::new(),
            vector_hits: Vec::new(),
            fail_text: false,
            fail_vector: false,
            text_queries: Mutex::new(Vec::new()),
            limits: Mutex::new((None, None)),
        }
    }

    pub fn with_text_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.text_hits = hits;
        self
    }

    pub fn with_vector_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.vector_hits = hits;
        self
    }

    pub fn failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }

    pub fn failing_vector(mut self) -> Self {
        self.fail_vector = true;
        self
    }

    pub fn text_queries(&self) -> Vec<String> {
        self.text_queries.lock().unwrap().clone()
    }

    /// (text limit, vector k) from the most recent calls.
    pub fn last_limits(&self) -> Option<(usize, usize)> {
        match *self.limits.lock().unwrap() {
            (Some(text), Some(k)) => Some((text, k)),
            _ => None,
        }
    }
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeSearch for MockSearch {
    async fn text_matches(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>> {
        self.text_queries.lock().unwrap().push(text.to_string());
        self.limits.lock().unwrap().0 = Some(limit);
        if self.fail_text {
            bail!("MockSearch: text match unavailable");
        }
        Ok(self.text_hits.iter().take(limit).cloned().collect())
    }

    async fn similar_pages(&self, _embedding: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.limits.lock().unwrap().1 = Some(k);
        if self.fail_vector {
            bail!("MockSearch: vector index unavailable");
        }
        Ok(self.vector_hits.iter().take(k).cloned().collect())
    }
}

/// A Page hit with a url and title, scored when it comes from the vector leg.
pub fn page_hit(leg: SearchLeg, url: &str) -> SearchHit {
    SearchHit {
        leg,
        labels: vec!["Page".to_string()],
        properties: vec![
            ("url".to_string(), url.to_string()),
            ("title".to_string(), "Test page".to_string()),
        ],
        score: match leg {
            SearchLeg::Vector => Some(0.9),
            SearchLeg::TextMatch => None,
        },
    }
}
