pub mod bookmarks;
pub mod chat;
pub mod classifier;
pub mod embedder;
pub mod fetcher;
pub mod keywords;
pub mod pipeline;
pub mod prompts;
pub mod search_tool;
pub mod source;
pub mod stats;
pub mod summarizer;
pub mod tagger;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
