use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibrarianError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
