use std::env;
use std::str::FromStr;

use tracing::info;

use crate::error::LibrarianError;

/// Where the graph database lives. Local mode has usable defaults for a
/// developer Neo4j; remote mode requires every connection variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMode {
    Local,
    Remote,
}

impl FromStr for GraphMode {
    type Err = LibrarianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(GraphMode::Local),
            "remote" => Ok(GraphMode::Remote),
            other => Err(LibrarianError::Config(format!(
                "GRAPH_MODE must be 'local' or 'remote', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
}

impl FromStr for LlmProvider {
    type Err = LibrarianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            other => Err(LibrarianError::Config(format!(
                "LLM_PROVIDER must be 'openai' or 'anthropic', got '{other}'"
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Graph
    pub graph_mode: GraphMode,
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // Language model
    pub llm_provider: LlmProvider,
    pub openai_api_key: String,
    pub anthropic_api_key: String,
    pub chat_model: String,

    // Embeddings
    pub embedding_model: String,
    pub embedding_dimensions: usize,

    // Query tool
    pub search_limit: usize,
    pub vector_top_k: usize,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, LibrarianError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LibrarianError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                LibrarianError::Config(format!("{key} environment variable is required"))
            })
        };

        let graph_mode: GraphMode = get("GRAPH_MODE")
            .map(|v| v.parse::<GraphMode>())
            .transpose()?
            .unwrap_or(GraphMode::Local);

        let (neo4j_uri, neo4j_user, neo4j_password) = match graph_mode {
            GraphMode::Local => (
                get("NEO4J_URI").unwrap_or_else(|| "bolt://localhost:7687".to_string()),
                get("NEO4J_USER").unwrap_or_else(|| "neo4j".to_string()),
                get("NEO4J_PASSWORD").unwrap_or_else(|| "password".to_string()),
            ),
            GraphMode::Remote => (
                required("NEO4J_URI")?,
                required("NEO4J_USER")?,
                required("NEO4J_PASSWORD")?,
            ),
        };

        let llm_provider: LlmProvider = get("LLM_PROVIDER")
            .map(|v| v.parse::<LlmProvider>())
            .transpose()?
            .unwrap_or(LlmProvider::OpenAi);

        // Embeddings always go through the OpenAI-compatible endpoint.
        let openai_api_key = required("OPENAI_API_KEY")?;
        let anthropic_api_key = match llm_provider {
            LlmProvider::Anthropic => required("ANTHROPIC_API_KEY")?,
            LlmProvider::OpenAi => get("ANTHROPIC_API_KEY").unwrap_or_default(),
        };

        let default_model = match llm_provider {
            LlmProvider::OpenAi => "gpt-4o-mini",
            LlmProvider::Anthropic => "claude-3-5-haiku-latest",
        };

        Ok(Self {
            graph_mode,
            neo4j_uri,
            neo4j_user,
            neo4j_password,
            llm_provider,
            openai_api_key,
            anthropic_api_key,
            chat_model: get("CHAT_MODEL").unwrap_or_else(|| default_model.to_string()),
            embedding_model: get("EMBEDDING_MODEL")
                .unwrap_or_else(|| "text-embedding-3-small".to_string()),
            embedding_dimensions: parse_or("EMBEDDING_DIMENSIONS", get("EMBEDDING_DIMENSIONS"), 1536)?,
            search_limit: parse_or("SEARCH_LIMIT", get("SEARCH_LIMIT"), 25)?,
            vector_top_k: parse_or("VECTOR_TOP_K", get("VECTOR_TOP_K"), 5)?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json: get("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }

    /// Log the effective configuration with secrets masked.
    pub fn log_redacted(&self) {
        info!(
            graph_mode = ?self.graph_mode,
            neo4j_uri = self.neo4j_uri.as_str(),
            neo4j_user = self.neo4j_user.as_str(),
            neo4j_password = redact(&self.neo4j_password),
            llm_provider = ?self.llm_provider,
            chat_model = self.chat_model.as_str(),
            openai_api_key = redact(&self.openai_api_key),
            anthropic_api_key = redact(&self.anthropic_api_key),
            embedding_model = self.embedding_model.as_str(),
            embedding_dimensions = self.embedding_dimensions,
            search_limit = self.search_limit,
            vector_top_k = self.vector_top_k,
            "Configuration loaded"
        );
    }
}

fn parse_or(key: &str, value: Option<String>, default: usize) -> Result<usize, LibrarianError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| LibrarianError::Config(format!("{key} must be a number, got '{v}'"))),
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn local_mode_has_graph_defaults() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.graph_mode, GraphMode::Local);
        assert_eq!(config.neo4j_uri, "bolt://localhost:7687");
        assert_eq!(config.llm_provider, LlmProvider::OpenAi);
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.embedding_dimensions, 1536);
        assert_eq!(config.search_limit, 25);
        assert_eq!(config.vector_top_k, 5);
        assert!(!config.log_json);
    }

    #[test]
    fn remote_mode_requires_credentials() {
        let err = Config::from_lookup(lookup(&[
            ("GRAPH_MODE", "remote"),
            ("OPENAI_API_KEY", "sk-test"),
            ("NEO4J_URI", "neo4j+s://db.example.com"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("NEO4J_USER"));
    }

    #[test]
    fn missing_openai_key_is_a_config_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, LibrarianError::Config(_)));
    }

    #[test]
    fn anthropic_provider_needs_its_key() {
        let err = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_PROVIDER", "anthropic"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_PROVIDER", "anthropic"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
        ]))
        .unwrap();
        assert_eq!(config.chat_model, "claude-3-5-haiku-latest");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("VECTOR_TOP_K", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("VECTOR_TOP_K"));
    }

    #[test]
    fn json_log_format() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert!(config.log_json);
    }
}
