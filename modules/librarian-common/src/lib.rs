pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, GraphMode, LlmProvider};
pub use error::LibrarianError;
pub use types::*;
