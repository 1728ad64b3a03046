pub mod client;
pub mod migrate;
pub mod reader;
pub mod records;
pub mod writer;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use client::GraphClient;
pub use neo4rs::{query, Query};
pub use reader::GraphReader;
pub use writer::GraphWriter;
