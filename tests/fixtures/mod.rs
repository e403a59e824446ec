//! Test fixtures for corpus-driven assertions
//!
//! Provides the environment classification corpus shared by integration tests.

use std::path::{Path, PathBuf};

/// Path to the environment corpus fixture
pub fn environment_corpus_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/environment_corpus.json")
}

/// Environment test case from environment_corpus.json
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EnvironmentTestCase {
    pub id: String,
    pub description: String,
    pub platform: String,
    pub user_agent: String,
    pub expected: EnvironmentExpectation,
}

/// Expected classification
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EnvironmentExpectation {
    pub family: clientkit::PlatformFamily,
    pub wechat: bool,
}

/// Full environment corpus
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EnvironmentCorpus {
    pub schema_version: u32,
    pub description: String,
    pub test_cases: Vec<EnvironmentTestCase>,
}

impl EnvironmentCorpus {
    /// Load corpus from the fixture file
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = environment_corpus_path();
        let content = std::fs::read_to_string(&path)?;
        let corpus: EnvironmentCorpus = serde_json::from_str(&content)?;
        Ok(corpus)
    }
}
