// Narrative generation — turn a digest prompt into a few lines of insight.
//
// The default backend is a local Ollama server. The trait keeps
// `digest --smart` independent of which model server answers.

pub mod ollama;

use anyhow::Result;
use async_trait::async_trait;

pub use ollama::OllamaClient;

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Generate free-form text for a prompt. An empty reply is an error.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
