pub mod error;
pub mod json;
pub mod ollama;
pub mod prompts;
pub mod synth;

#[derive(Debug, Clone)]
pub struct GenerateInput {
    pub system: Option<String>,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Returns the raw completion text for one prompt.
    async fn generate(&self, input: GenerateInput) -> anyhow::Result<String>;
}
