use crate::config::Settings;
use crate::domain::request::LlmOptions;
use crate::error::ExternalModelTimeoutError;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{GenerateInput, LlmClient, Provider};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_HOST: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "gemma3:4b";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_TOKENS: u32 = 2000;
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Generation settings sent with every `/api/generate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaOptions {
    pub host: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repeat_penalty: f32,
    pub num_ctx: u32,
    pub max_tokens: Option<u32>,
    pub seed: Option<u64>,
    pub timeout: Duration,
}

impl Default for OllamaOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            repeat_penalty: 1.1,
            num_ctx: 4096,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            seed: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OllamaOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        let mut options = Self::default();
        if let Some(host) = settings.ollama_host.as_deref().filter(|s| !s.trim().is_empty()) {
            options.host = host.trim().to_string();
        }
        if let Some(model) = settings.ollama_model.as_deref().filter(|s| !s.trim().is_empty()) {
            options.model = model.trim().to_string();
        }
        if let Some(secs) = settings.ollama_timeout_secs.filter(|s| *s > 0) {
            options.timeout = Duration::from_secs(secs);
        }
        if let Some(t) = settings.ollama_temperature {
            options.temperature = t;
        }
        if let Some(p) = settings.ollama_top_p {
            options.top_p = p;
        }
        if let Some(n) = settings.ollama_max_tokens {
            options.max_tokens = Some(n);
        }
        options
    }

    /// Applies per-request overrides; unset fields keep the current values.
    pub fn with_overrides(mut self, overrides: &LlmOptions) -> Self {
        if let Some(model) = overrides.model.as_deref() {
            self.model = model.trim().to_string();
        }
        if let Some(t) = overrides.temperature {
            self.temperature = t;
        }
        if let Some(p) = overrides.top_p {
            self.top_p = p;
        }
        if let Some(n) = overrides.max_tokens {
            self.max_tokens = Some(n);
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            repeat_penalty: self.repeat_penalty,
            num_ctx: self.num_ctx,
            num_predict: self.max_tokens,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    options: OllamaOptions,
}

impl OllamaClient {
    pub fn new(options: OllamaOptions) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { http, options })
    }

    pub fn options(&self) -> &OllamaOptions {
        &self.options
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.options.host.trim_end_matches('/'))
    }

    /// True when the server answers `/api/tags` with a success status.
    pub async fn check_connection(&self) -> bool {
        match self
            .http
            .get(self.url("/api/tags"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => true,
            Ok(res) => {
                tracing::warn!(status = %res.status(), host = %self.options.host, "Ollama answered with an error status");
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, host = %self.options.host, "Ollama is not reachable");
                false
            }
        }
    }

    pub async fn list_models(&self) -> anyhow::Result<Vec<String>> {
        let res = self
            .http
            .get(self.url("/api/tags"))
            .timeout(LIST_TIMEOUT)
            .send()
            .await
            .context("Ollama model listing failed")?;
        let status = res.status();
        if !status.is_success() {
            return Err(LlmDiagnosticsError::new(Provider::Ollama, "tags", format!("status={status}")).into());
        }
        let tags = res
            .json::<TagsResponse>()
            .await
            .context("failed to decode Ollama /api/tags response")?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Checks the configured model against the installed ones. An untagged name
    /// also matches its `:latest` tag.
    pub async fn check_model_exists(&self) -> bool {
        let wanted = self.options.model.as_str();
        match self.list_models().await {
            Ok(models) => {
                let found = models
                    .iter()
                    .any(|m| m == wanted || (!wanted.contains(':') && *m == format!("{wanted}:latest")));
                if !found {
                    tracing::warn!(model = %wanted, available = ?models, "Ollama model not installed");
                }
                found
            }
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "could not list Ollama models");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider(&self) -> Provider {
        Provider::Ollama
    }

    async fn generate(&self, input: GenerateInput) -> anyhow::Result<String> {
        let req = GenerateRequest {
            model: &self.options.model,
            prompt: &input.prompt,
            system: input.system.as_deref(),
            stream: false,
            options: self.options.generation_options(),
        };

        tracing::debug!(model = %self.options.model, prompt_len = input.prompt.len(), "Ollama generate");
        let res = match self.http.post(self.url("/api/generate")).json(&req).send().await {
            Ok(res) => res,
            Err(err) if err.is_timeout() => {
                return Err(anyhow::Error::new(ExternalModelTimeoutError {
                    timeout: self.options.timeout,
                }))
            }
            Err(err) => return Err(anyhow::Error::new(err).context("Ollama request failed")),
        };

        let status = res.status();
        let text = match res.text().await {
            Ok(text) => text,
            Err(err) if err.is_timeout() => {
                return Err(anyhow::Error::new(ExternalModelTimeoutError {
                    timeout: self.options.timeout,
                }))
            }
            Err(err) => {
                return Err(anyhow::Error::new(err).context("failed to read Ollama response body"))
            }
        };
        if !status.is_success() {
            return Err(LlmDiagnosticsError::new(Provider::Ollama, "http", format!("status={status}"))
                .with_raw_output(text)
                .into());
        }

        let parsed = serde_json::from_str::<GenerateResponse>(&text)
            .with_context(|| format!("failed to decode Ollama generate response: {text}"))?;
        if parsed.response.trim().is_empty() {
            return Err(LlmDiagnosticsError::new(Provider::Ollama, "empty", "model returned no text")
                .with_raw_output(text)
                .into());
        }
        Ok(parsed.response)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerationOptions,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    repeat_penalty: f32,
    num_ctx: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}
