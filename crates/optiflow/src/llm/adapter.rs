// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::llm::utils::extract_json_from_text;
use async_trait::async_trait;
use dotenvy::dotenv;
use llm_contracts::{
    CompletionRequest, CompletionResponse, LlmError, LlmResult, Message, Provider, Usage,
};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| Client::builder().build().expect("HTTP client"));

#[async_trait]
pub trait LlmAdapter: Send + Sync {
    async fn generate_response(&self, prompt: &str) -> LlmResult<String>;

    async fn generate_structured_response(
        &self,
        system_prompt: &str,
        user_input: &str,
    ) -> LlmResult<Value> {
        let response = self
            .generate_response(&format!("System: {system_prompt}\n\nUser: {user_input}"))
            .await?;
        Ok(extract_json_from_text(&response))
    }
}

#[derive(Clone, Debug)]
pub struct HttpLlmAdapter {
    pub provider: Provider,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub api_version: String,
}

impl HttpLlmAdapter {
    pub fn for_provider(provider: &str, model: &str) -> LlmResult<Self> {
        match Provider::from(provider) {
            Provider::Anthropic => Self::anthropic(model),
            Provider::OpenAI => Self::openai(model),
            Provider::Ollama => Self::ollama(model),
            Provider::Custom(name) => Err(LlmError::Configuration(format!(
                "unsupported provider: {name}"
            ))),
        }
    }

    pub fn anthropic(model: &str) -> LlmResult<Self> {
        dotenv().ok();
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            LlmError::Authentication("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self {
            provider: Provider::Anthropic,
            endpoint: std::env::var("ANTHROPIC_ENDPOINT")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".to_string()),
            api_key,
            model: model.to_string(),
            max_tokens: env_u32("ANTHROPIC_MAX_TOKENS", 8192),
            temperature: env_f32("ANTHROPIC_TEMPERATURE", 0.7),
            api_version: std::env::var("ANTHROPIC_API_VERSION")
                .unwrap_or_else(|_| "2023-06-01".to_string()),
        })
    }

    pub fn openai(model: &str) -> LlmResult<Self> {
        dotenv().ok();
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            LlmError::Authentication("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self {
            provider: Provider::OpenAI,
            endpoint: std::env::var("OPENAI_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            api_key,
            model: model.to_string(),
            max_tokens: env_u32("OPENAI_MAX_TOKENS", 8192),
            temperature: env_f32("OPENAI_TEMPERATURE", 0.7),
            api_version: String::new(),
        })
    }

    pub fn ollama(model: &str) -> LlmResult<Self> {
        dotenv().ok();

        Ok(Self {
            provider: Provider::Ollama,
            endpoint: std::env::var("OLLAMA_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:11434/api/generate".to_string()),
            api_key: String::new(),
            model: model.to_string(),
            max_tokens: env_u32("OLLAMA_MAX_TOKENS", 32768),
            temperature: env_f32("OLLAMA_TEMPERATURE", 0.7),
            api_version: String::new(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
        let client = &*HTTP_CLIENT;
        let max_tokens = request
            .generation_config
            .max_tokens
            .unwrap_or(self.max_tokens);
        let temperature = request
            .generation_config
            .temperature
            .unwrap_or(self.temperature);

        let http_request = match self.provider {
            Provider::Anthropic | Provider::Custom(_) => {
                let messages = vec![Message::user(&request.prompt)];
                let mut payload = json!({
                    "model": self.model,
                    "max_tokens": max_tokens,
                    "messages": messages,
                    "temperature": temperature
                });
                if let Some(system_prompt) = &request.system_prompt {
                    payload["system"] = json!(system_prompt);
                }
                debug!(payload = ?payload, "Sending request to Anthropic API");
                client
                    .post(&self.endpoint)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", &self.api_version)
                    .header("content-type", "application/json")
                    .json(&payload)
            }
            Provider::OpenAI => {
                let mut messages = Vec::new();
                if let Some(system_prompt) = &request.system_prompt {
                    messages.push(Message::system(system_prompt));
                }
                messages.push(Message::user(&request.prompt));
                let payload = json!({
                    "model": self.model,
                    "max_tokens": max_tokens,
                    "messages": messages,
                    "temperature": temperature
                });
                debug!(payload = ?payload, "Sending request to OpenAI API");
                client
                    .post(&self.endpoint)
                    .bearer_auth(&self.api_key)
                    .header("content-type", "application/json")
                    .json(&payload)
            }
            Provider::Ollama => {
                let prompt = match &request.system_prompt {
                    Some(system_prompt) => format!("{system_prompt}\n\n{}", request.prompt),
                    None => request.prompt.clone(),
                };
                let payload = json!({
                    "model": self.model,
                    "prompt": prompt,
                    "stream": false,
                    "options": {
                        "temperature": temperature,
                        "num_predict": max_tokens
                    }
                });
                debug!(payload = ?payload, "Sending request to Ollama API");
                client
                    .post(&self.endpoint)
                    .header("content-type", "application/json")
                    .json(&payload)
            }
        };

        let response = http_request
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        info!(%status, provider = %self.provider, "Received response from LLM API");

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Authentication(format!(
                    "{} API rejected credentials: {error_body}",
                    self.provider
                )),
                429 => LlmError::RateLimit(format!("{} API: {error_body}", self.provider)),
                _ => LlmError::Api(format!(
                    "{} API error {status}: {error_body}",
                    self.provider
                )),
            });
        }

        let response_data: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Json(e.to_string()))?;
        debug!(response_data = ?response_data, "Raw API Response");

        let content = match self.provider {
            Provider::Anthropic | Provider::Custom(_) => response_data["content"][0]["text"]
                .as_str()
                .ok_or_else(|| {
                    LlmError::Api("Failed to extract content from Anthropic response".to_string())
                })?,
            Provider::OpenAI => response_data["choices"][0]["message"]["content"]
                .as_str()
                .ok_or_else(|| {
                    LlmError::Api("Failed to extract content from OpenAI response".to_string())
                })?,
            Provider::Ollama => response_data["response"].as_str().ok_or_else(|| {
                LlmError::Api("Failed to extract content from Ollama response".to_string())
            })?,
        };

        let mut completion = CompletionResponse::new(
            request.id,
            content,
            &self.model,
            self.provider.as_str(),
        );
        completion.usage = extract_usage(&self.provider, &response_data);
        Ok(completion)
    }
}

#[async_trait]
impl LlmAdapter for HttpLlmAdapter {
    async fn generate_response(&self, prompt: &str) -> LlmResult<String> {
        let request = CompletionRequest::new(prompt);
        let response = self.complete(&request).await?;
        Ok(response.content)
    }
}

fn extract_usage(provider: &Provider, response_data: &Value) -> Usage {
    let (prompt_key, completion_key) = match provider {
        Provider::Anthropic | Provider::Custom(_) => ("input_tokens", "output_tokens"),
        Provider::OpenAI => ("prompt_tokens", "completion_tokens"),
        Provider::Ollama => ("prompt_eval_count", "eval_count"),
    };
    let usage_source = match provider {
        Provider::Ollama => response_data,
        _ => &response_data["usage"],
    };

    let prompt_tokens = usage_source[prompt_key].as_u64().unwrap_or(0) as u32;
    let completion_tokens = usage_source[completion_key].as_u64().unwrap_or(0) as u32;
    Usage {
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens + completion_tokens,
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
