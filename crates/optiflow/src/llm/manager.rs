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

use crate::llm::{HttpLlmAdapter, LlmAdapter};
use llm_contracts::{LlmError, LlmResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmManagerConfig {
    pub primary_provider: String,
    pub primary_model: String,
    pub fallback_providers: Vec<(String, String)>,
    pub retry_attempts: usize,
    pub enable_fallback: bool,
}

impl Default for LlmManagerConfig {
    fn default() -> Self {
        Self {
            primary_provider: "ollama".to_string(),
            primary_model: "llama3.1".to_string(),
            fallback_providers: vec![(
                "anthropic".to_string(),
                "claude-3-5-haiku-latest".to_string(),
            )],
            retry_attempts: 3,
            enable_fallback: true,
        }
    }
}

pub struct LlmManager {
    primary_adapter: Box<dyn LlmAdapter + Send + Sync>,
    fallback_adapters: Vec<Box<dyn LlmAdapter + Send + Sync>>,
    config: LlmManagerConfig,
}

impl LlmManager {
    pub fn new(config: LlmManagerConfig) -> LlmResult<Self> {
        let primary_adapter: Box<dyn LlmAdapter + Send + Sync> = Box::new(
            HttpLlmAdapter::for_provider(&config.primary_provider, &config.primary_model)?,
        );
        info!(
            "Primary adapter initialised: {} ({})",
            config.primary_provider, config.primary_model
        );

        let mut fallback_adapters: Vec<Box<dyn LlmAdapter + Send + Sync>> = Vec::new();
        if config.enable_fallback {
            for (provider, model) in &config.fallback_providers {
                match HttpLlmAdapter::for_provider(provider, model) {
                    Ok(adapter) => {
                        debug!("Fallback adapter initialised: {} ({})", provider, model);
                        fallback_adapters.push(Box::new(adapter));
                    }
                    Err(e) => {
                        warn!("Failed to initialise fallback adapter {}: {}", provider, e);
                    }
                }
            }
        }

        Ok(Self {
            primary_adapter,
            fallback_adapters,
            config,
        })
    }

    pub fn with_defaults() -> LlmResult<Self> {
        Self::new(LlmManagerConfig::default())
    }

    pub fn simple(provider: &str, model: &str) -> LlmResult<Self> {
        Self::new(LlmManagerConfig {
            primary_provider: provider.to_string(),
            primary_model: model.to_string(),
            fallback_providers: vec![],
            retry_attempts: 3,
            enable_fallback: false,
        })
    }

    pub fn from_adapter(adapter: Box<dyn LlmAdapter + Send + Sync>) -> Self {
        Self {
            primary_adapter: adapter,
            fallback_adapters: Vec::new(),
            config: LlmManagerConfig {
                primary_provider: "custom".to_string(),
                primary_model: "custom".to_string(),
                fallback_providers: vec![],
                retry_attempts: 1,
                enable_fallback: false,
            },
        }
    }

    pub fn get_config(&self) -> &LlmManagerConfig {
        &self.config
    }

    pub fn get_status(&self) -> LlmManagerStatus {
        LlmManagerStatus {
            primary_available: true,
            fallback_count: self.fallback_adapters.len(),
            total_adapters: 1 + self.fallback_adapters.len(),
        }
    }

    pub async fn try_with_fallback<F, T>(&self, operation: F) -> LlmResult<T>
    where
        F: Fn(
            &dyn LlmAdapter,
        )
            -> std::pin::Pin<Box<dyn std::future::Future<Output = LlmResult<T>> + Send + '_>>,
    {
        let mut last_error: Option<LlmError> = None;

        for (index, adapter) in std::iter::once(&self.primary_adapter)
            .chain(self.fallback_adapters.iter())
            .enumerate()
        {
            for attempt in 1..=self.config.retry_attempts.max(1) {
                match operation(&**adapter).await {
                    Ok(result) => {
                        debug!(
                            "Operation succeeded with adapter {} on attempt {}",
                            index, attempt
                        );
                        return Ok(result);
                    }
                    Err(e) => {
                        warn!("Adapter {} failed on attempt {}: {}", index, attempt, e);
                        last_error = Some(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LlmError::Api("All adapters exhausted. Operation failed across all available LLM providers.".to_string())
        }))
    }

    pub async fn generate_response_with_fallback(&self, prompt: &str) -> LlmResult<String> {
        let prompt = prompt.to_string();
        self.try_with_fallback(move |adapter| {
            let prompt = prompt.clone();
            Box::pin(async move { adapter.generate_response(&prompt).await })
        })
        .await
    }

    pub async fn generate_structured_response_with_fallback(
        &self,
        system_prompt: &str,
        user_input: &str,
    ) -> LlmResult<Value> {
        let system_prompt = system_prompt.to_string();
        let user_input = user_input.to_string();
        self.try_with_fallback(move |adapter| {
            let system_prompt = system_prompt.clone();
            let user_input = user_input.clone();
            Box::pin(async move {
                adapter
                    .generate_structured_response(&system_prompt, &user_input)
                    .await
            })
        })
        .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmManagerStatus {
    pub primary_available: bool,
    pub fallback_count: usize,
    pub total_adapters: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FlakyAdapter {
        calls: Arc<AtomicUsize>,
        succeed_on: usize,
    }

    #[async_trait]
    impl LlmAdapter for FlakyAdapter {
        async fn generate_response(&self, _prompt: &str) -> LlmResult<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.succeed_on {
                Ok("recovered".to_string())
            } else {
                Err(LlmError::Api("transient".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = LlmManager::from_adapter(Box::new(FlakyAdapter {
            calls: calls.clone(),
            succeed_on: 3,
        }));
        manager.config.retry_attempts = 3;

        let response = manager
            .generate_response_with_fallback("optimise this")
            .await
            .unwrap();
        assert_eq!(response, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_adapters_surface_last_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = LlmManager::from_adapter(Box::new(FlakyAdapter {
            calls,
            succeed_on: usize::MAX,
        }));
        manager.config.retry_attempts = 2;

        let err = manager
            .generate_response_with_fallback("optimise this")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("transient"));
    }

    #[test]
    fn test_default_config_has_a_fallback() {
        let config = LlmManagerConfig::default();
        assert_eq!(config.primary_provider, "ollama");
        assert!(config.enable_fallback);
        assert_eq!(config.fallback_providers.len(), 1);
    }
}
