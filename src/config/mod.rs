// ABOUTME: Environment-based configuration for the macrolog backend core
// ABOUTME: Typed sub-configs for the LLM gateway, food-data client, and pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # Configuration Management
//!
//! Environment-only configuration. Missing provider credentials are
//! configuration errors surfaced at startup/first-use, never per-request.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;

use crate::constants::{defaults, env_vars};
use crate::errors::{AppError, AppResult};

/// LLM gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Primary model (candidate selection)
    pub model: String,
    /// Cheaper model for lookup/extraction/estimation steps
    pub fast_model: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Load from environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the provider API key is not set.
    pub fn from_env() -> AppResult<Self> {
        let api_key = env::var(env_vars::OPENAI_API_KEY).map_err(|_| {
            AppError::config(format!(
                "Missing {} environment variable",
                env_vars::OPENAI_API_KEY
            ))
        })?;

        Ok(Self {
            api_key,
            base_url: env::var(env_vars::LLM_BASE_URL)
                .unwrap_or_else(|_| defaults::LLM_BASE_URL.into()),
            model: env::var(env_vars::LLM_MODEL).unwrap_or_else(|_| defaults::LLM_MODEL.into()),
            fast_model: env::var(env_vars::LLM_FAST_MODEL)
                .unwrap_or_else(|_| defaults::LLM_FAST_MODEL.into()),
            timeout_secs: parse_env_u64(env_vars::LLM_TIMEOUT_SECS, defaults::LLM_TIMEOUT_SECS),
        })
    }
}

/// Composition-database (USDA FoodData Central) client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodDataConfig {
    /// FoodData Central API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl FoodDataConfig {
    /// Load from environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key is not set.
    pub fn from_env() -> AppResult<Self> {
        let api_key = env::var(env_vars::USDA_API_KEY).map_err(|_| {
            AppError::config(format!(
                "Missing {} environment variable",
                env_vars::USDA_API_KEY
            ))
        })?;

        Ok(Self {
            api_key,
            base_url: env::var(env_vars::USDA_BASE_URL)
                .unwrap_or_else(|_| defaults::USDA_BASE_URL.into()),
            timeout_secs: parse_env_u64(env_vars::USDA_TIMEOUT_SECS, defaults::USDA_TIMEOUT_SECS),
        })
    }
}

/// Resolution-pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Primary model for the selection step
    pub model: String,
    /// Fast model for lookup/extraction/estimation steps
    pub fast_model: String,
    /// Candidates requested per composition-database search
    pub search_page_size: u32,
    /// Upper bound on tool-call round-trips within one item's search step
    pub max_tool_rounds: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: defaults::LLM_MODEL.into(),
            fast_model: defaults::LLM_FAST_MODEL.into(),
            search_page_size: defaults::SEARCH_PAGE_SIZE,
            max_tool_rounds: defaults::MAX_TOOL_ROUNDS,
        }
    }
}

impl PipelineConfig {
    /// Load from environment variables, taking models from the LLM config
    #[must_use]
    pub fn from_env(llm: &LlmConfig) -> Self {
        Self {
            model: llm.model.clone(),
            fast_model: llm.fast_model.clone(),
            search_page_size: parse_env_u32(
                env_vars::SEARCH_PAGE_SIZE,
                defaults::SEARCH_PAGE_SIZE,
            ),
            max_tool_rounds: parse_env_u32(env_vars::MAX_TOOL_ROUNDS, defaults::MAX_TOOL_ROUNDS),
        }
    }
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// LLM gateway configuration
    pub llm: LlmConfig,
    /// Composition-database client configuration
    pub food_data: FoodDataConfig,
    /// Pipeline tuning
    pub pipeline: PipelineConfig,
}

impl ServerConfig {
    /// Load the full configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any required credential is missing.
    pub fn from_env() -> AppResult<Self> {
        let llm = LlmConfig::from_env()?;
        let food_data = FoodDataConfig::from_env()?;
        let pipeline = PipelineConfig::from_env(&llm);

        info!(
            llm.model = %llm.model,
            llm.fast_model = %llm.fast_model,
            pipeline.search_page_size = pipeline.search_page_size,
            pipeline.max_tool_rounds = pipeline.max_tool_rounds,
            "Configuration loaded"
        );

        Ok(Self {
            llm,
            food_data,
            pipeline,
        })
    }
}

fn parse_env_u64(var: &str, default: u64) -> u64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_u32(var: &str, default: u32) -> u32 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
