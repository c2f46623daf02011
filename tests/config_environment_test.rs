// ABOUTME: Unit tests for environment-based configuration
// ABOUTME: Validates credential requirements, defaults, and override behavior
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use serial_test::serial;

use macrolog::config::{FoodDataConfig, LlmConfig, PipelineConfig, ServerConfig};
use macrolog::constants::{defaults, env_vars};

fn clear_all() {
    for var in [
        env_vars::OPENAI_API_KEY,
        env_vars::LLM_BASE_URL,
        env_vars::LLM_MODEL,
        env_vars::LLM_FAST_MODEL,
        env_vars::LLM_TIMEOUT_SECS,
        env_vars::USDA_API_KEY,
        env_vars::USDA_BASE_URL,
        env_vars::USDA_TIMEOUT_SECS,
        env_vars::SEARCH_PAGE_SIZE,
        env_vars::MAX_TOOL_ROUNDS,
    ] {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_llm_config_requires_api_key() {
    clear_all();
    assert!(LlmConfig::from_env().is_err());
}

#[test]
#[serial]
fn test_llm_config_applies_defaults() {
    clear_all();
    env::set_var(env_vars::OPENAI_API_KEY, "sk-test");

    let config = LlmConfig::from_env().unwrap();
    assert_eq!(config.api_key, "sk-test");
    assert_eq!(config.base_url, defaults::LLM_BASE_URL);
    assert_eq!(config.model, defaults::LLM_MODEL);
    assert_eq!(config.fast_model, defaults::LLM_FAST_MODEL);
    assert_eq!(config.timeout_secs, defaults::LLM_TIMEOUT_SECS);

    clear_all();
}

#[test]
#[serial]
fn test_food_data_config_requires_api_key() {
    clear_all();
    assert!(FoodDataConfig::from_env().is_err());
}

#[test]
#[serial]
fn test_overrides_take_effect() {
    clear_all();
    env::set_var(env_vars::OPENAI_API_KEY, "sk-test");
    env::set_var(env_vars::USDA_API_KEY, "usda-test");
    env::set_var(env_vars::LLM_BASE_URL, "http://localhost:8080/v1");
    env::set_var(env_vars::LLM_FAST_MODEL, "gpt-4o-mini-2024");
    env::set_var(env_vars::SEARCH_PAGE_SIZE, "10");
    env::set_var(env_vars::MAX_TOOL_ROUNDS, "3");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.llm.base_url, "http://localhost:8080/v1");
    assert_eq!(config.llm.fast_model, "gpt-4o-mini-2024");
    assert_eq!(config.food_data.api_key, "usda-test");
    assert_eq!(config.pipeline.search_page_size, 10);
    assert_eq!(config.pipeline.max_tool_rounds, 3);

    clear_all();
}

#[test]
#[serial]
fn test_unparseable_numeric_overrides_fall_back_to_defaults() {
    clear_all();
    env::set_var(env_vars::OPENAI_API_KEY, "sk-test");
    env::set_var(env_vars::SEARCH_PAGE_SIZE, "lots");

    let llm = LlmConfig::from_env().unwrap();
    let pipeline = PipelineConfig::from_env(&llm);
    assert_eq!(pipeline.search_page_size, defaults::SEARCH_PAGE_SIZE);
    assert_eq!(pipeline.max_tool_rounds, defaults::MAX_TOOL_ROUNDS);

    clear_all();
}

#[test]
fn test_pipeline_defaults_bound_the_tool_loop() {
    let config = PipelineConfig::default();
    assert!(config.max_tool_rounds >= 1);
    assert_eq!(config.max_tool_rounds, defaults::MAX_TOOL_ROUNDS);
    assert_eq!(config.search_page_size, defaults::SEARCH_PAGE_SIZE);
}
