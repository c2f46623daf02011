// ABOUTME: System-wide constants and environment variable names for macrolog
// ABOUTME: Contains service identity, default models, endpoints, and pipeline limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # Constants Module
//!
//! Application constants and environment variable names. Defaults live here so
//! the config layer stays declarative.

/// Service identity
pub mod service {
    /// Service name used in structured logs
    pub const NAME: &str = "macrolog";

    /// Service version from Cargo.toml
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Environment variable names
pub mod env_vars {
    /// OpenAI API key (required for the LLM gateway)
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

    /// Override the LLM API base URL (local gateways, proxies)
    pub const LLM_BASE_URL: &str = "MACROLOG_LLM_BASE_URL";

    /// Primary model for selection-grade calls
    pub const LLM_MODEL: &str = "MACROLOG_LLM_MODEL";

    /// Cheaper model for lookup/extraction/estimation calls
    pub const LLM_FAST_MODEL: &str = "MACROLOG_LLM_FAST_MODEL";

    /// Per-call LLM timeout in seconds
    pub const LLM_TIMEOUT_SECS: &str = "MACROLOG_LLM_TIMEOUT_SECS";

    /// USDA FoodData Central API key (required for the composition client)
    pub const USDA_API_KEY: &str = "USDA_API_KEY";

    /// Override the FoodData Central base URL
    pub const USDA_BASE_URL: &str = "MACROLOG_USDA_BASE_URL";

    /// Per-call food-data timeout in seconds
    pub const USDA_TIMEOUT_SECS: &str = "MACROLOG_USDA_TIMEOUT_SECS";

    /// Candidates requested per composition-database search
    pub const SEARCH_PAGE_SIZE: &str = "MACROLOG_SEARCH_PAGE_SIZE";

    /// Upper bound on tool-call round-trips within one item's search step
    pub const MAX_TOOL_ROUNDS: &str = "MACROLOG_MAX_TOOL_ROUNDS";
}

/// Default configuration values
pub mod defaults {
    /// Default primary model (candidate selection)
    pub const LLM_MODEL: &str = "gpt-4o";

    /// Default fast model (lookup, extraction, estimation)
    pub const LLM_FAST_MODEL: &str = "gpt-4o-mini";

    /// Default OpenAI API base URL
    pub const LLM_BASE_URL: &str = "https://api.openai.com/v1";

    /// Generous per-call LLM timeout; multi-step chains make several calls
    pub const LLM_TIMEOUT_SECS: u64 = 30;

    /// Default FoodData Central base URL
    pub const USDA_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

    /// Bounded food-data timeout so a slow upstream cannot stall a run
    pub const USDA_TIMEOUT_SECS: u64 = 10;

    /// Candidates per search; enough for the model to disambiguate without
    /// blowing up the selection context
    pub const SEARCH_PAGE_SIZE: u32 = 25;

    /// Tool-call loop bound per item (guarantees termination)
    pub const MAX_TOOL_ROUNDS: u32 = 5;
}
