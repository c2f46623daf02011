// ABOUTME: Main library entry point for the macrolog nutrition backend
// ABOUTME: Exposes the LLM resolution pipeline, food-data client, and meal persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

#![deny(unsafe_code)]

//! # Macrolog
//!
//! A nutrition-tracking backend core: free-text meal descriptions go in,
//! macro-nutrient records come out. The heart of the crate is a multi-step
//! LLM resolution pipeline that decomposes a description into food items,
//! grounds each item against USDA FoodData Central, and falls back to model
//! estimation whenever the structured path cannot produce a match.
//!
//! ## Architecture
//!
//! - **llm**: gateway trait, OpenAI Responses provider, prompt library, and
//!   the strict JSON contracts every step reply must satisfy
//! - **fooddata**: fail-soft composition-database client
//! - **pipeline**: the resolution state machine and response assembly
//! - **storage**: meal persistence seam with an in-memory implementation
//! - **services**: request-level glue composing pipeline and storage
//! - **profile**: user profiles and daily-energy calculations
//!
//! ## Example
//!
//! ```rust,no_run
//! use macrolog::config::ServerConfig;
//! use macrolog::errors::AppResult;
//! use macrolog::fooddata::UsdaClient;
//! use macrolog::llm::OpenAiResponsesProvider;
//! use macrolog::models::FoodQuery;
//! use macrolog::pipeline::ResolutionPipeline;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let pipeline = ResolutionPipeline::new(
//!         OpenAiResponsesProvider::new(&config.llm)?,
//!         UsdaClient::new(&config.food_data)?,
//!         config.pipeline,
//!     );
//!     let outcome = pipeline.resolve(&FoodQuery::new("an apple")).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

/// Environment-based configuration
pub mod config;

/// Service-wide constants: env var names and defaults
pub mod constants;

/// Error types and the service error code taxonomy
pub mod errors;

/// Composition-database (USDA FoodData Central) client
pub mod fooddata;

/// LLM gateway abstraction, OpenAI provider, prompts, and step contracts
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Core domain and wire types
pub mod models;

/// The food resolution pipeline and response assembly
pub mod pipeline;

/// User profiles and daily-energy calculations
pub mod profile;

/// Application services
pub mod services;

/// Meal persistence
pub mod storage;
