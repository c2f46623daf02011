// ABOUTME: Strict JSON-contract parsing for LLM step replies
// ABOUTME: Tagged unions for log_food/chat intents, failing closed on any schema mismatch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # Step-Reply Contracts
//!
//! Every pipeline step demands an exact JSON shape from the model. Parsing
//! here fails closed: a reply that is not valid JSON, is missing a required
//! key, or carries an unrecognized intent is a [`ContractViolation`] routed
//! to the fallback path, never a silently zero-defaulted record.
//!
//! [`ContractViolation`]: crate::errors::ErrorCode::ContractViolation

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::{DecomposedItem, NutrientRecord};

/// A fully specified `log_food` reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogFoodReply {
    /// Food description as the model understood it
    pub description: String,
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    pub protein: f64,
    /// Dietary fiber in grams
    pub fiber: f64,
    /// Carbohydrates in grams
    pub carbs: f64,
    /// Total fat in grams
    pub fat: f64,
    /// Sugars in grams
    pub sugar: f64,
    /// Provenance and assumptions
    pub assumptions: String,
}

impl From<LogFoodReply> for NutrientRecord {
    fn from(reply: LogFoodReply) -> Self {
        Self {
            description: reply.description,
            calories: reply.calories,
            protein: reply.protein,
            fiber: reply.fiber,
            carbs: reply.carbs,
            fat: reply.fat,
            sugar: reply.sugar,
            assumptions: reply.assumptions,
        }
    }
}

/// A clarification request from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The clarifying question to relay to the user
    #[serde(alias = "message")]
    pub response: String,
}

/// Reply contract shared by the EXTRACT and ESTIMATE steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum StepReply {
    /// Structured nutrition values
    LogFood(LogFoodReply),
    /// Clarification request
    Chat(ChatReply),
}

/// Reply contract for the DECOMPOSE step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum DecomposeReply {
    /// Description split into resolvable items
    LogFood {
        /// The decomposed food items
        items: Vec<DecomposedItem>,
    },
    /// Clarification request
    Chat(ChatReply),
}

/// One row of the SELECT step's reply: the model's verdict on which candidate
/// (if any) matches a decomposed item. `"none"` is a valid terminal value
/// meaning "fall back to estimation", not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSelection {
    /// Which item this verdict is for
    pub food_item: String,
    /// Selected candidate id, or the literal `"none"`
    pub id: String,
}

impl ItemSelection {
    /// Whether the model declined every candidate
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.id.eq_ignore_ascii_case("none")
    }
}

/// Strip surrounding markdown code fences from a model reply.
///
/// Models wrap JSON in ```` ```json ```` blocks often enough that stripping
/// before parsing is part of the contract.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let without_close = without_open.strip_suffix("```").unwrap_or(without_open);
    without_close.trim()
}

/// Parse an EXTRACT/ESTIMATE step reply
///
/// # Errors
///
/// Returns a contract violation if the text is not valid JSON for either
/// canonical shape.
pub fn parse_step_reply(text: &str) -> AppResult<StepReply> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned)
        .map_err(|e| AppError::contract(format!("step reply did not match contract: {e}")))
}

/// Parse a DECOMPOSE step reply
///
/// # Errors
///
/// Returns a contract violation if the text is not valid JSON for either
/// canonical shape.
pub fn parse_decompose_reply(text: &str) -> AppResult<DecomposeReply> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned)
        .map_err(|e| AppError::contract(format!("decompose reply did not match contract: {e}")))
}

/// Parse a SELECT step reply (JSON array of selections)
///
/// # Errors
///
/// Returns a contract violation if the text is not a valid selection array.
pub fn parse_selections(text: &str) -> AppResult<Vec<ItemSelection>> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned)
        .map_err(|e| AppError::contract(format!("selection reply did not match contract: {e}")))
}
