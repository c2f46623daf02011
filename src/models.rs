// ABOUTME: Core domain and wire types for meal logging and nutrition resolution
// ABOUTME: NutrientRecord scaling, decomposed items, persisted meals, request/response shapes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # Domain Models
//!
//! Data structures shared across the pipeline, assembler, and persistence
//! seam. Nutrient values are `f64` grams/kcal, rounded to 2 decimal places at
//! the serving-scaling boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::{ChatMessage, ConversationHandle};

/// Normalized macro-nutrient set for one resolved food item.
///
/// When sourced from the composition database the values are per 100 g of the
/// matched reference food until [`NutrientRecord::scaled_to`] is applied;
/// LLM-estimated records are already scaled to the described serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientRecord {
    /// Human-readable food description
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
    /// Provenance and assumptions ("Data from USDA FoodData Central" vs
    /// "Estimate provided by LLM", plus any serving assumptions)
    pub assumptions: String,
}

impl NutrientRecord {
    /// Scale a per-100g record to the given serving size in grams.
    ///
    /// Scaling to the 100 g reference baseline is a no-op (modulo the
    /// 2-decimal rounding applied to every result).
    #[must_use]
    pub fn scaled_to(&self, serving_grams: f64) -> Self {
        let factor = serving_grams / 100.0;
        Self {
            description: self.description.clone(),
            calories: round2(self.calories * factor),
            protein: round2(self.protein * factor),
            fiber: round2(self.fiber * factor),
            carbs: round2(self.carbs * factor),
            fat: round2(self.fat * factor),
            sugar: round2(self.sugar * factor),
            assumptions: self.assumptions.clone(),
        }
    }

    /// Round all nutrient fields to 2 decimal places without rescaling
    #[must_use]
    pub fn rounded(&self) -> Self {
        self.scaled_to(100.0)
    }
}

/// Round to 2 decimal places
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One food component extracted from a free-text description.
///
/// A description decomposes into 1..N items ("yogurt and honey" is two).
/// Created by the DECOMPOSE step, consumed by every downstream step,
/// discarded after the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecomposedItem {
    /// What the user described, normalized for lookup
    pub description: String,
    /// Reference single-serving weight in grams
    pub single_serving_grams: f64,
    /// The serving the user actually described, in grams
    pub user_serving_grams: f64,
}

/// One row returned by the composition database for a query.
///
/// Ephemeral: held only within a single pipeline run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Reference food description (e.g. "Apples, raw, with skin")
    pub description: String,
    /// Stable identifier in the composition database (FDC id)
    pub external_id: String,
    /// Data quality tag (e.g. "Foundation", "SR Legacy")
    pub data_type: String,
}

/// Durable meal record written via the persistence collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    /// Persisted identifier
    pub id: Uuid,
    /// Opaque caller identity
    pub user_id: String,
    /// When the meal was logged
    pub timestamp: DateTime<Utc>,
    /// Resolved nutrition values
    #[serde(flatten)]
    pub record: NutrientRecord,
}

impl Meal {
    /// Create a new meal for a user from a resolved record, stamped now
    #[must_use]
    pub fn new(user_id: impl Into<String>, record: NutrientRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            timestamp: Utc::now(),
            record,
        }
    }
}

/// Immutable input to a pipeline run: the raw user text plus optional prior
/// conversation context.
#[derive(Debug, Clone)]
pub struct FoodQuery {
    /// Raw free-text meal description
    pub description: String,
    /// Provider-side conversation handle from a previous turn, if any
    pub conversation: Option<ConversationHandle>,
    /// Prior role-tagged messages to replay when no handle exists
    pub history: Vec<ChatMessage>,
}

impl FoodQuery {
    /// Create a query with no prior context
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            conversation: None,
            history: Vec::new(),
        }
    }

    /// Attach a conversation handle from a previous turn
    #[must_use]
    pub fn with_conversation(mut self, handle: ConversationHandle) -> Self {
        self.conversation = Some(handle);
        self
    }

    /// Attach prior messages to replay
    #[must_use]
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }
}

/// Inbound request from the external caller (thin HTTP layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMealRequest {
    /// Opaque caller identity
    pub user_id: String,
    /// Free-text meal description
    pub description: String,
    /// Conversation handle from a previous response, for multi-turn correction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Prior messages when the caller replays history instead of a handle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ChatMessage>>,
}

/// Outbound response to the external caller.
///
/// Exactly one of `meal`/`meals` or `message` is populated, except in the
/// partial-failure case where `message` carries a summary note alongside
/// `meals`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogMealResponse {
    /// Single resolved meal (legacy flattened shape)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal: Option<NutrientRecord>,
    /// Resolved meals (modern list shape)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meals: Option<Vec<NutrientRecord>>,
    /// Clarification or partial-failure summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Per-item failure descriptions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Latest conversation handle; resubmit to continue the dialogue
    pub conversation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> NutrientRecord {
        NutrientRecord {
            description: "Apples, raw".into(),
            calories: 52.0,
            protein: 0.26,
            fiber: 2.4,
            carbs: 13.81,
            fat: 0.17,
            sugar: 10.39,
            assumptions: "Data from USDA FoodData Central".into(),
        }
    }

    #[test]
    fn scaling_to_reference_baseline_is_identity() {
        let base = record();
        assert_eq!(base.scaled_to(100.0), base);
    }

    #[test]
    fn scaling_applies_factor_and_rounds_to_two_decimals() {
        let scaled = record().scaled_to(182.0);
        assert_eq!(scaled.calories, 94.64);
        assert_eq!(scaled.carbs, 25.13);
        assert_eq!(scaled.fiber, 4.37);
        assert_eq!(scaled.description, "Apples, raw");
    }

    #[test]
    fn scaling_preserves_assumptions_text() {
        let scaled = record().scaled_to(50.0);
        assert!(scaled.assumptions.contains("USDA"));
    }
}
