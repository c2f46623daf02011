// ABOUTME: Composition-database seam: search candidates and detailed nutrient payloads
// ABOUTME: Defines the FoodDataSource trait and the filtered FoodDetails shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # Composition-Database Client Interface
//!
//! The pipeline consumes reference nutrient data through [`FoodDataSource`].
//! Both operations fail soft: transport failures, non-2xx responses, and
//! timeouts yield an empty result with a logged diagnostic, never an error.
//! The pipeline's fallback handles every flavor of absence uniformly.

mod usda;

pub use usda::UsdaClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::SearchCandidate;

/// Nutrient names kept when filtering a detailed payload for the model.
///
/// The raw payload is large; trimming to the essentials keeps extraction
/// context windows small.
pub const ESSENTIAL_NUTRIENTS: &[&str] = &[
    "Energy",
    "Protein",
    "Carbohydrate",
    "Total lipid (fat)",
    "Fiber",
    "Sugars",
    "Sodium",
    "Calcium",
    "Iron",
];

/// One nutrient row in a detailed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientAmount {
    /// Nutrient name as reported by the database
    pub name: String,
    /// Amount per 100 g of the reference food
    pub amount: f64,
    /// Reporting unit (kcal, g, mg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A household portion with its gram weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPortion {
    /// Portion description (e.g. "1 cup")
    pub label: String,
    /// Weight of the portion in grams
    pub gram_weight: f64,
}

/// Detailed nutrient payload for one reference food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodDetails {
    /// Reference food description
    pub description: String,
    /// Serving size reported by the database, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<f64>,
    /// Unit of the reported serving size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size_unit: Option<String>,
    /// Nutrient amounts per 100 g
    pub nutrients: Vec<NutrientAmount>,
    /// Household portions
    #[serde(default)]
    pub portions: Vec<FoodPortion>,
}

impl FoodDetails {
    /// Drop every nutrient that is not on the essential list
    #[must_use]
    pub fn essential_only(mut self) -> Self {
        self.nutrients.retain(|nutrient| {
            ESSENTIAL_NUTRIENTS
                .iter()
                .any(|essential| nutrient.name.contains(essential))
        });
        self
    }
}

/// Composition-database access as the pipeline needs it.
///
/// Implementations must bound each call with a timeout so a slow upstream
/// cannot stall a run; the timeout path is indistinguishable from "nothing
/// found" by design.
#[async_trait]
pub trait FoodDataSource: Send + Sync {
    /// Search for reference foods matching a query.
    ///
    /// Fails soft: any upstream problem yields an empty list.
    async fn search(&self, query: &str, page_size: u32) -> Vec<SearchCandidate>;

    /// Fetch the detailed nutrient payload for one reference food.
    ///
    /// Fails soft: any upstream problem yields `None`, which the caller must
    /// treat identically to an empty search.
    async fn fetch_details(&self, external_id: &str) -> Option<FoodDetails>;
}

#[async_trait]
impl<T: FoodDataSource + ?Sized> FoodDataSource for std::sync::Arc<T> {
    async fn search(&self, query: &str, page_size: u32) -> Vec<SearchCandidate> {
        (**self).search(query, page_size).await
    }

    async fn fetch_details(&self, external_id: &str) -> Option<FoodDetails> {
        (**self).fetch_details(external_id).await
    }
}
