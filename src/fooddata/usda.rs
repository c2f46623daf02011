// ABOUTME: USDA FoodData Central client with fail-soft semantics
// ABOUTME: Search and detail fetches over HTTPS, filtered to Foundation/SR Legacy data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{FoodDataSource, FoodDetails, FoodPortion, NutrientAmount};
use crate::config::FoodDataConfig;
use crate::errors::{AppError, AppResult};
use crate::models::SearchCandidate;

/// Data types queried on search. Branded and survey foods are noisy and
/// report serving-relative values, so only the lab-analyzed sets are used.
const SEARCH_DATA_TYPES: &[&str] = &["Foundation", "SR Legacy"];

/// USDA FoodData Central API client
pub struct UsdaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl UsdaClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &FoodDataConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `USDA_API_KEY` is not set.
    pub fn from_env() -> AppResult<Self> {
        Self::new(&FoodDataConfig::from_env()?)
    }

    async fn search_request(&self, query: &str, page_size: u32) -> AppResult<SearchEnvelope> {
        let url = format!("{}/foods/search", self.base_url);
        let data_types = SEARCH_DATA_TYPES.join(",");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("pageSize", &page_size.to_string()),
                ("dataType", &data_types),
            ])
            .send()
            .await
            .map_err(|e| AppError::external_service("usda", format!("search request: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::external_service(
                "usda",
                format!("search returned HTTP {}", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::external_service("usda", format!("search body: {e}")))
    }

    async fn details_request(&self, external_id: &str) -> AppResult<FoodDetailEnvelope> {
        let url = format!("{}/food/{}", self.base_url, external_id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::external_service("usda", format!("detail request: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::external_service(
                "usda",
                format!("detail returned HTTP {}", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::external_service("usda", format!("detail body: {e}")))
    }
}

#[async_trait::async_trait]
impl FoodDataSource for UsdaClient {
    #[instrument(skip(self), fields(provider = "usda"))]
    async fn search(&self, query: &str, page_size: u32) -> Vec<SearchCandidate> {
        match self.search_request(query, page_size).await {
            Ok(envelope) => {
                let candidates: Vec<SearchCandidate> = envelope
                    .foods
                    .into_iter()
                    .map(SearchCandidate::from)
                    .collect();
                debug!(query = %query, count = candidates.len(), "food search completed");
                candidates
            }
            Err(e) => {
                warn!(query = %query, error = %e, "food search failed, continuing without candidates");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self), fields(provider = "usda"))]
    async fn fetch_details(&self, external_id: &str) -> Option<FoodDetails> {
        match self.details_request(external_id).await {
            Ok(envelope) => Some(FoodDetails::from(envelope)),
            Err(e) => {
                warn!(external_id = %external_id, error = %e, "detail fetch failed, continuing without data");
                None
            }
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    description: String,
    fdc_id: Value,
    #[serde(default)]
    data_type: Option<String>,
}

impl From<SearchFood> for SearchCandidate {
    fn from(food: SearchFood) -> Self {
        // fdcId arrives as a JSON number; selection replies carry it as a string.
        let external_id = match food.fdc_id {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Self {
            description: food.description,
            external_id,
            data_type: food.data_type.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodDetailEnvelope {
    description: String,
    #[serde(default)]
    serving_size: Option<f64>,
    #[serde(default)]
    serving_size_unit: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<WireNutrient>,
    #[serde(default)]
    food_portions: Vec<WirePortion>,
}

#[derive(Debug, Deserialize)]
struct WireNutrient {
    #[serde(default)]
    nutrient: Option<WireNutrientMeta>,
    #[serde(default)]
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNutrientMeta {
    name: String,
    #[serde(default)]
    unit_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePortion {
    #[serde(default)]
    modifier: Option<String>,
    #[serde(default)]
    portion_description: Option<String>,
    #[serde(default)]
    gram_weight: Option<f64>,
}

impl From<FoodDetailEnvelope> for FoodDetails {
    fn from(envelope: FoodDetailEnvelope) -> Self {
        let nutrients = envelope
            .food_nutrients
            .into_iter()
            .filter_map(|row| {
                let meta = row.nutrient?;
                let amount = row.amount?;
                Some(NutrientAmount {
                    name: meta.name,
                    amount,
                    unit: meta.unit_name,
                })
            })
            .collect();

        let portions = envelope
            .food_portions
            .into_iter()
            .filter_map(|portion| {
                let gram_weight = portion.gram_weight?;
                let label = portion
                    .portion_description
                    .or(portion.modifier)
                    .unwrap_or_default();
                Some(FoodPortion { label, gram_weight })
            })
            .collect();

        Self {
            description: envelope.description,
            serving_size: envelope.serving_size,
            serving_size_unit: envelope.serving_size_unit,
            nutrients,
            portions,
        }
    }
}
