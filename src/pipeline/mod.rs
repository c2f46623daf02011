// ABOUTME: Multi-step LLM resolution pipeline turning free text into nutrient records
// ABOUTME: DECOMPOSE, per-item SEARCH/SELECT/EXTRACT with ESTIMATE fallback, then AGGREGATE
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # Food Resolution Pipeline
//!
//! Orchestrates one run of the resolution state machine:
//!
//! 1. DECOMPOSE the description into food items (or ask for clarification)
//! 2. Per item, concurrently: SEARCH the composition database via a
//!    model-driven tool call, SELECT the best candidate, EXTRACT per-100g
//!    values and scale them to the described serving
//! 3. Any structured-path failure falls back to ESTIMATE; a run fails an
//!    item, never the whole request, once decomposition has succeeded
//! 4. AGGREGATE into a meals result (at least one success) or a single
//!    clarification message (none)
//!
//! Conversation continuity is provider-held: each step threads the handle
//! returned by the previous one; the per-item chains all fork from the
//! decomposition handle, which is also the handle returned to the caller.

pub mod assembler;

pub use assembler::{assemble, ResponseFormat};

use futures_util::future::join_all;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::errors::AppResult;
use crate::fooddata::FoodDataSource;
use crate::llm::contract::{
    parse_decompose_reply, parse_selections, parse_step_reply, DecomposeReply, StepReply,
};
use crate::llm::prompts::{
    lookup_tool, DECOMPOSE_INSTRUCTIONS, ESTIMATION_INSTRUCTIONS, EXTRACTION_INSTRUCTIONS,
    LOOKUP_INSTRUCTIONS, SELECTION_INSTRUCTIONS,
};
use crate::llm::{
    ChatMessage, ConversationHandle, GatewayRequest, LlmGateway, ToolOutput,
};
use crate::models::{DecomposedItem, FoodQuery, NutrientRecord, SearchCandidate};

// ============================================================================
// Outcome Types
// ============================================================================

/// Terminal result of one pipeline run
#[derive(Debug, Clone)]
pub enum ResolutionOutcome {
    /// At least one item resolved
    Meals {
        /// Resolved nutrient records, in decomposition order
        meals: Vec<NutrientRecord>,
        /// Human-readable descriptions of the items that failed
        errors: Vec<String>,
        /// Handle to continue the dialogue
        conversation: ConversationHandle,
    },
    /// Nothing resolved; relay a clarifying question instead
    Chat {
        /// Question or explanation for the user
        message: String,
        /// Handle to continue the dialogue
        conversation: ConversationHandle,
    },
}

/// Result of resolving a single decomposed item
#[derive(Debug, Clone)]
enum ItemOutcome {
    Resolved(NutrientRecord),
    Failed {
        item: String,
        reason: String,
        clarification: Option<String>,
    },
}

// ============================================================================
// Pipeline
// ============================================================================

/// The resolution pipeline, generic over its two collaborators
pub struct ResolutionPipeline<G, F> {
    gateway: G,
    food_data: F,
    config: PipelineConfig,
}

impl<G: LlmGateway, F: FoodDataSource> ResolutionPipeline<G, F> {
    /// Create a pipeline over a gateway and a composition-database client
    pub fn new(gateway: G, food_data: F, config: PipelineConfig) -> Self {
        Self {
            gateway,
            food_data,
            config,
        }
    }

    /// Run the full resolution state machine for one query.
    ///
    /// # Errors
    ///
    /// Returns an error only when the decomposition call itself cannot reach
    /// the provider. Every later failure degrades to a per-item error or a
    /// clarification message.
    #[instrument(skip(self, query), fields(description = %query.description))]
    pub async fn resolve(&self, query: &FoodQuery) -> AppResult<ResolutionOutcome> {
        let outcome = self.decompose(query).await?;
        let handle = outcome.conversation.clone();

        let items = match self.interpret_decomposition(query, &outcome) {
            Decomposition::Items(items) => items,
            Decomposition::Chat(message) => {
                return Ok(ResolutionOutcome::Chat {
                    message,
                    conversation: handle,
                });
            }
        };

        info!(items = items.len(), "description decomposed");

        // Item chains fork from the decomposition handle and never observe
        // each other, so they are safe to run concurrently.
        let resolutions = join_all(
            items
                .iter()
                .map(|item| self.resolve_item(item, handle.clone())),
        )
        .await;

        Ok(Self::aggregate(resolutions, handle))
    }

    async fn decompose(&self, query: &FoodQuery) -> AppResult<crate::llm::GatewayOutcome> {
        let mut request =
            GatewayRequest::new(&self.config.fast_model, DECOMPOSE_INSTRUCTIONS)
                .with_conversation(query.conversation.clone());

        // Replayed history only substitutes for a missing handle; sending
        // both would duplicate context the provider already holds.
        if query.conversation.is_none() {
            request = request.with_messages(query.history.iter().cloned());
        }

        let request = request.with_message(ChatMessage::user(&query.description));
        self.gateway.call(&request).await
    }

    fn interpret_decomposition(
        &self,
        query: &FoodQuery,
        outcome: &crate::llm::GatewayOutcome,
    ) -> Decomposition {
        let Some(text) = outcome.text() else {
            warn!("decomposition returned no text, treating description as a single item");
            return Decomposition::Items(vec![Self::whole_description_item(query)]);
        };

        match parse_decompose_reply(text) {
            Ok(DecomposeReply::LogFood { items }) if !items.is_empty() => {
                Decomposition::Items(items)
            }
            Ok(DecomposeReply::LogFood { .. }) => {
                warn!("decomposition produced no items, treating description as a single item");
                Decomposition::Items(vec![Self::whole_description_item(query)])
            }
            Ok(DecomposeReply::Chat(chat)) => Decomposition::Chat(chat.response),
            Err(e) => {
                warn!(error = %e, "decomposition reply violated contract, treating description as a single item");
                Decomposition::Items(vec![Self::whole_description_item(query)])
            }
        }
    }

    /// Neutral-grams fallback item: scaling by 100/100 leaves estimated
    /// values untouched.
    fn whole_description_item(query: &FoodQuery) -> DecomposedItem {
        DecomposedItem {
            description: query.description.clone(),
            single_serving_grams: 100.0,
            user_serving_grams: 100.0,
        }
    }

    /// Resolve one item through the structured path, degrading to estimation.
    ///
    /// Infallible by construction: every failure mode maps to
    /// [`ItemOutcome::Failed`] so sibling items are never disturbed.
    #[instrument(skip(self, item, handle), fields(item = %item.description))]
    async fn resolve_item(&self, item: &DecomposedItem, handle: ConversationHandle) -> ItemOutcome {
        let (candidates, call_id, handle) = match self.search(item, handle).await {
            SearchResult::Candidates {
                candidates,
                call_id,
                handle,
            } => (candidates, call_id, handle),
            SearchResult::Fallback(handle) => return self.estimate(item, handle).await,
        };

        let pre_select_handle = handle.clone();
        let (selection_id, handle) = match self.select(item, &candidates, call_id, handle).await {
            Some((id, handle)) => (id, handle),
            None => return self.estimate(item, pre_select_handle).await,
        };

        let Some(selection_id) = selection_id else {
            debug!("no close match among candidates, estimating");
            return self.estimate(item, handle).await;
        };

        let Some(details) = self.food_data.fetch_details(&selection_id).await else {
            return self.estimate(item, handle).await;
        };

        self.extract(item, details, handle).await
    }

    /// SEARCH: let the model drive the lookup tool, bounded by
    /// `max_tool_rounds`. Empty results are fed back so the model may retry
    /// with a broader query.
    async fn search(&self, item: &DecomposedItem, handle: ConversationHandle) -> SearchResult {
        let mut request = GatewayRequest::new(&self.config.fast_model, LOOKUP_INSTRUCTIONS)
            .with_conversation(Some(handle.clone()))
            .with_tool(lookup_tool())
            .with_message(ChatMessage::user(&item.description));
        let mut handle = handle;

        for round in 0..self.config.max_tool_rounds {
            let outcome = match self.gateway.call(&request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, round, "search call failed, falling back to estimation");
                    return SearchResult::Fallback(handle);
                }
            };
            handle = outcome.conversation.clone();

            let Some(invocation) = outcome.tool_call else {
                debug!(round, "model stopped searching without a tool call");
                return SearchResult::Fallback(handle);
            };

            let Some(query) = invocation.arguments.get("query").and_then(|v| v.as_str())
            else {
                warn!(round, "tool call missing query argument");
                return SearchResult::Fallback(handle);
            };

            let candidates = self
                .food_data
                .search(query, self.config.search_page_size)
                .await;

            if !candidates.is_empty() {
                return SearchResult::Candidates {
                    candidates,
                    call_id: invocation.call_id,
                    handle,
                };
            }

            debug!(query = %query, round, "empty search, offering a retry");
            request = GatewayRequest::new(&self.config.fast_model, LOOKUP_INSTRUCTIONS)
                .with_conversation(Some(handle.clone()))
                .with_tool(lookup_tool())
                .with_tool_output(ToolOutput {
                    call_id: invocation.call_id,
                    output: format!(
                        "No foods found for '{query}'. Retry once with a broader query, \
                         or reply with intent 'chat' if the item cannot be searched."
                    ),
                });
        }

        debug!("tool round budget exhausted, falling back to estimation");
        SearchResult::Fallback(handle)
    }

    /// SELECT: ask the primary model to pick the best candidate or "none".
    ///
    /// Returns `None` on gateway or contract failure, `Some((None, handle))`
    /// when the model declined every candidate.
    async fn select(
        &self,
        item: &DecomposedItem,
        candidates: &[SearchCandidate],
        call_id: String,
        handle: ConversationHandle,
    ) -> Option<(Option<String>, ConversationHandle)> {
        let payload = json!({
            "food_item": item.description,
            "results": candidates,
        });

        let request = GatewayRequest::new(&self.config.model, SELECTION_INSTRUCTIONS)
            .with_conversation(Some(handle))
            .with_tool_output(ToolOutput {
                call_id,
                output: payload.to_string(),
            });

        let outcome = match self.gateway.call(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "selection call failed, falling back to estimation");
                return None;
            }
        };
        let handle = outcome.conversation.clone();

        let selections = match outcome.text().map(parse_selections) {
            Some(Ok(selections)) => selections,
            Some(Err(e)) => {
                warn!(error = %e, "selection reply violated contract, falling back to estimation");
                return None;
            }
            None => {
                warn!("selection returned no text, falling back to estimation");
                return None;
            }
        };

        let verdict = selections
            .iter()
            .find(|s| s.food_item.eq_ignore_ascii_case(&item.description))
            .or_else(|| selections.first());

        match verdict {
            Some(selection) if selection.is_none() => Some((None, handle)),
            Some(selection) => Some((Some(selection.id.clone()), handle)),
            None => {
                warn!("selection reply was empty, falling back to estimation");
                Some((None, handle))
            }
        }
    }

    /// EXTRACT: pull per-100g values out of the filtered payload, then scale
    /// to the described serving.
    async fn extract(
        &self,
        item: &DecomposedItem,
        details: crate::fooddata::FoodDetails,
        handle: ConversationHandle,
    ) -> ItemOutcome {
        let filtered = details.essential_only();
        let payload = match serde_json::to_string(&filtered) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "could not serialize nutrient payload, estimating");
                return self.estimate(item, handle).await;
            }
        };

        let request = GatewayRequest::new(&self.config.fast_model, EXTRACTION_INSTRUCTIONS)
            .with_conversation(Some(handle.clone()))
            .with_message(ChatMessage::user(payload));

        let outcome = match self.gateway.call(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "extraction call failed, estimating");
                return self.estimate(item, handle).await;
            }
        };
        let handle = outcome.conversation.clone();

        match outcome.text().map(parse_step_reply) {
            Some(Ok(StepReply::LogFood(reply))) => {
                let record = NutrientRecord::from(reply).scaled_to(item.user_serving_grams);
                debug!(calories = record.calories, "item resolved from reference data");
                ItemOutcome::Resolved(record)
            }
            Some(Ok(StepReply::Chat(_))) | Some(Err(_)) | None => {
                warn!("extraction did not produce a usable record, estimating");
                self.estimate(item, handle).await
            }
        }
    }

    /// ESTIMATE: universal fallback. Estimated values arrive already scaled
    /// to the described serving and are only rounded, never rescaled.
    async fn estimate(&self, item: &DecomposedItem, handle: ConversationHandle) -> ItemOutcome {
        let request = GatewayRequest::new(&self.config.fast_model, ESTIMATION_INSTRUCTIONS)
            .with_conversation(Some(handle))
            .with_message(ChatMessage::user(format!(
                "{} (serving: {} g)",
                item.description, item.user_serving_grams
            )));

        let outcome = match self.gateway.call(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "estimation call failed");
                return ItemOutcome::Failed {
                    item: item.description.clone(),
                    reason: format!("estimation unavailable: {e}"),
                    clarification: None,
                };
            }
        };

        match outcome.text().map(parse_step_reply) {
            Some(Ok(StepReply::LogFood(reply))) => {
                let record = NutrientRecord::from(reply).rounded();
                debug!(calories = record.calories, "item resolved by estimation");
                ItemOutcome::Resolved(record)
            }
            Some(Ok(StepReply::Chat(chat))) => ItemOutcome::Failed {
                item: item.description.clone(),
                reason: "needs clarification".to_owned(),
                clarification: Some(chat.response),
            },
            Some(Err(e)) => ItemOutcome::Failed {
                item: item.description.clone(),
                reason: format!("estimate violated contract: {e}"),
                clarification: None,
            },
            None => ItemOutcome::Failed {
                item: item.description.clone(),
                reason: "estimate returned no text".to_owned(),
                clarification: None,
            },
        }
    }

    /// AGGREGATE: one success is enough for a meals result; zero successes
    /// become a single clarification message.
    fn aggregate(
        resolutions: Vec<ItemOutcome>,
        conversation: ConversationHandle,
    ) -> ResolutionOutcome {
        let mut meals = Vec::new();
        let mut errors = Vec::new();
        let mut clarification: Option<String> = None;

        for resolution in resolutions {
            match resolution {
                ItemOutcome::Resolved(record) => meals.push(record),
                ItemOutcome::Failed {
                    item,
                    reason,
                    clarification: question,
                } => {
                    errors.push(format!("{item}: {reason}"));
                    if clarification.is_none() {
                        clarification = question;
                    }
                }
            }
        }

        if meals.is_empty() {
            let message = clarification.unwrap_or_else(|| {
                "I couldn't work out the nutrition for that. Could you describe \
                 the food and portion in more detail?"
                    .to_owned()
            });
            ResolutionOutcome::Chat {
                message,
                conversation,
            }
        } else {
            info!(
                resolved = meals.len(),
                failed = errors.len(),
                "resolution run aggregated"
            );
            ResolutionOutcome::Meals {
                meals,
                errors,
                conversation,
            }
        }
    }
}

enum Decomposition {
    Items(Vec<DecomposedItem>),
    Chat(String),
}

enum SearchResult {
    Candidates {
        candidates: Vec<SearchCandidate>,
        call_id: String,
        handle: ConversationHandle,
    },
    Fallback(ConversationHandle),
}
