// ABOUTME: Meal-logging service: resolve a description, persist successes, shape the response
// ABOUTME: Clarification outcomes persist nothing and relay the question unchanged
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

use tracing::{info, instrument};

use crate::errors::AppResult;
use crate::fooddata::FoodDataSource;
use crate::llm::{ConversationHandle, LlmGateway};
use crate::models::{FoodQuery, LogMealRequest, LogMealResponse};
use crate::pipeline::{assemble, ResolutionOutcome, ResolutionPipeline, ResponseFormat};
use crate::storage::MealStore;

/// End-to-end meal logging: one inbound request, one resolution run, zero or
/// more persisted meals, one response.
pub struct MealLoggingService<G, F, S> {
    pipeline: ResolutionPipeline<G, F>,
    store: S,
    format: ResponseFormat,
}

impl<G: LlmGateway, F: FoodDataSource, S: MealStore> MealLoggingService<G, F, S> {
    /// Create a service over a pipeline and a meal store
    pub fn new(pipeline: ResolutionPipeline<G, F>, store: S, format: ResponseFormat) -> Self {
        Self {
            pipeline,
            store,
            format,
        }
    }

    /// Handle one meal-logging request.
    ///
    /// Resolved items are persisted before the response is assembled;
    /// clarification outcomes persist nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the decomposition call cannot reach the provider
    /// or if persisting a resolved meal fails.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn log_meal(&self, request: &LogMealRequest) -> AppResult<LogMealResponse> {
        let mut query = FoodQuery::new(&request.description);
        if let Some(id) = &request.conversation_id {
            query = query.with_conversation(ConversationHandle::new(id.clone()));
        }
        if let Some(history) = &request.history {
            query = query.with_history(history.clone());
        }

        let outcome = self.pipeline.resolve(&query).await?;

        if let ResolutionOutcome::Meals { meals, .. } = &outcome {
            for record in meals {
                self.store.save_meal(&request.user_id, record).await?;
            }
            info!(
                user_id = %request.user_id,
                meals = meals.len(),
                "meals persisted"
            );
        }

        Ok(assemble(outcome, self.format))
    }
}
