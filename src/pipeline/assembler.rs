// ABOUTME: Shapes a pipeline outcome into the external response contract
// ABOUTME: Legacy single-meal flattening vs modern meals list, plus partial-failure summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # Response Assembly
//!
//! The pipeline's outcome is shaped here into the wire response. Two formats
//! exist: the legacy shape flattens a lone successful meal into a single
//! `meal` field, the modern shape always carries a `meals` list. Partial
//! failures add a summary note so callers need not inspect `errors` to notice
//! something was dropped.

use crate::models::LogMealResponse;

use super::ResolutionOutcome;

/// Wire shape expected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Flatten a single successful meal into the `meal` field
    Legacy,
    /// Always return a `meals` list
    #[default]
    Modern,
}

/// Shape a resolution outcome into the response contract.
///
/// The conversation handle is always present so the caller can continue the
/// dialogue regardless of outcome.
#[must_use]
pub fn assemble(outcome: ResolutionOutcome, format: ResponseFormat) -> LogMealResponse {
    match outcome {
        ResolutionOutcome::Chat {
            message,
            conversation,
        } => LogMealResponse {
            message: Some(message),
            conversation_id: conversation.to_string(),
            ..LogMealResponse::default()
        },
        ResolutionOutcome::Meals {
            meals,
            errors,
            conversation,
        } => {
            let total = meals.len() + errors.len();
            let message = (!errors.is_empty()).then(|| {
                format!(
                    "Logged {} of {} items; the rest could not be resolved.",
                    meals.len(),
                    total
                )
            });

            let mut response = LogMealResponse {
                message,
                errors: (!errors.is_empty()).then_some(errors),
                conversation_id: conversation.to_string(),
                ..LogMealResponse::default()
            };

            let flatten = format == ResponseFormat::Legacy
                && meals.len() == 1
                && response.errors.is_none();
            if flatten {
                response.meal = meals.into_iter().next();
            } else {
                response.meals = Some(meals);
            }

            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ConversationHandle;
    use crate::models::NutrientRecord;

    fn record(description: &str) -> NutrientRecord {
        NutrientRecord {
            description: description.into(),
            calories: 94.64,
            protein: 0.47,
            fiber: 4.37,
            carbs: 25.13,
            fat: 0.31,
            sugar: 18.91,
            assumptions: "Data from USDA FoodData Central".into(),
        }
    }

    fn meals_outcome(meals: Vec<NutrientRecord>, errors: Vec<String>) -> ResolutionOutcome {
        ResolutionOutcome::Meals {
            meals,
            errors,
            conversation: ConversationHandle::new("resp_42"),
        }
    }

    #[test]
    fn legacy_single_success_flattens_into_meal() {
        let response = assemble(meals_outcome(vec![record("apple")], vec![]), ResponseFormat::Legacy);
        assert!(response.meal.is_some());
        assert!(response.meals.is_none());
        assert!(response.message.is_none());
        assert_eq!(response.conversation_id, "resp_42");
    }

    #[test]
    fn modern_single_success_stays_a_list() {
        let response = assemble(meals_outcome(vec![record("apple")], vec![]), ResponseFormat::Modern);
        assert!(response.meal.is_none());
        assert_eq!(response.meals.map(|m| m.len()), Some(1));
    }

    #[test]
    fn partial_failure_keeps_list_shape_and_adds_summary() {
        let outcome = meals_outcome(
            vec![record("rice, cooked")],
            vec!["mystery sauce: needs clarification".into()],
        );
        let response = assemble(outcome, ResponseFormat::Legacy);
        assert!(response.meal.is_none());
        assert_eq!(response.meals.map(|m| m.len()), Some(1));
        assert_eq!(response.errors.map(|e| e.len()), Some(1));
        assert_eq!(
            response.message.as_deref(),
            Some("Logged 1 of 2 items; the rest could not be resolved.")
        );
    }

    #[test]
    fn chat_outcome_carries_only_message_and_handle() {
        let response = assemble(
            ResolutionOutcome::Chat {
                message: "Which kind of chicken?".into(),
                conversation: ConversationHandle::new("resp_7"),
            },
            ResponseFormat::Modern,
        );
        assert_eq!(response.message.as_deref(), Some("Which kind of chicken?"));
        assert!(response.meal.is_none() && response.meals.is_none() && response.errors.is_none());
        assert_eq!(response.conversation_id, "resp_7");
    }
}
