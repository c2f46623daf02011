// ABOUTME: Shared test fixtures: a scripted LLM gateway and a canned food-data source
// ABOUTME: Replies are routed by step instructions plus a content needle, so concurrent items stay deterministic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors
#![allow(dead_code, missing_docs)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use macrolog::errors::{AppError, AppResult};
use macrolog::fooddata::{FoodDataSource, FoodDetails, NutrientAmount};
use macrolog::llm::{
    ConversationHandle, GatewayCapabilities, GatewayOutcome, GatewayRequest, LlmGateway,
    ToolInvocation,
};
use macrolog::models::SearchCandidate;

/// One scripted gateway reply. A call matches when its instructions equal
/// `instructions` and, if `needle` is non-empty, some message or tool output
/// contains it. Matched entries are consumed.
pub struct ScriptedReply {
    pub instructions: &'static str,
    pub needle: &'static str,
    pub result: AppResult<GatewayOutcome>,
}

impl ScriptedReply {
    pub fn new(
        instructions: &'static str,
        needle: &'static str,
        result: AppResult<GatewayOutcome>,
    ) -> Self {
        Self {
            instructions,
            needle,
            result,
        }
    }
}

/// Gateway double driven by a script instead of a provider
pub struct MockGateway {
    script: Mutex<Vec<ScriptedReply>>,
    pub calls: Mutex<Vec<GatewayRequest>>,
}

impl MockGateway {
    pub fn new(script: Vec<ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn matches(entry: &ScriptedReply, request: &GatewayRequest) -> bool {
        if request.instructions != entry.instructions {
            return false;
        }
        if entry.needle.is_empty() {
            return true;
        }
        request
            .messages
            .iter()
            .any(|m| m.content.contains(entry.needle))
            || request
                .tool_outputs
                .iter()
                .any(|o| o.output.contains(entry.needle))
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn capabilities(&self) -> GatewayCapabilities {
        GatewayCapabilities::all()
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn call(&self, request: &GatewayRequest) -> AppResult<GatewayOutcome> {
        self.calls.lock().unwrap().push(request.clone());

        let mut script = self.script.lock().unwrap();
        let position = script.iter().position(|entry| Self::matches(entry, request));
        match position {
            Some(index) => script.remove(index).result,
            None => Err(AppError::internal(format!(
                "unscripted gateway call (instructions started with {:?})",
                request.instructions.chars().take(40).collect::<String>()
            ))),
        }
    }
}

/// A plain text reply carrying a fresh handle
pub fn text_outcome(text: &str, handle: &str) -> AppResult<GatewayOutcome> {
    Ok(GatewayOutcome {
        text: Some(text.to_owned()),
        tool_call: None,
        conversation: ConversationHandle::new(handle),
    })
}

/// A lookup tool invocation carrying a fresh handle
pub fn lookup_outcome(query: &str, call_id: &str, handle: &str) -> AppResult<GatewayOutcome> {
    Ok(GatewayOutcome {
        text: None,
        tool_call: Some(ToolInvocation {
            name: "lookup_food_nutrition".to_owned(),
            arguments: json!({ "query": query }),
            call_id: call_id.to_owned(),
        }),
        conversation: ConversationHandle::new(handle),
    })
}

/// A well-formed `log_food` step reply
pub fn log_food_reply(description: &str, calories: f64, assumptions: &str) -> String {
    json!({
        "intent": "log_food",
        "description": description,
        "calories": calories,
        "protein": 0.26,
        "fiber": 2.4,
        "carbs": 13.81,
        "fat": 0.17,
        "sugar": 10.39,
        "assumptions": assumptions,
    })
    .to_string()
}

/// A well-formed `chat` step reply
pub fn chat_reply(response: &str) -> String {
    json!({ "intent": "chat", "response": response }).to_string()
}

/// Food-data double with canned search results and detail payloads.
///
/// Search keys are substrings matched case-insensitively against the query;
/// anything unmatched yields the empty, fail-soft result.
#[derive(Default)]
pub struct MockFoodSource {
    results: Vec<(String, Vec<SearchCandidate>)>,
    details: HashMap<String, FoodDetails>,
    pub queries: Mutex<Vec<String>>,
}

impl MockFoodSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, key: &str, candidates: Vec<SearchCandidate>) -> Self {
        self.results.push((key.to_ascii_lowercase(), candidates));
        self
    }

    pub fn with_details(mut self, external_id: &str, details: FoodDetails) -> Self {
        self.details.insert(external_id.to_owned(), details);
        self
    }
}

#[async_trait]
impl FoodDataSource for MockFoodSource {
    async fn search(&self, query: &str, _page_size: u32) -> Vec<SearchCandidate> {
        self.queries.lock().unwrap().push(query.to_owned());
        let query = query.to_ascii_lowercase();
        self.results
            .iter()
            .find(|(key, _)| query.contains(key))
            .map(|(_, candidates)| candidates.clone())
            .unwrap_or_default()
    }

    async fn fetch_details(&self, external_id: &str) -> Option<FoodDetails> {
        self.details.get(external_id).cloned()
    }
}

/// Candidate row as the composition database would return it
pub fn candidate(description: &str, external_id: &str) -> SearchCandidate {
    SearchCandidate {
        description: description.to_owned(),
        external_id: external_id.to_owned(),
        data_type: "Foundation".to_owned(),
    }
}

/// Per-100g detail payload with the apple reference values
pub fn apple_details() -> FoodDetails {
    FoodDetails {
        description: "Apples, raw, with skin".to_owned(),
        serving_size: None,
        serving_size_unit: None,
        nutrients: vec![
            NutrientAmount {
                name: "Energy".to_owned(),
                amount: 52.0,
                unit: Some("kcal".to_owned()),
            },
            NutrientAmount {
                name: "Protein".to_owned(),
                amount: 0.26,
                unit: Some("g".to_owned()),
            },
            NutrientAmount {
                name: "Carbohydrate, by difference".to_owned(),
                amount: 13.81,
                unit: Some("g".to_owned()),
            },
        ],
        portions: Vec::new(),
    }
}
