// ABOUTME: Centralized instruction templates and tool specs for the resolution pipeline
// ABOUTME: Each constant pairs with a JSON contract validated in llm::contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # Prompt Library
//!
//! Fixed instruction templates, one per pipeline step. These are contract
//! surfaces: the JSON shape each template demands is validated on parse by
//! [`crate::llm::contract`], failing closed on any mismatch.

use serde_json::json;

use super::FunctionSpec;

/// Name of the composition-database lookup tool advertised to the model
pub const LOOKUP_TOOL_NAME: &str = "lookup_food_nutrition";

/// DECOMPOSE: split a free-text description into independently resolvable
/// food items with gram estimates, or ask for clarification.
pub const DECOMPOSE_INSTRUCTIONS: &str = "\
You are a nutrition assistant. The user describes a meal they ate; this may \
be part of an ongoing conversation, so infer intent from prior context.\n\
\n\
Split the description into individual food items. For each item estimate:\n\
- single_serving_grams: the weight in grams of one typical serving\n\
- user_serving_grams: the weight in grams of the serving the user described \
(assume a single serving unless stated otherwise)\n\
\n\
Respond with ONLY valid JSON, no commentary:\n\
{\n\
  \"intent\": \"log_food\",\n\
  \"items\": [\n\
    {\"description\": string, \"single_serving_grams\": number, \"user_serving_grams\": number}\n\
  ]\n\
}\n\
\n\
If the description is too vague to resolve and the preparation matters \
(like 'chicken', 'bread', 'cereal'), respond instead with:\n\
{\"intent\": \"chat\", \"response\": string asking for the needed specifics}";

/// SEARCH: per item, drive the lookup tool with an optimized query.
pub const LOOKUP_INSTRUCTIONS: &str = "\
You are a nutrition assistant. Search the USDA FoodData Central database for \
the food item given by the user.\n\
\n\
Call the lookup_food_nutrition function with a query optimized for the USDA \
database. For fruits and vegetables, add 'raw' (e.g. 'apple raw'). If a \
search comes back empty you may retry once with a broader query.\n\
\n\
If the item cannot be searched at all, respond with:\n\
{\"intent\": \"chat\", \"response\": string asking for the needed specifics}";

/// SELECT: pick the best candidate from search results, or "none".
pub const SELECTION_INSTRUCTIONS: &str = "\
Select the BEST matching food from these USDA search results for each food \
item. Match the user's description as closely as possible.\n\
\n\
Respond with ONLY a valid JSON array:\n\
[\n\
  {\"food_item\": \"food description\", \"id\": \"fdc_id_or_none\"}\n\
]\n\
\n\
If no result matches an item well, use \"none\" as the id.";

/// EXTRACT: pull per-100g macro values out of the filtered USDA payload.
pub const EXTRACTION_INSTRUCTIONS: &str = "\
Extract nutrition data from this USDA JSON and format it as the required \
JSON response. Values are per 100 g of the reference food; report them per \
100 g, do not rescale. Look for Energy, Protein, Carbohydrate, Total lipid \
(fat), Fiber, Sugars.\n\
\n\
Respond with ONLY the following JSON, no comments:\n\
{\n\
  \"intent\": \"log_food\",\n\
  \"description\": string,\n\
  \"calories\": number,\n\
  \"protein\": number,\n\
  \"fiber\": number,\n\
  \"carbs\": number,\n\
  \"fat\": number,\n\
  \"sugar\": number,\n\
  \"assumptions\": string\n\
}\n\
\n\
Mention 'Data from USDA FoodData Central' in assumptions.";

/// ESTIMATE: fallback estimation when structured lookup failed.
pub const ESTIMATION_INSTRUCTIONS: &str = "\
You are a nutrition assistant. Estimate the nutrition data for the food \
described by the user, scaled to the serving size they described.\n\
\n\
Respond with ONLY the following JSON:\n\
{\n\
  \"intent\": \"log_food\",\n\
  \"description\": string,\n\
  \"calories\": number,\n\
  \"protein\": number,\n\
  \"fiber\": number,\n\
  \"carbs\": number,\n\
  \"fat\": number,\n\
  \"sugar\": number,\n\
  \"assumptions\": string listing any assumptions made, mentioning 'Estimate provided by LLM'\n\
}\n\
\n\
If you cannot estimate, respond with intent 'chat' and ask for more details, \
for example:\n\
{\"intent\": \"chat\", \"response\": \"Could you provide more details about the cereal? Is it a specific brand or type?\"}";

/// The composition-database lookup tool spec
#[must_use]
pub fn lookup_tool() -> FunctionSpec {
    FunctionSpec {
        name: LOOKUP_TOOL_NAME.to_owned(),
        description: "Search the USDA FoodData Central database for a food item. \
                      Reject vague terms."
            .to_owned(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search term optimized for the USDA database. \
                                    For fruits/vegetables, add 'raw' (e.g. 'apple raw')."
                }
            },
            "required": ["query"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_tool_requires_query_parameter() {
        let tool = lookup_tool();
        assert_eq!(tool.name, LOOKUP_TOOL_NAME);
        assert_eq!(tool.parameters["required"][0], "query");
    }

    #[test]
    fn instructions_name_their_contract_intents() {
        for template in [
            DECOMPOSE_INSTRUCTIONS,
            EXTRACTION_INSTRUCTIONS,
            ESTIMATION_INSTRUCTIONS,
        ] {
            assert!(template.contains("log_food"));
        }
        assert!(SELECTION_INSTRUCTIONS.contains("none"));
    }
}
