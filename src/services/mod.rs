// ABOUTME: Application services composing the pipeline with persistence
// ABOUTME: Currently one service: meal logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! Application-level services. The pipeline resolves, the store persists;
//! services glue the two behind one request/response call.

mod meal_logging;

pub use meal_logging::MealLoggingService;
