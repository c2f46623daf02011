// ABOUTME: Persistence seam for resolved meals
// ABOUTME: MealStore trait plus an in-memory implementation for tests and the CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # Meal Persistence
//!
//! Storage is a collaborator behind [`MealStore`]: the pipeline resolves,
//! the service persists. The in-memory store backs tests and local runs; a
//! database-backed implementation slots in behind the same trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::AppResult;
use crate::models::{Meal, NutrientRecord};

/// Durable storage for resolved meals
#[async_trait]
pub trait MealStore: Send + Sync {
    /// Persist a resolved record as a meal for a user
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    async fn save_meal(&self, user_id: &str, record: &NutrientRecord) -> AppResult<Meal>;

    /// List a user's meals logged on the given date (UTC)
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    async fn list_meals(&self, user_id: &str, date: NaiveDate) -> AppResult<Vec<Meal>>;

    /// Delete all meals for a user
    ///
    /// # Errors
    ///
    /// Returns a storage error if the delete fails.
    async fn clear_meals(&self, user_id: &str) -> AppResult<()>;
}

#[async_trait]
impl<S: MealStore + ?Sized> MealStore for std::sync::Arc<S> {
    async fn save_meal(&self, user_id: &str, record: &NutrientRecord) -> AppResult<Meal> {
        (**self).save_meal(user_id, record).await
    }

    async fn list_meals(&self, user_id: &str, date: NaiveDate) -> AppResult<Vec<Meal>> {
        (**self).list_meals(user_id, date).await
    }

    async fn clear_meals(&self, user_id: &str) -> AppResult<()> {
        (**self).clear_meals(user_id).await
    }
}

/// In-memory meal store
#[derive(Debug, Default)]
pub struct InMemoryMealStore {
    meals: RwLock<Vec<Meal>>,
}

impl InMemoryMealStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MealStore for InMemoryMealStore {
    async fn save_meal(&self, user_id: &str, record: &NutrientRecord) -> AppResult<Meal> {
        let meal = Meal::new(user_id, record.clone());
        debug!(user_id = %user_id, meal_id = %meal.id, "meal saved");
        self.meals.write().await.push(meal.clone());
        Ok(meal)
    }

    async fn list_meals(&self, user_id: &str, date: NaiveDate) -> AppResult<Vec<Meal>> {
        let meals = self.meals.read().await;
        Ok(meals
            .iter()
            .filter(|meal| meal.user_id == user_id && meal.timestamp.date_naive() == date)
            .cloned()
            .collect())
    }

    async fn clear_meals(&self, user_id: &str) -> AppResult<()> {
        self.meals.write().await.retain(|meal| meal.user_id != user_id);
        Ok(())
    }
}
