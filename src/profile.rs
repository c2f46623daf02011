// ABOUTME: User profile types and daily-energy calculations
// ABOUTME: Age from date of birth, Mifflin-St Jeor BMR, activity-scaled daily needs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # User Profiles and Energy Needs
//!
//! Profile data lives alongside logged meals so daily totals can be compared
//! against a target. Basal metabolic rate uses the Mifflin-St Jeor equation;
//! daily needs scale it by a self-reported activity level.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::round2;

/// Biological sex, as the BMR equation needs it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Equation offset +5
    Male,
    /// Equation offset -161
    Female,
}

/// Self-reported activity level with its energy multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Exercise 1-3 days/week
    LightlyActive,
    /// Exercise 3-5 days/week
    ModeratelyActive,
    /// Exercise 6-7 days/week
    VeryActive,
    /// Physical job or twice-daily training
    ExtraActive,
}

impl ActivityLevel {
    /// Multiplier applied to BMR to get total daily energy expenditure
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::LightlyActive => 1.375,
            Self::ModeratelyActive => 1.55,
            Self::VeryActive => 1.725,
            Self::ExtraActive => 1.9,
        }
    }
}

/// A user's physical profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque caller identity
    pub user_id: String,
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Height in centimeters
    pub height_cm: f64,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Biological sex
    pub sex: Sex,
    /// Self-reported activity level
    pub activity_level: ActivityLevel,
}

/// Computed daily energy needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNeeds {
    /// Basal metabolic rate in kcal/day
    pub bmr: f64,
    /// Total daily energy expenditure in kcal/day
    pub tdee: f64,
}

impl UserProfile {
    /// Completed years of age as of the given date
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let mut age = today.year() - self.date_of_birth.year();
        let birthday_passed = (today.month(), today.day())
            >= (self.date_of_birth.month(), self.date_of_birth.day());
        if !birthday_passed {
            age -= 1;
        }
        age.max(0) as u32
    }

    /// Completed years of age as of today (UTC)
    #[must_use]
    pub fn age(&self) -> u32 {
        self.age_on(Utc::now().date_naive())
    }

    /// Basal metabolic rate (Mifflin-St Jeor) in kcal/day, as of the given
    /// date. Never negative.
    #[must_use]
    pub fn bmr_on(&self, today: NaiveDate) -> f64 {
        let offset = match self.sex {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        };
        let age = f64::from(self.age_on(today));
        let bmr = 10.0 * self.weight_kg + 6.25 * self.height_cm - 5.0 * age + offset;
        round2(bmr.max(0.0))
    }

    /// Daily energy needs as of the given date
    #[must_use]
    pub fn daily_needs_on(&self, today: NaiveDate) -> DailyNeeds {
        let bmr = self.bmr_on(today);
        DailyNeeds {
            bmr,
            tdee: round2(bmr * self.activity_level.multiplier()),
        }
    }

    /// Daily energy needs as of today (UTC)
    #[must_use]
    pub fn daily_needs(&self) -> DailyNeeds {
        self.daily_needs_on(Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(sex: Sex) -> UserProfile {
        UserProfile {
            user_id: "alice".into(),
            weight_kg: 70.0,
            height_cm: 175.0,
            date_of_birth: NaiveDate::from_ymd_opt(1996, 6, 15).unwrap(),
            sex,
            activity_level: ActivityLevel::ModeratelyActive,
        }
    }

    #[test]
    fn age_counts_completed_years_only() {
        let p = profile(Sex::Female);
        let before_birthday = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        let on_birthday = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(p.age_on(before_birthday), 29);
        assert_eq!(p.age_on(on_birthday), 30);
    }

    #[test]
    fn bmr_applies_sex_offset() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        // 10*70 + 6.25*175 - 5*30 = 1643.75; +5 male, -161 female
        assert_eq!(profile(Sex::Male).bmr_on(today), 1648.75);
        assert_eq!(profile(Sex::Female).bmr_on(today), 1482.75);
    }

    #[test]
    fn daily_needs_scale_bmr_by_activity() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let needs = profile(Sex::Male).daily_needs_on(today);
        assert_eq!(needs.tdee, round2(needs.bmr * 1.55));
    }

    #[test]
    fn bmr_is_floored_at_zero() {
        let p = UserProfile {
            weight_kg: 2.0,
            height_cm: 10.0,
            date_of_birth: NaiveDate::from_ymd_opt(1950, 1, 1).unwrap(),
            ..profile(Sex::Female)
        };
        let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert_eq!(p.bmr_on(today), 0.0);
    }
}
