// ABOUTME: Command-line entry point for the macrolog backend core
// ABOUTME: Logs meals through the resolution pipeline and computes daily energy needs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

use anyhow::Result;
use clap::{Parser, Subcommand};

use macrolog::config::ServerConfig;
use macrolog::fooddata::UsdaClient;
use macrolog::llm::OpenAiResponsesProvider;
use macrolog::models::LogMealRequest;
use macrolog::pipeline::{ResolutionPipeline, ResponseFormat};
use macrolog::profile::{ActivityLevel, Sex, UserProfile};
use macrolog::services::MealLoggingService;
use macrolog::storage::InMemoryMealStore;

#[derive(Parser)]
#[command(name = "macrolog-cli", version, about = "Macrolog nutrition backend CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a free-text meal description into nutrient records
    Log {
        /// The meal description, e.g. "an apple and two eggs"
        description: String,

        /// User identity to log the meal under
        #[arg(long, default_value = "local")]
        user: String,

        /// Conversation id from a previous response, to continue a dialogue
        #[arg(long)]
        conversation: Option<String>,

        /// Emit the legacy single-meal response shape
        #[arg(long)]
        legacy: bool,
    },

    /// Compute daily energy needs for a profile
    Needs {
        /// Body weight in kilograms
        #[arg(long)]
        weight_kg: f64,

        /// Height in centimeters
        #[arg(long)]
        height_cm: f64,

        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        date_of_birth: chrono::NaiveDate,

        /// Biological sex: male or female
        #[arg(long, value_parser = parse_sex)]
        sex: Sex,

        /// Activity level: sedentary, lightly_active, moderately_active,
        /// very_active, extra_active
        #[arg(long, default_value = "sedentary", value_parser = parse_activity)]
        activity: ActivityLevel,
    },
}

fn parse_sex(value: &str) -> Result<Sex, String> {
    match value.to_ascii_lowercase().as_str() {
        "male" => Ok(Sex::Male),
        "female" => Ok(Sex::Female),
        other => Err(format!("unknown sex '{other}', expected male or female")),
    }
}

fn parse_activity(value: &str) -> Result<ActivityLevel, String> {
    match value.to_ascii_lowercase().as_str() {
        "sedentary" => Ok(ActivityLevel::Sedentary),
        "lightly_active" => Ok(ActivityLevel::LightlyActive),
        "moderately_active" => Ok(ActivityLevel::ModeratelyActive),
        "very_active" => Ok(ActivityLevel::VeryActive),
        "extra_active" => Ok(ActivityLevel::ExtraActive),
        other => Err(format!("unknown activity level '{other}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    macrolog::logging::init_from_env()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Log {
            description,
            user,
            conversation,
            legacy,
        } => {
            let config = ServerConfig::from_env()?;
            let pipeline = ResolutionPipeline::new(
                OpenAiResponsesProvider::new(&config.llm)?,
                UsdaClient::new(&config.food_data)?,
                config.pipeline,
            );
            let format = if legacy {
                ResponseFormat::Legacy
            } else {
                ResponseFormat::Modern
            };
            let service = MealLoggingService::new(pipeline, InMemoryMealStore::new(), format);

            let request = LogMealRequest {
                user_id: user,
                description,
                conversation_id: conversation,
                history: None,
            };
            let response = service.log_meal(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Needs {
            weight_kg,
            height_cm,
            date_of_birth,
            sex,
            activity,
        } => {
            let profile = UserProfile {
                user_id: "local".into(),
                weight_kg,
                height_cm,
                date_of_birth,
                sex,
                activity_level: activity,
            };
            let needs = profile.daily_needs();
            println!("{}", serde_json::to_string_pretty(&needs)?);
        }
    }

    Ok(())
}
