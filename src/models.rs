//! Data models and structures
//!
//! Defines the request and response shapes of the HTTP API, the dish and
//! course results, and the process configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Style weights at or below this value are left out of prompts.
pub const INFLUENCE_THRESHOLD: f64 = 5.0;

/// Named style weights (0-10 by convention) nudging the generated dish.
///
/// Weights are any JSON number. Whole values render without a fraction
/// (`8.0` as `8`), so integer sliders and float sliders read the same.
/// Labels are kept sorted so the rendered prompts are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleProfile(BTreeMap<String, f64>);

impl StyleProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<String>, weight: impl Into<f64>) -> Self {
        self.0.insert(label.into(), weight.into());
        self
    }

    /// Entries whose weight is strictly above [`INFLUENCE_THRESHOLD`].
    pub fn significant(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0
            .iter()
            .filter(|(_, weight)| **weight > INFLUENCE_THRESHOLD)
            .map(|(label, weight)| (label.as_str(), *weight))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body of `POST /generate_dishes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub idea: Option<String>,
    #[serde(default)]
    pub style_influence: StyleProfile,
}

impl GenerationRequest {
    /// The idea, if present and not blank.
    pub fn idea(&self) -> Option<&str> {
        self.idea
            .as_deref()
            .map(str::trim)
            .filter(|idea| !idea.is_empty())
    }
}

/// A single generated dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishResult {
    pub short_name: String,
    pub menu_item_description: String,
    pub ingredients: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<String>,
    pub instructions: String,
    pub image_url: Option<String>,
}

/// One course of a generated three-course meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseResult {
    pub name: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseMenu {
    pub courses: Vec<CourseResult>,
    pub image_url: Option<String>,
}

/// Successful response body, shaped by the configured [`MenuVariant`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MenuResponse {
    Dish(DishResult),
    Courses(CourseMenu),
}

/// Which menu shape the service generates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuVariant {
    #[default]
    Dish,
    Courses,
}

impl FromStr for MenuVariant {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dish" => Ok(MenuVariant::Dish),
            "courses" => Ok(MenuVariant::Courses),
            other => Err(crate::Error::Config(format!(
                "Unknown MENU_VARIANT '{}'. Expected 'dish' or 'courses'",
                other
            ))),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub menu_variant: MenuVariant,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| crate::Error::Config("OPENAI_API_KEY not set".to_string()))?;

        let menu_variant = match lookup("MENU_VARIANT") {
            Some(value) => value.parse()?,
            None => MenuVariant::default(),
        };

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid PORT '{}'", value)))?,
            None => 5000,
        };

        Ok(Self {
            openai_api_key,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| crate::ai::openai::DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            chat_model: lookup("CHAT_MODEL").unwrap_or_else(|| "gpt-4".to_string()),
            image_model: lookup("IMAGE_MODEL").unwrap_or_else(|| "dall-e-2".to_string()),
            menu_variant,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
        })
    }
}
