//! Core types for the dish2recipe pipeline
//!
//! These are the records the Response Parser produces from model output.
//! A value of any of these types has passed validation; there is no way to
//! hold a partially-populated record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the vision model saw in the uploaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodIdentification {
    /// Dish name (never empty)
    #[serde(alias = "food_name")]
    pub name: String,
    /// One-sentence description of the dish
    pub description: String,
    /// Model confidence, 0.0-1.0 inclusive
    #[serde(alias = "confidence_score")]
    pub confidence: f64,
}

/// A single recipe suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe name (never empty)
    #[serde(alias = "recipe_name")]
    pub name: String,
    /// One-sentence description
    pub description: String,
    /// Key ingredients, in the order the model listed them
    #[serde(alias = "key_ingredients")]
    pub ingredients: Vec<String>,
}

/// Recipes in model output order. Usually five, but not guaranteed.
pub type RecipeSet = Vec<Recipe>;

/// Response language for prompts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
}

impl Language {
    /// All supported languages, in display order
    pub const ALL: [Language; 2] = [Language::English, Language::Spanish];

    /// Two-letter language code
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for an unrecognized language code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "es" | "spanish" | "español" => Ok(Language::Spanish),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_str() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!(" ES ".parse::<Language>().unwrap(), Language::Spanish);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_serialization() {
        let json = serde_json::to_string(&Language::Spanish).unwrap();
        assert_eq!(json, "\"es\"");
        assert_eq!(Language::default(), Language::English);
    }

    #[test]
    fn test_recipe_accepts_legacy_field_names() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"recipe_name": "Pizza Bianca", "description": "No sauce.", "key_ingredients": ["dough", "olive oil"]}"#,
        )
        .unwrap();
        assert_eq!(recipe.name, "Pizza Bianca");
        assert_eq!(recipe.ingredients, vec!["dough", "olive oil"]);
    }
}
