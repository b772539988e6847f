// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Display)]
pub enum DecodeError {
    #[display("decode error: {_0}")]
    Io(std::io::Error),
    #[display("decode error: {_0}")]
    Json(serde_json::Error),
}

impl std::error::Error for DecodeError {}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub cuisines: Vec<String>,
    pub categories: Vec<String>,
    pub avatars: Vec<String>,
    pub ingredients: Vec<CatalogIngredient>,
    pub meal_plans: Vec<CatalogMealPlan>,
    pub recipes: Vec<CatalogRecipe>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogStoreLink {
    pub store: String,
    pub link: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogIngredient {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub store_links: Vec<CatalogStoreLink>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogMealPlan {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_link: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogRecipeIngredient {
    pub name: String,
    pub quantity: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogRecipe {
    pub name: String,
    pub cuisine: String,
    #[serde(default)]
    pub description: String,
    /// Minutes.
    pub preparation_time: i32,
    /// Minutes.
    pub cooking_time: i32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<CatalogRecipeIngredient>,
    /// In order; they are numbered from 1 when imported.
    #[serde(default)]
    pub steps: Vec<String>,
}

pub fn decode_catalog(json: &str) -> Result<Catalog> {
    Ok(serde_json::from_str(json)?)
}

pub fn decode_catalog_from_path(path: impl AsRef<Path>) -> Result<Catalog> {
    let json = std::fs::read_to_string(path)?;
    decode_catalog(&json)
}

#[test]
fn decode_minimal_catalog() {
    let catalog = decode_catalog(
        r#"{
            "cuisines": ["Thai"],
            "categories": ["vegan"],
            "ingredients": [{"name": "tofu", "calories": 76.0}],
            "recipes": [{
                "name": "Pad Thai",
                "cuisine": "Thai",
                "preparation_time": 20,
                "cooking_time": 10,
                "ingredients": [{"name": "tofu", "quantity": "200 g"}],
                "steps": ["Soak the noodles.", "Stir fry."]
            }]
        }"#,
    )
    .unwrap();

    assert_eq!(catalog.cuisines, ["Thai"]);
    assert!(catalog.avatars.is_empty());
    assert!(catalog.meal_plans.is_empty());

    let tofu = &catalog.ingredients[0];
    assert_eq!(tofu.calories, Some(76.0));
    assert_eq!(tofu.category, None);
    assert_eq!(tofu.description, "");
    assert!(tofu.store_links.is_empty());

    let recipe = &catalog.recipes[0];
    assert_eq!(recipe.name, "Pad Thai");
    assert_eq!(recipe.preparation_time, 20);
    assert!(recipe.images.is_empty());
    assert_eq!(recipe.ingredients[0].quantity, "200 g");
    assert_eq!(recipe.steps.len(), 2);
}

#[test]
fn decode_rejects_malformed() {
    assert!(matches!(
        decode_catalog(r#"{"recipes": [{"name": "No Cuisine"}]}"#),
        Err(DecodeError::Json(_))
    ));
    assert!(matches!(
        decode_catalog_from_path("/nonexistent-dir/catalog.json"),
        Err(DecodeError::Io(_))
    ));
}
