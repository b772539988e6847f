// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel::prelude::Insertable;
use diesel_derive_enum::DbEnum;
use diesel_derive_newtype::DieselNewType;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

#[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, Copy, Clone, Serialize)]
pub struct UserId(i32);

#[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, Copy, Clone, Serialize)]
pub struct AvatarId(i32);

impl From<i32> for AvatarId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Dietary preference a user can pick at registration or on their profile. Recipes carry the same
/// tags as categories, which is what personalized search matches against.
#[derive(
    Debug,
    Display,
    EnumIter,
    EnumString,
    Hash,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    DbEnum,
    Serialize,
    Deserialize,
)]
#[DbValueStyle = "kebab-case"]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Preference {
    #[display("vegan")]
    Vegan,
    #[display("vegetarian")]
    Vegetarian,
    #[display("egg")]
    Egg,
    #[display("gluten-free")]
    GlutenFree,
    #[display("meat")]
    Meat,
}

impl Preference {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[derive(Queryable, Selectable, Clone, Debug, PartialEq, Eq, Serialize)]
#[diesel(table_name = crate::database::schema::cuisines)]
pub struct Cuisine {
    pub cuisine_name: String,
}

#[derive(Queryable, Selectable, Clone, Debug, PartialEq, Serialize)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct RecipeRow {
    pub recipe_name: String,
    pub cuisine_name: String,
    pub description: String,
    pub rating: f64,
    pub preparation_time: i32,
    pub cooking_time: i32,
}

#[derive(Queryable, Selectable, Clone, Debug, PartialEq, Eq, Serialize)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct RecipeHandle {
    pub recipe_name: String,
}

#[derive(Queryable, Selectable, Clone, Debug, PartialEq, Serialize)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct RecipeRating {
    pub recipe_name: String,
    pub rating: f64,
}

#[derive(Queryable, Selectable, Clone, Debug, PartialEq, Eq, Serialize)]
#[diesel(table_name = crate::database::schema::recipe_images)]
pub struct RecipeImage {
    pub image_id: i32,
    pub recipe_name: String,
    pub image_link: String,
}

#[derive(Queryable, Selectable, Clone, Debug, PartialEq, Eq, Serialize)]
#[diesel(table_name = crate::database::schema::recipe_ingredients)]
pub struct RecipeIngredient {
    pub ingredient_name: String,
    pub quantity: String,
}

#[derive(Queryable, Selectable, Clone, Debug, PartialEq, Eq, Serialize)]
#[diesel(table_name = crate::database::schema::recipe_instructions)]
pub struct RecipeStep {
    pub step_number: i32,
    pub instruction: String,
}

/// A recipe as shown in listings: the base row, its images and how many users like it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recipe {
    pub recipe_name: String,
    pub cuisine_name: String,
    pub description: String,
    pub rating: f64,
    pub preparation_time: i32,
    pub cooking_time: i32,
    pub images: Vec<RecipeImage>,
    pub like_count: i64,
}

impl Recipe {
    pub fn new(row: RecipeRow, images: Vec<RecipeImage>, like_count: i64) -> Self {
        Self {
            recipe_name: row.recipe_name,
            cuisine_name: row.cuisine_name,
            description: row.description,
            rating: row.rating,
            preparation_time: row.preparation_time,
            cooking_time: row.cooking_time,
            images,
            like_count,
        }
    }
}

/// Everything the recipe page shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecipePage {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub categories: Vec<String>,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: Vec<RecipeStep>,
    pub prep_time: String,
    pub cook_time: String,
    pub total_time: String,
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug, PartialEq, Serialize)]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct Ingredient {
    pub ingredient_name: String,
    pub description: String,
    pub category: Option<String>,
    pub calories: Option<f64>,
}

#[derive(Queryable, Selectable, Clone, Debug, PartialEq, Eq, Serialize)]
#[diesel(table_name = crate::database::schema::store_links)]
pub struct StoreLink {
    pub link_id: i32,
    pub ingredient_name: String,
    pub store_name: String,
    pub link: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IngredientDetails {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub store_links: Vec<StoreLink>,
}

#[derive(Queryable, Selectable, Clone, Debug, PartialEq, Eq, Serialize)]
#[diesel(table_name = crate::database::schema::avatars)]
pub struct Avatar {
    pub avatar_id: AvatarId,
    pub avatar_link: String,
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug, PartialEq, Eq, Serialize)]
#[diesel(table_name = crate::database::schema::meal_plans)]
pub struct MealPlan {
    pub meal_plan_name: String,
    pub description: String,
    pub image_link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MealPlanView {
    #[serde(flatten)]
    pub meal_plan: MealPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_by_user: Option<bool>,
}

/// Never leaves the data layer; it carries the password hash.
#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::database::schema::users)]
pub struct UserRow {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: AvatarId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar: AvatarId,
    pub preferences: Vec<Preference>,
    pub allergies: Vec<String>,
}

impl User {
    pub fn new(row: UserRow, preferences: Vec<Preference>, allergies: Vec<String>) -> Self {
        Self {
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            avatar: row.avatar,
            preferences,
            allergies,
        }
    }
}

/// Registration form contents. The password is plaintext here and hashed before it is stored.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub avatar: AvatarId,
    pub preferences: Vec<Preference>,
    pub allergies: Vec<String>,
}

#[derive(Queryable, Selectable, Clone, Debug, PartialEq, Serialize)]
#[diesel(table_name = crate::database::schema::user_comments)]
pub struct Review {
    pub comment_id: i32,
    pub user_id: UserId,
    pub recipe_name: String,
    pub rating: f64,
    pub comment: String,
    pub commented_datetime: chrono::NaiveDateTime,
}

/// A review together with what the recipe page shows about its author.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub date: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreferenceCount {
    pub preference: Preference,
    pub user_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CuisineLikes {
    pub cuisine_name: String,
    pub liked_recipe_count: i64,
}
