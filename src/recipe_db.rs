// Copyright 2023 Remi Bernotavicius

use crate::database::{self, Connection};
use std::path::Path;

mod recipes;
mod trends;
mod users;

pub use trends::TOP_RATED_LIMIT;

/// Answers every question the application asks of the recipe database. Each method runs one or
/// more queries on the owned connection and returns its own result.
pub struct RecipeDb {
    conn: Connection,
}

impl RecipeDb {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: impl AsRef<Path>) -> database::Result<Self> {
        Ok(Self::new(database::establish_connection(path)?))
    }

    pub fn connection(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::RecipeDb;
    use crate::database::models::{AvatarId, NewUser, Preference, User};
    use crate::import::catalog::{
        Catalog, CatalogIngredient, CatalogMealPlan, CatalogRecipe, CatalogRecipeIngredient,
        CatalogStoreLink,
    };
    use crate::import::CatalogImporter;

    fn ingredient(name: &str, category: &str) -> CatalogIngredient {
        CatalogIngredient {
            name: name.into(),
            description: format!("fresh {name}"),
            category: Some(category.into()),
            calories: None,
            store_links: vec![],
        }
    }

    fn recipe(
        name: &str,
        cuisine: &str,
        categories: &[&str],
        preparation_time: i32,
        cooking_time: i32,
        ingredients: &[(&str, &str)],
    ) -> CatalogRecipe {
        CatalogRecipe {
            name: name.into(),
            cuisine: cuisine.into(),
            description: String::new(),
            preparation_time,
            cooking_time,
            images: vec![format!("/static/{}.jpg", name.to_lowercase().replace(' ', "_"))],
            categories: categories.iter().map(|&c| c.into()).collect(),
            ingredients: ingredients
                .iter()
                .map(|&(name, quantity)| CatalogRecipeIngredient {
                    name: name.into(),
                    quantity: quantity.into(),
                })
                .collect(),
            steps: vec!["Prepare the ingredients.".into(), "Cook.".into()],
        }
    }

    pub fn catalog() -> Catalog {
        let mut tomato = ingredient("tomato", "produce");
        tomato.calories = Some(18.0);
        tomato.store_links = vec![
            CatalogStoreLink {
                store: "Market".into(),
                link: "https://market.example/tomato".into(),
            },
            CatalogStoreLink {
                store: "Grocer".into(),
                link: "https://grocer.example/tomato".into(),
            },
        ];

        let mut pomodoro = recipe(
            "Pasta Pomodoro",
            "Italian",
            &["vegan", "vegetarian"],
            10,
            20,
            &[("pasta", "200 g"), ("tomato", "3"), ("basil", "a handful")],
        );
        pomodoro.images.push("/static/pasta_pomodoro_2.jpg".into());
        pomodoro.steps = vec![
            "Boil the pasta.".into(),
            "Simmer the tomatoes.".into(),
            "Toss with basil.".into(),
        ];

        Catalog {
            cuisines: vec!["Indian".into(), "Italian".into(), "Mexican".into()],
            categories: ["vegan", "vegetarian", "egg", "gluten-free", "meat", "dessert"]
                .into_iter()
                .map(Into::into)
                .collect(),
            avatars: vec!["/static/avatars/cat.png".into(), "/static/avatars/dog.png".into()],
            ingredients: vec![
                tomato,
                ingredient("pasta", "pantry"),
                ingredient("basil", "produce"),
                ingredient("chicken", "meat"),
                ingredient("egg", "dairy"),
                ingredient("lentils", "pantry"),
                ingredient("beans", "pantry"),
                ingredient("tortilla", "bakery"),
            ],
            meal_plans: vec![
                CatalogMealPlan {
                    name: "Weeknight Vegan".into(),
                    description: "Five quick plant-based dinners".into(),
                    image_link: None,
                },
                CatalogMealPlan {
                    name: "High Protein".into(),
                    description: "Meals for training days".into(),
                    image_link: Some("/static/plans/protein.jpg".into()),
                },
            ],
            recipes: vec![
                pomodoro,
                recipe(
                    "Chicken Pasta",
                    "Italian",
                    &["meat"],
                    15,
                    45,
                    &[("pasta", "250 g"), ("chicken", "2 breasts")],
                ),
                recipe(
                    "Pasta Frittata",
                    "Italian",
                    &["vegetarian", "egg"],
                    5,
                    25,
                    &[("pasta", "100 g"), ("egg", "4")],
                ),
                recipe(
                    "Dal Tadka",
                    "Indian",
                    &["vegan", "gluten-free"],
                    10,
                    40,
                    &[("lentils", "1 cup"), ("tomato", "1")],
                ),
                recipe(
                    "Chicken Tikka",
                    "Indian",
                    &["meat", "gluten-free"],
                    30,
                    60,
                    &[("chicken", "500 g")],
                ),
                recipe(
                    "Bean Tacos",
                    "Mexican",
                    &["vegetarian"],
                    10,
                    15,
                    &[("beans", "1 can"), ("tortilla", "6")],
                ),
            ],
        }
    }

    /// In-memory database holding [`catalog`].
    pub fn seeded() -> RecipeDb {
        let mut db = RecipeDb::new(crate::database::test_connection());
        let mut importer = CatalogImporter::new(catalog());
        while !importer.done() {
            importer.import_one(db.connection()).unwrap();
        }
        db
    }

    pub fn register(db: &mut RecipeDb, email: &str, preferences: &[Preference]) -> User {
        db.add_user(&NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password: "correct horse".into(),
            avatar: AvatarId::from(1),
            preferences: preferences.to_vec(),
            allergies: vec![],
        })
        .unwrap()
    }
}
