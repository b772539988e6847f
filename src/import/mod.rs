// Copyright 2023 Remi Bernotavicius

use crate::database::models::{Ingredient, MealPlan};
use crate::database::schema::{
    avatars, cuisines, ingredients, meal_plans, recipe_categories, recipe_images,
    recipe_ingredients, recipe_instructions, recipes, recipes_to_categories, store_links,
};
use crate::database::{self, Connection, Error};
use crate::Result;
use catalog::{Catalog, CatalogIngredient, CatalogMealPlan, CatalogRecipe};
use diesel::prelude::Connection as _;
use diesel::ExpressionMethods as _;
use diesel::RunQueryDsl as _;
use std::collections::VecDeque;
use std::mem;
use std::path::Path;

pub mod catalog;

const BATCH_SIZE: usize = 5;

impl Ingredient {
    fn import(ingredient: &CatalogIngredient) -> Self {
        Self {
            ingredient_name: ingredient.name.clone(),
            description: ingredient.description.clone(),
            category: ingredient
                .category
                .clone()
                .filter(|c| !c.trim().is_empty()),
            calories: ingredient.calories,
        }
    }
}

impl MealPlan {
    fn import(meal_plan: &CatalogMealPlan) -> Self {
        Self {
            meal_plan_name: meal_plan.name.clone(),
            description: meal_plan.description.clone(),
            image_link: meal_plan.image_link.clone(),
        }
    }
}

fn import_reference_data(conn: &mut Connection, catalog: &Catalog) -> database::Result<()> {
    for cuisine in &catalog.cuisines {
        diesel::insert_into(cuisines::table)
            .values(cuisines::cuisine_name.eq(cuisine))
            .execute(conn)?;
    }
    for category in &catalog.categories {
        diesel::insert_into(recipe_categories::table)
            .values(recipe_categories::recipe_category_name.eq(category))
            .execute(conn)?;
    }
    for avatar in &catalog.avatars {
        diesel::insert_into(avatars::table)
            .values(avatars::avatar_link.eq(avatar))
            .execute(conn)?;
    }

    for ingredient in &catalog.ingredients {
        let new_ingredient = Ingredient::import(ingredient);
        diesel::insert_into(ingredients::table)
            .values(&new_ingredient)
            .execute(conn)?;

        for link in &ingredient.store_links {
            diesel::insert_into(store_links::table)
                .values((
                    store_links::ingredient_name.eq(&new_ingredient.ingredient_name),
                    store_links::store_name.eq(&link.store),
                    store_links::link.eq(&link.link),
                ))
                .execute(conn)?;
        }
    }

    for meal_plan in &catalog.meal_plans {
        diesel::insert_into(meal_plans::table)
            .values(MealPlan::import(meal_plan))
            .execute(conn)?;
    }
    Ok(())
}

fn import_recipe(conn: &mut Connection, recipe: &CatalogRecipe) -> database::Result<()> {
    diesel::insert_into(recipes::table)
        .values((
            recipes::recipe_name.eq(&recipe.name),
            recipes::cuisine_name.eq(&recipe.cuisine),
            recipes::description.eq(&recipe.description),
            recipes::preparation_time.eq(recipe.preparation_time),
            recipes::cooking_time.eq(recipe.cooking_time),
        ))
        .execute(conn)?;

    for image_link in &recipe.images {
        diesel::insert_into(recipe_images::table)
            .values((
                recipe_images::recipe_name.eq(&recipe.name),
                recipe_images::image_link.eq(image_link),
            ))
            .execute(conn)?;
    }
    for category in &recipe.categories {
        diesel::insert_into(recipes_to_categories::table)
            .values((
                recipes_to_categories::recipe_name.eq(&recipe.name),
                recipes_to_categories::recipe_category_name.eq(category),
            ))
            .execute(conn)?;
    }
    for ingredient in &recipe.ingredients {
        diesel::insert_into(recipe_ingredients::table)
            .values((
                recipe_ingredients::recipe_name.eq(&recipe.name),
                recipe_ingredients::ingredient_name.eq(&ingredient.name),
                recipe_ingredients::quantity.eq(&ingredient.quantity),
            ))
            .execute(conn)?;
    }
    for (step_number, instruction) in (1..).zip(&recipe.steps) {
        diesel::insert_into(recipe_instructions::table)
            .values((
                recipe_instructions::recipe_name.eq(&recipe.name),
                recipe_instructions::step_number.eq(step_number),
                recipe_instructions::instruction.eq(instruction),
            ))
            .execute(conn)?;
    }
    Ok(())
}

/// Loads a [`Catalog`] into the database a little at a time. The first step inserts everything
/// recipes refer to; each later step inserts up to five recipes.
pub struct CatalogImporter {
    reference_data: Option<Catalog>,
    recipes: VecDeque<CatalogRecipe>,

    num_imported: usize,
    total_num_recipes: usize,
}

impl CatalogImporter {
    pub fn new(mut catalog: Catalog) -> Self {
        let recipes: VecDeque<_> = mem::take(&mut catalog.recipes).into();
        let total_num_recipes = recipes.len();
        Self {
            reference_data: Some(catalog),
            recipes,

            num_imported: 0,
            total_num_recipes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(catalog::decode_catalog_from_path(path)?))
    }

    pub fn done(&self) -> bool {
        self.reference_data.is_none() && self.recipes.is_empty()
    }

    pub fn num_imported(&self) -> usize {
        self.num_imported
    }

    pub fn percent_done(&self) -> f32 {
        if self.total_num_recipes == 0 {
            return if self.done() { 1.0 } else { 0.0 };
        }
        self.num_imported as f32 / self.total_num_recipes as f32
    }

    pub fn import_one(&mut self, conn: &mut Connection) -> database::Result<()> {
        if let Some(reference_data) = self.reference_data.take() {
            let result = conn.transaction::<_, Error, _>(|conn| {
                import_reference_data(conn, &reference_data)
            });
            if result.is_err() {
                // leave it to be retried
                self.reference_data = Some(reference_data);
            }
            return result;
        }

        // the batch stays queued until its transaction commits
        let batch_len = self.recipes.len().min(BATCH_SIZE);
        let recipes = &self.recipes;
        conn.transaction::<_, Error, _>(|conn| {
            for recipe in recipes.range(..batch_len) {
                import_recipe(conn, recipe)?;
            }
            Ok(())
        })?;

        let names: Vec<_> = self.recipes.drain(..batch_len).map(|r| r.name).collect();
        self.num_imported += names.len();
        log::debug!("imported {names:?}");

        Ok(())
    }
}

/// Imports the catalog at `path`, returning how many recipes were added.
pub fn import_catalog(conn: &mut Connection, path: impl AsRef<Path>) -> Result<usize> {
    let mut importer = CatalogImporter::from_path(path)?;

    while !importer.done() {
        importer.import_one(conn)?;
        log::info!("imported {:.0}%", importer.percent_done() * 100.0);
    }

    Ok(importer.num_imported())
}

#[cfg(test)]
use crate::recipe_db::test_support::catalog as test_catalog;

#[test]
fn import_in_batches() {
    let mut conn = database::test_connection();
    let mut catalog = test_catalog();
    let extra = catalog.recipes[0].clone();
    for i in 0..6 {
        let mut recipe = extra.clone();
        recipe.name = format!("{} {i}", extra.name);
        catalog.recipes.push(recipe);
    }
    assert_eq!(catalog.recipes.len(), 12);

    let mut importer = CatalogImporter::new(catalog);
    assert!(!importer.done());
    assert_eq!(importer.percent_done(), 0.0);

    // reference data
    importer.import_one(&mut conn).unwrap();
    assert_eq!(importer.num_imported(), 0);

    let mut progress = vec![];
    while !importer.done() {
        importer.import_one(&mut conn).unwrap();
        progress.push(importer.num_imported());
    }
    assert_eq!(progress, [5, 10, 12]);
    assert_eq!(importer.percent_done(), 1.0);

    use diesel::QueryDsl as _;
    let count: i64 = recipes::table.count().get_result(&mut conn).unwrap();
    assert_eq!(count, 12);
    let steps: i64 = recipe_instructions::table
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(steps, 3 * 7 + 2 * 5);
}

#[test]
fn import_empty_catalog() {
    let mut conn = database::test_connection();
    let mut importer = CatalogImporter::new(Catalog::default());
    importer.import_one(&mut conn).unwrap();
    assert!(importer.done());
    assert_eq!(importer.percent_done(), 1.0);
}

#[test]
fn failed_batch_leaves_nothing_behind() {
    use diesel::QueryDsl as _;

    let mut conn = database::test_connection();
    let mut catalog = test_catalog();
    catalog.recipes.truncate(2);
    catalog.recipes[1].cuisine = "Atlantean".into();

    let mut importer = CatalogImporter::new(catalog);
    importer.import_one(&mut conn).unwrap();
    assert!(matches!(
        importer.import_one(&mut conn),
        Err(Error::Invalid(_))
    ));

    let count: i64 = recipes::table.count().get_result(&mut conn).unwrap();
    assert_eq!(count, 0);
    assert_eq!(importer.num_imported(), 0);
    assert!(!importer.done());
    assert_eq!(importer.percent_done(), 0.0);

    // the same batch is attempted again
    assert!(matches!(
        importer.import_one(&mut conn),
        Err(Error::Invalid(_))
    ));
    assert!(!importer.done());
}

#[test]
fn batch_retried_after_fixing_the_database() {
    use diesel::QueryDsl as _;

    let mut conn = database::test_connection();
    let mut catalog = test_catalog();
    catalog.recipes.truncate(2);
    catalog.recipes[1].cuisine = "Atlantean".into();

    let mut importer = CatalogImporter::new(catalog);
    importer.import_one(&mut conn).unwrap();
    assert!(importer.import_one(&mut conn).is_err());

    diesel::insert_into(cuisines::table)
        .values(cuisines::cuisine_name.eq("Atlantean"))
        .execute(&mut conn)
        .unwrap();
    importer.import_one(&mut conn).unwrap();

    assert!(importer.done());
    assert_eq!(importer.num_imported(), 2);
    let count: i64 = recipes::table.count().get_result(&mut conn).unwrap();
    assert_eq!(count, 2);
}
