// Copyright 2023 Remi Bernotavicius

use super::RecipeDb;
use crate::database::models::{
    Avatar, Ingredient, IngredientDetails, MealPlan, MealPlanView, Recipe, RecipeHandle,
    RecipeImage, RecipeIngredient, RecipePage, RecipeRow, RecipeStep, UserId,
};
use crate::database::schema::{
    avatars, meal_plans, recipe_categories, recipe_images, recipe_ingredients, recipe_instructions,
    recipes, recipes_to_categories,
};
use crate::database::{procedures, Error, Result};
use crate::formatting::convert_time;
use diesel::prelude::OptionalExtension as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;

/// Escapes LIKE wildcards so `query` only matches itself. Pairs with `.escape('\\')`.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl RecipeDb {
    fn hydrate(&mut self, handles: Vec<RecipeHandle>) -> Result<Vec<Recipe>> {
        handles
            .into_iter()
            .map(|h| self.get_recipe(&h.recipe_name))
            .collect()
    }

    pub fn get_recipe(&mut self, recipe_name: &str) -> Result<Recipe> {
        let row = recipes::table
            .find(recipe_name)
            .select(RecipeRow::as_select())
            .first(&mut self.conn)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("recipe {recipe_name:?}")))?;

        let images = recipe_images::table
            .select(RecipeImage::as_select())
            .filter(recipe_images::recipe_name.eq(recipe_name))
            .order(recipe_images::image_id)
            .load(&mut self.conn)?;

        let like_count = procedures::get_like_count_of_recipe(&mut self.conn, recipe_name)?;

        Ok(Recipe::new(row, images, like_count))
    }

    pub fn get_recipe_page_details(&mut self, recipe_name: &str) -> Result<RecipePage> {
        let recipe = self.get_recipe(recipe_name)?;

        let categories = recipes_to_categories::table
            .select(recipes_to_categories::recipe_category_name)
            .filter(recipes_to_categories::recipe_name.eq(recipe_name))
            .order(recipes_to_categories::recipe_category_name)
            .load(&mut self.conn)?;

        let ingredients = recipe_ingredients::table
            .select(RecipeIngredient::as_select())
            .filter(recipe_ingredients::recipe_name.eq(recipe_name))
            .load(&mut self.conn)?;

        let steps = recipe_instructions::table
            .select(RecipeStep::as_select())
            .filter(recipe_instructions::recipe_name.eq(recipe_name))
            .order(recipe_instructions::step_number)
            .load(&mut self.conn)?;

        let prep = recipe.preparation_time;
        let cook = recipe.cooking_time;
        Ok(RecipePage {
            recipe,
            categories,
            ingredients,
            steps,
            prep_time: convert_time(prep),
            cook_time: convert_time(cook),
            total_time: convert_time(prep + cook),
        })
    }

    /// Highest rated first, ties broken by name.
    pub fn get_top_recipes(&mut self, limit: i64) -> Result<Vec<Recipe>> {
        let handles = procedures::get_top_rated_recipes(&mut self.conn, limit)?
            .into_iter()
            .map(|r| RecipeHandle {
                recipe_name: r.recipe_name,
            })
            .collect();
        self.hydrate(handles)
    }

    pub fn get_images_of_recipes(&mut self, recipe_names: &[String]) -> Result<Vec<RecipeImage>> {
        Ok(recipe_images::table
            .select(RecipeImage::as_select())
            .filter(recipe_images::recipe_name.eq_any(recipe_names.iter().map(String::as_str)))
            .order(recipe_images::image_id)
            .load(&mut self.conn)?)
    }

    pub fn get_cuisine_names(&mut self) -> Result<Vec<String>> {
        Ok(procedures::get_all_cuisine_names(&mut self.conn)?
            .into_iter()
            .map(|c| c.cuisine_name)
            .collect())
    }

    pub fn get_all_recipe_categories(&mut self) -> Result<Vec<String>> {
        Ok(recipe_categories::table
            .select(recipe_categories::recipe_category_name)
            .order(recipe_categories::recipe_category_name)
            .load(&mut self.conn)?)
    }

    /// Recipes whose name contains `query`. With a user, only recipes matching one of their
    /// preferences are kept.
    pub fn search_recipes(&mut self, query: &str, user_id: Option<UserId>) -> Result<Vec<Recipe>> {
        let pattern = format!("%{}%", escape_like(query));
        let handles = match user_id {
            Some(user_id) => {
                procedures::search_recipe_with_user(&mut self.conn, &pattern, user_id)?
            }
            None => procedures::search_recipe_without_user(&mut self.conn, &pattern)?,
        };
        log::debug!("search {query:?} matched {} recipe(s)", handles.len());
        self.hydrate(handles)
    }

    pub fn get_recipes_by_cuisine(
        &mut self,
        cuisine_name: &str,
        user_id: Option<UserId>,
    ) -> Result<Vec<Recipe>> {
        let handles = match user_id {
            Some(user_id) => procedures::search_recipe_with_cuisine_with_user(
                &mut self.conn,
                cuisine_name,
                user_id,
            )?,
            None => {
                procedures::search_recipe_with_cuisine_without_user(&mut self.conn, cuisine_name)?
            }
        };
        self.hydrate(handles)
    }

    pub fn get_recipes_by_category(&mut self, category: &str) -> Result<Vec<Recipe>> {
        let handles = procedures::get_recipes_by_category(&mut self.conn, category)?;
        self.hydrate(handles)
    }

    pub fn get_meal_plans(&mut self, user_id: Option<UserId>) -> Result<Vec<MealPlanView>> {
        let plans: Vec<MealPlan> = meal_plans::table
            .select(MealPlan::as_select())
            .order(meal_plans::meal_plan_name)
            .load(&mut self.conn)?;

        plans
            .into_iter()
            .map(|meal_plan| -> Result<MealPlanView> {
                let liked_by_user = user_id
                    .map(|u| self.did_user_like_meal_plan(u, &meal_plan.meal_plan_name))
                    .transpose()?;
                Ok(MealPlanView {
                    meal_plan,
                    liked_by_user,
                })
            })
            .collect()
    }

    pub fn did_user_like_meal_plan(&mut self, user_id: UserId, meal_plan: &str) -> Result<bool> {
        procedures::user_favorited_mealplan(&mut self.conn, user_id, meal_plan)
    }

    pub fn did_user_liked_recipe(&mut self, user_id: UserId, recipe_name: &str) -> Result<bool> {
        procedures::user_liked_recipe(&mut self.conn, user_id, recipe_name)
    }

    pub fn get_ingredient_details(&mut self, ingredient_name: &str) -> Result<Ingredient> {
        procedures::get_ingredient(&mut self.conn, ingredient_name)
    }

    pub fn get_ingredient(&mut self, ingredient_name: &str) -> Result<IngredientDetails> {
        let ingredient = procedures::get_ingredient(&mut self.conn, ingredient_name)?;
        let store_links = procedures::get_store_links(&mut self.conn, ingredient_name)?;
        Ok(IngredientDetails {
            ingredient,
            store_links,
        })
    }

    pub fn get_all_avatars(&mut self) -> Result<Vec<Avatar>> {
        Ok(avatars::table
            .select(Avatar::as_select())
            .order(avatars::avatar_id)
            .load(&mut self.conn)?)
    }
}

#[cfg(test)]
use super::test_support::{register, seeded};
#[cfg(test)]
use crate::database::models::Preference;

#[cfg(test)]
fn names(recipes: &[Recipe]) -> Vec<&str> {
    recipes.iter().map(|r| r.recipe_name.as_str()).collect()
}

#[test]
fn get_recipe_hydrates_images_and_likes() {
    let mut db = seeded();
    let user = register(&mut db, "ada@example.com", &[]);
    db.toggle_like_recipe(user.user_id, "Pasta Pomodoro").unwrap();

    let recipe = db.get_recipe("Pasta Pomodoro").unwrap();
    assert_eq!(recipe.cuisine_name, "Italian");
    assert_eq!(recipe.rating, 0.0);
    assert_eq!(recipe.like_count, 1);
    assert_eq!(
        recipe
            .images
            .iter()
            .map(|i| i.image_link.as_str())
            .collect::<Vec<_>>(),
        ["/static/pasta_pomodoro.jpg", "/static/pasta_pomodoro_2.jpg"]
    );
}

#[test]
fn get_recipe_missing() {
    let mut db = seeded();
    assert!(matches!(
        db.get_recipe("Deep Fried Air"),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        db.get_recipe_page_details("Deep Fried Air"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn recipe_page_details() {
    let mut db = seeded();

    let page = db.get_recipe_page_details("Pasta Pomodoro").unwrap();
    assert_eq!(page.categories, ["vegan", "vegetarian"]);
    assert_eq!(page.ingredients.len(), 3);
    assert!(page.ingredients.contains(&RecipeIngredient {
        ingredient_name: "basil".into(),
        quantity: "a handful".into(),
    }));
    assert_eq!(
        page.steps
            .iter()
            .map(|s| (s.step_number, s.instruction.as_str()))
            .collect::<Vec<_>>(),
        [
            (1, "Boil the pasta."),
            (2, "Simmer the tomatoes."),
            (3, "Toss with basil."),
        ]
    );
    assert_eq!(page.prep_time, "10 mins");
    assert_eq!(page.cook_time, "20 mins");
    assert_eq!(page.total_time, "30 mins");

    let page = db.get_recipe_page_details("Chicken Tikka").unwrap();
    assert_eq!(page.prep_time, "30 mins");
    assert_eq!(page.cook_time, "1 hr");
    assert_eq!(page.total_time, "1 hr 30 mins");
}

#[test]
fn top_recipes_ordering() {
    let mut db = seeded();
    let user = register(&mut db, "ada@example.com", &[]);
    db.post_user_review(user.user_id, "Pasta Pomodoro", "great", 5.0)
        .unwrap();
    db.post_user_review(user.user_id, "Dal Tadka", "great", 5.0)
        .unwrap();
    db.post_user_review(user.user_id, "Chicken Tikka", "fine", 3.0)
        .unwrap();

    let top = db.get_top_recipes(8).unwrap();
    assert_eq!(
        names(&top),
        [
            "Dal Tadka",
            "Pasta Pomodoro",
            "Chicken Tikka",
            "Bean Tacos",
            "Chicken Pasta",
            "Pasta Frittata",
        ]
    );
    assert!(top.windows(2).all(|w| w[0].rating >= w[1].rating));

    let top = db.get_top_recipes(2).unwrap();
    assert_eq!(names(&top), ["Dal Tadka", "Pasta Pomodoro"]);

    assert!(db.get_top_recipes(0).unwrap().is_empty());
    assert!(matches!(db.get_top_recipes(-1), Err(Error::Invalid(_))));
}

#[test]
fn search_wildcards_are_literal() {
    let mut db = seeded();
    let user = register(&mut db, "vegan@example.com", &[Preference::Vegan]);

    for query in ["_", "%", "Pasta_Pomodoro", "P%a", "\\"] {
        assert!(db.search_recipes(query, None).unwrap().is_empty(), "{query:?}");
        assert!(db
            .search_recipes(query, Some(user.user_id))
            .unwrap()
            .is_empty());
    }
    assert_eq!(
        names(&db.search_recipes("a P", None).unwrap()),
        ["Pasta Pomodoro"]
    );
    assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
}

#[test]
fn search_anonymous_is_case_insensitive_substring() {
    let mut db = seeded();

    let found = db.search_recipes("pasta", None).unwrap();
    assert_eq!(
        names(&found),
        ["Chicken Pasta", "Pasta Frittata", "Pasta Pomodoro"]
    );
    assert!(db.search_recipes("lasagna", None).unwrap().is_empty());
}

#[test]
fn search_personalized_is_subset() {
    let mut db = seeded();
    let vegan = register(&mut db, "vegan@example.com", &[Preference::Vegan]);
    let eggy = register(
        &mut db,
        "eggy@example.com",
        &[Preference::Egg, Preference::Meat],
    );
    let anyone = register(&mut db, "anyone@example.com", &[]);

    let anonymous = db.search_recipes("pasta", None).unwrap();

    let found = db.search_recipes("pasta", Some(vegan.user_id)).unwrap();
    assert_eq!(names(&found), ["Pasta Pomodoro"]);

    let found = db.search_recipes("pasta", Some(eggy.user_id)).unwrap();
    assert_eq!(names(&found), ["Chicken Pasta", "Pasta Frittata"]);

    let found = db.search_recipes("pasta", Some(anyone.user_id)).unwrap();
    assert_eq!(found, anonymous);

    for user in [&vegan, &eggy, &anyone] {
        let found = db.search_recipes("pasta", Some(user.user_id)).unwrap();
        assert!(found.iter().all(|r| anonymous.contains(r)));
    }
}

#[test]
fn recipes_by_cuisine_and_category() {
    let mut db = seeded();
    let vegan = register(&mut db, "vegan@example.com", &[Preference::Vegan]);

    let indian = db.get_recipes_by_cuisine("Indian", None).unwrap();
    assert_eq!(names(&indian), ["Chicken Tikka", "Dal Tadka"]);

    let indian = db.get_recipes_by_cuisine("Indian", Some(vegan.user_id)).unwrap();
    assert_eq!(names(&indian), ["Dal Tadka"]);

    assert!(db.get_recipes_by_cuisine("French", None).unwrap().is_empty());

    let gluten_free = db.get_recipes_by_category("gluten-free").unwrap();
    assert_eq!(names(&gluten_free), ["Chicken Tikka", "Dal Tadka"]);
    assert!(db.get_recipes_by_category("dessert").unwrap().is_empty());
}

#[test]
fn lookups() {
    let mut db = seeded();

    assert_eq!(
        db.get_cuisine_names().unwrap(),
        ["Indian", "Italian", "Mexican"]
    );
    assert_eq!(db.get_all_recipe_categories().unwrap().len(), 6);
    assert_eq!(db.get_all_avatars().unwrap().len(), 2);

    let images = db
        .get_images_of_recipes(&["Dal Tadka".into(), "Bean Tacos".into()])
        .unwrap();
    assert_eq!(images.len(), 2);
    assert!(images
        .iter()
        .all(|i| i.recipe_name == "Dal Tadka" || i.recipe_name == "Bean Tacos"));
}

#[test]
fn ingredient_with_store_links() {
    let mut db = seeded();

    let tomato = db.get_ingredient("tomato").unwrap();
    assert_eq!(tomato.ingredient.calories, Some(18.0));
    assert_eq!(tomato.ingredient.category.as_deref(), Some("produce"));
    assert_eq!(
        tomato
            .store_links
            .iter()
            .map(|l| l.store_name.as_str())
            .collect::<Vec<_>>(),
        ["Market", "Grocer"]
    );

    let basil = db.get_ingredient_details("basil").unwrap();
    assert_eq!(basil.description, "fresh basil");

    assert!(matches!(
        db.get_ingredient("unobtainium"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn meal_plans_with_likes() {
    let mut db = seeded();
    let user = register(&mut db, "ada@example.com", &[]);

    let plans = db.get_meal_plans(None).unwrap();
    assert_eq!(plans.len(), 2);
    assert!(plans.iter().all(|p| p.liked_by_user.is_none()));

    assert!(db.toggle_like_meal_plan(user.user_id, "High Protein").unwrap());
    let plans = db.get_meal_plans(Some(user.user_id)).unwrap();
    assert_eq!(
        plans
            .iter()
            .map(|p| (p.meal_plan.meal_plan_name.as_str(), p.liked_by_user))
            .collect::<Vec<_>>(),
        [("High Protein", Some(true)), ("Weeknight Vegan", Some(false))]
    );
}
