// Copyright 2023 Remi Bernotavicius

//! Named database routines. Each function keeps the argument order and result field names that
//! callers depend on; multi-statement routines run inside a transaction.

use crate::auth;
use crate::database::models::{
    AvatarId, Cuisine, Ingredient, Preference, RecipeHandle, RecipeRating, StoreLink, UserId,
    UserRow,
};
use crate::database::schema::{
    cuisines, ingredients, recipes, recipes_to_categories, store_links, user_allergies,
    user_comments, user_favorited_mealplans, user_liked_recipes, user_preferences, users,
};
use crate::database::{Connection, Error, Result};
use diesel::dsl::{avg, exists};
use diesel::expression_methods::EscapeExpressionMethods as _;
use diesel::prelude::Connection as _;
use diesel::prelude::OptionalExtension as _;
use diesel::BoolExpressionMethods as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use diesel::TextExpressionMethods as _;

pub fn get_top_rated_recipes(conn: &mut Connection, limit: i64) -> Result<Vec<RecipeRating>> {
    // SQLite reads a negative LIMIT as no limit at all
    if limit < 0 {
        return Err(Error::Invalid(format!("limit {limit} is negative")));
    }
    Ok(recipes::table
        .select(RecipeRating::as_select())
        .order((recipes::rating.desc(), recipes::recipe_name.asc()))
        .limit(limit)
        .load(conn)?)
}

pub fn get_all_cuisine_names(conn: &mut Connection) -> Result<Vec<Cuisine>> {
    Ok(cuisines::table
        .select(Cuisine::as_select())
        .order(cuisines::cuisine_name)
        .load(conn)?)
}

/// Category names equal to the user's preferences, or `None` when the user has not picked any
/// (in which case personalized listings fall back to the anonymous ones).
fn preference_tags(conn: &mut Connection, user_id: UserId) -> Result<Option<Vec<String>>> {
    let preferences = get_user_preferences(conn, user_id)?;
    if preferences.is_empty() {
        return Ok(None);
    }
    Ok(Some(preferences.iter().map(ToString::to_string).collect()))
}

pub fn search_recipe_without_user(
    conn: &mut Connection,
    pattern: &str,
) -> Result<Vec<RecipeHandle>> {
    Ok(recipes::table
        .select(RecipeHandle::as_select())
        .filter(recipes::recipe_name.like(pattern).escape('\\'))
        .order((recipes::rating.desc(), recipes::recipe_name.asc()))
        .load(conn)?)
}

pub fn search_recipe_with_user(
    conn: &mut Connection,
    pattern: &str,
    user_id: UserId,
) -> Result<Vec<RecipeHandle>> {
    let Some(tags) = preference_tags(conn, user_id)? else {
        return search_recipe_without_user(conn, pattern);
    };

    let preferred = recipes_to_categories::table
        .select(recipes_to_categories::recipe_name)
        .filter(recipes_to_categories::recipe_category_name.eq_any(tags));

    Ok(recipes::table
        .select(RecipeHandle::as_select())
        .filter(recipes::recipe_name.like(pattern).escape('\\'))
        .filter(recipes::recipe_name.eq_any(preferred))
        .order((recipes::rating.desc(), recipes::recipe_name.asc()))
        .load(conn)?)
}

pub fn search_recipe_with_cuisine_without_user(
    conn: &mut Connection,
    cuisine: &str,
) -> Result<Vec<RecipeHandle>> {
    Ok(recipes::table
        .select(RecipeHandle::as_select())
        .filter(recipes::cuisine_name.eq(cuisine))
        .order((recipes::rating.desc(), recipes::recipe_name.asc()))
        .load(conn)?)
}

pub fn search_recipe_with_cuisine_with_user(
    conn: &mut Connection,
    cuisine: &str,
    user_id: UserId,
) -> Result<Vec<RecipeHandle>> {
    let Some(tags) = preference_tags(conn, user_id)? else {
        return search_recipe_with_cuisine_without_user(conn, cuisine);
    };

    let preferred = recipes_to_categories::table
        .select(recipes_to_categories::recipe_name)
        .filter(recipes_to_categories::recipe_category_name.eq_any(tags));

    Ok(recipes::table
        .select(RecipeHandle::as_select())
        .filter(recipes::cuisine_name.eq(cuisine))
        .filter(recipes::recipe_name.eq_any(preferred))
        .order((recipes::rating.desc(), recipes::recipe_name.asc()))
        .load(conn)?)
}

pub fn get_recipes_by_category(
    conn: &mut Connection,
    category: &str,
) -> Result<Vec<RecipeHandle>> {
    Ok(recipes_to_categories::table
        .inner_join(recipes::table)
        .select(RecipeHandle::as_select())
        .filter(recipes_to_categories::recipe_category_name.eq(category))
        .order((recipes::rating.desc(), recipes::recipe_name.asc()))
        .load(conn)?)
}

/// Returns whether the meal plan is liked after the toggle.
pub fn toggle_like_meal_plan(
    conn: &mut Connection,
    user_id: UserId,
    meal_plan: &str,
) -> Result<bool> {
    use user_favorited_mealplans::dsl;

    conn.transaction::<_, Error, _>(|conn| {
        let removed = diesel::delete(
            dsl::user_favorited_mealplans.filter(
                dsl::user_id
                    .eq(user_id)
                    .and(dsl::meal_plan_name.eq(meal_plan)),
            ),
        )
        .execute(conn)?;
        if removed > 0 {
            return Ok(false);
        }

        diesel::insert_into(dsl::user_favorited_mealplans)
            .values((dsl::user_id.eq(user_id), dsl::meal_plan_name.eq(meal_plan)))
            .execute(conn)?;
        Ok(true)
    })
}

pub fn user_favorited_mealplan(
    conn: &mut Connection,
    user_id: UserId,
    meal_plan: &str,
) -> Result<bool> {
    Ok(diesel::select(exists(
        user_favorited_mealplans::table
            .filter(user_favorited_mealplans::user_id.eq(user_id))
            .filter(user_favorited_mealplans::meal_plan_name.eq(meal_plan)),
    ))
    .get_result(conn)?)
}

/// Returns whether the recipe is liked after the toggle.
pub fn toggle_like_recipe(
    conn: &mut Connection,
    user_id: UserId,
    recipe_name: &str,
) -> Result<bool> {
    use user_liked_recipes::dsl;

    conn.transaction::<_, Error, _>(|conn| {
        let removed = diesel::delete(
            dsl::user_liked_recipes.filter(
                dsl::user_id
                    .eq(user_id)
                    .and(dsl::recipe_name.eq(recipe_name)),
            ),
        )
        .execute(conn)?;
        if removed > 0 {
            return Ok(false);
        }

        diesel::insert_into(dsl::user_liked_recipes)
            .values((dsl::user_id.eq(user_id), dsl::recipe_name.eq(recipe_name)))
            .execute(conn)?;
        Ok(true)
    })
}

pub fn user_liked_recipe(
    conn: &mut Connection,
    user_id: UserId,
    recipe_name: &str,
) -> Result<bool> {
    Ok(diesel::select(exists(
        user_liked_recipes::table
            .filter(user_liked_recipes::user_id.eq(user_id))
            .filter(user_liked_recipes::recipe_name.eq(recipe_name)),
    ))
    .get_result(conn)?)
}

pub fn get_like_count_of_recipe(conn: &mut Connection, recipe_name: &str) -> Result<i64> {
    Ok(user_liked_recipes::table
        .filter(user_liked_recipes::recipe_name.eq(recipe_name))
        .count()
        .get_result(conn)?)
}

pub fn create_user(
    conn: &mut Connection,
    first_name: &str,
    last_name: &str,
    email: &str,
    password_hash: &str,
    avatar: AvatarId,
) -> Result<()> {
    diesel::insert_into(users::table)
        .values((
            users::first_name.eq(first_name),
            users::last_name.eq(last_name),
            users::email.eq(email),
            users::password_hash.eq(password_hash),
            users::avatar.eq(avatar),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn get_user_row_by_email(conn: &mut Connection, email: &str) -> Result<Option<UserRow>> {
    Ok(users::table
        .select(UserRow::as_select())
        .filter(users::email.eq(email))
        .first(conn)
        .optional()?)
}

pub fn get_user_row_by_id(conn: &mut Connection, user_id: UserId) -> Result<UserRow> {
    users::table
        .find(user_id)
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
}

/// The row for `email` if `password` verifies against the stored hash.
pub fn get_user_by_email(
    conn: &mut Connection,
    email: &str,
    password: &str,
) -> Result<Option<UserRow>> {
    let Some(row) = get_user_row_by_email(conn, email)? else {
        // costs the same as a wrong password
        auth::verify_missing_user(password);
        log::debug!("no user with email {email:?}");
        return Ok(None);
    };
    if !auth::verify_password(password, &row.password_hash) {
        log::debug!("password mismatch for user {}", row.user_id);
        return Ok(None);
    }
    Ok(Some(row))
}

pub fn add_user_preference(
    conn: &mut Connection,
    user_id: UserId,
    preference: Preference,
) -> Result<()> {
    diesel::insert_into(user_preferences::table)
        .values((
            user_preferences::user_id.eq(user_id),
            user_preferences::preference.eq(preference),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn delete_user_preferences(conn: &mut Connection, user_id: UserId) -> Result<usize> {
    Ok(
        diesel::delete(user_preferences::table.filter(user_preferences::user_id.eq(user_id)))
            .execute(conn)?,
    )
}

pub fn get_user_preferences(conn: &mut Connection, user_id: UserId) -> Result<Vec<Preference>> {
    Ok(user_preferences::table
        .select(user_preferences::preference)
        .filter(user_preferences::user_id.eq(user_id))
        .order(user_preferences::preference)
        .load(conn)?)
}

pub fn add_user_allergy(conn: &mut Connection, user_id: UserId, allergy: &str) -> Result<()> {
    diesel::insert_into(user_allergies::table)
        .values((
            user_allergies::user_id.eq(user_id),
            user_allergies::allergy.eq(allergy),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn get_user_allergies(conn: &mut Connection, user_id: UserId) -> Result<Vec<String>> {
    Ok(user_allergies::table
        .select(user_allergies::allergy)
        .filter(user_allergies::user_id.eq(user_id))
        .order(user_allergies::allergy)
        .load(conn)?)
}

/// Deletes the user; the schema cascades to everything they own. Ratings of the recipes they
/// reviewed are recomputed without their reviews.
pub fn delete_user_by_id(conn: &mut Connection, user_id: UserId) -> Result<usize> {
    conn.transaction::<_, Error, _>(|conn| {
        let reviewed: Vec<String> = user_comments::table
            .select(user_comments::recipe_name)
            .filter(user_comments::user_id.eq(user_id))
            .distinct()
            .load(conn)?;

        let deleted = diesel::delete(users::table.find(user_id)).execute(conn)?;

        for recipe_name in &reviewed {
            refresh_recipe_rating(conn, recipe_name)?;
        }
        Ok(deleted)
    })
}

pub fn get_ingredient(conn: &mut Connection, ingredient_name: &str) -> Result<Ingredient> {
    ingredients::table
        .find(ingredient_name)
        .select(Ingredient::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("ingredient {ingredient_name:?}")))
}

pub fn get_store_links(conn: &mut Connection, ingredient_name: &str) -> Result<Vec<StoreLink>> {
    Ok(store_links::table
        .select(StoreLink::as_select())
        .filter(store_links::ingredient_name.eq(ingredient_name))
        .order(store_links::link_id)
        .load(conn)?)
}

pub fn get_liked_recipe_count_by_cuisine(conn: &mut Connection, cuisine: &str) -> Result<i64> {
    Ok(user_liked_recipes::table
        .inner_join(recipes::table)
        .filter(recipes::cuisine_name.eq(cuisine))
        .count()
        .get_result(conn)?)
}

pub fn get_user_count_by_preference(conn: &mut Connection, preference: Preference) -> Result<i64> {
    Ok(user_preferences::table
        .filter(user_preferences::preference.eq(preference))
        .count()
        .get_result(conn)?)
}

/// Sets the recipe's rating to the mean of its reviews, or 0 when it has none.
fn refresh_recipe_rating(conn: &mut Connection, recipe_name: &str) -> Result<()> {
    let average: Option<f64> = user_comments::table
        .select(avg(user_comments::rating))
        .filter(user_comments::recipe_name.eq(recipe_name))
        .get_result(conn)?;

    diesel::update(recipes::table.find(recipe_name))
        .set(recipes::rating.eq(average.unwrap_or(0.0)))
        .execute(conn)?;
    Ok(())
}

pub fn rate_recipe(
    conn: &mut Connection,
    user_id: UserId,
    recipe_name: &str,
    rating: f64,
    comment: &str,
) -> Result<()> {
    conn.transaction::<_, Error, _>(|conn| {
        diesel::insert_into(user_comments::table)
            .values((
                user_comments::user_id.eq(user_id),
                user_comments::recipe_name.eq(recipe_name),
                user_comments::rating.eq(rating),
                user_comments::comment.eq(comment),
            ))
            .execute(conn)?;
        refresh_recipe_rating(conn, recipe_name)
    })
}

pub fn delete_comment(
    conn: &mut Connection,
    user_id: UserId,
    recipe_name: &str,
) -> Result<usize> {
    conn.transaction::<_, Error, _>(|conn| {
        let deleted = diesel::delete(
            user_comments::table.filter(
                user_comments::user_id
                    .eq(user_id)
                    .and(user_comments::recipe_name.eq(recipe_name)),
            ),
        )
        .execute(conn)?;
        refresh_recipe_rating(conn, recipe_name)?;
        Ok(deleted)
    })
}
