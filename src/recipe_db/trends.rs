// Copyright 2023 Remi Bernotavicius

use super::RecipeDb;
use crate::database::models::{CuisineLikes, Preference, PreferenceCount, RecipeRating};
use crate::database::{procedures, Result};

pub const TOP_RATED_LIMIT: i64 = 300;

impl RecipeDb {
    /// How many users picked each preference, including the ones nobody picked.
    pub fn get_user_count_by_preference(&mut self) -> Result<Vec<PreferenceCount>> {
        Preference::iter()
            .map(|preference| {
                Ok(PreferenceCount {
                    preference,
                    user_count: procedures::get_user_count_by_preference(
                        &mut self.conn,
                        preference,
                    )?,
                })
            })
            .collect()
    }

    pub fn get_top_rated_recipes(&mut self, limit: i64) -> Result<Vec<RecipeRating>> {
        procedures::get_top_rated_recipes(&mut self.conn, limit)
    }

    /// Number of likes the recipes of each cuisine have received.
    pub fn get_most_liked_cuisines(&mut self) -> Result<Vec<CuisineLikes>> {
        let cuisines = procedures::get_all_cuisine_names(&mut self.conn)?;
        cuisines
            .into_iter()
            .map(|cuisine| {
                let liked_recipe_count = procedures::get_liked_recipe_count_by_cuisine(
                    &mut self.conn,
                    &cuisine.cuisine_name,
                )?;
                Ok(CuisineLikes {
                    cuisine_name: cuisine.cuisine_name,
                    liked_recipe_count,
                })
            })
            .collect()
    }
}

#[cfg(test)]
use super::test_support::{register, seeded};

#[test]
fn user_count_by_preference() {
    let mut db = seeded();
    register(&mut db, "a@example.com", &[Preference::Vegan, Preference::GlutenFree]);
    register(&mut db, "b@example.com", &[Preference::Vegan]);
    register(&mut db, "c@example.com", &[]);

    let counts: Vec<_> = db
        .get_user_count_by_preference()
        .unwrap()
        .into_iter()
        .map(|c| (c.preference, c.user_count))
        .collect();
    assert_eq!(
        counts,
        [
            (Preference::Vegan, 2),
            (Preference::Vegetarian, 0),
            (Preference::Egg, 0),
            (Preference::GlutenFree, 1),
            (Preference::Meat, 0),
        ]
    );
}

#[test]
fn top_rated_recipes() {
    let mut db = seeded();
    let user = register(&mut db, "a@example.com", &[]);
    db.post_user_review(user.user_id, "Dal Tadka", "", 4.0)
        .unwrap();
    db.post_user_review(user.user_id, "Bean Tacos", "", 5.0)
        .unwrap();
    db.post_user_review(user.user_id, "Chicken Tikka", "", 4.0)
        .unwrap();

    let top = db.get_top_rated_recipes(TOP_RATED_LIMIT).unwrap();
    assert_eq!(top.len(), 6);
    assert_eq!(
        top.iter()
            .take(4)
            .map(|r| (r.recipe_name.as_str(), r.rating))
            .collect::<Vec<_>>(),
        [
            ("Bean Tacos", 5.0),
            ("Chicken Tikka", 4.0),
            ("Dal Tadka", 4.0),
            ("Chicken Pasta", 0.0),
        ]
    );

    assert_eq!(db.get_top_rated_recipes(2).unwrap().len(), 2);
}

#[test]
fn most_liked_cuisines() {
    let mut db = seeded();
    let a = register(&mut db, "a@example.com", &[]);
    let b = register(&mut db, "b@example.com", &[]);
    db.toggle_like_recipe(a.user_id, "Dal Tadka").unwrap();
    db.toggle_like_recipe(b.user_id, "Dal Tadka").unwrap();
    db.toggle_like_recipe(a.user_id, "Chicken Tikka").unwrap();
    db.toggle_like_recipe(a.user_id, "Pasta Pomodoro").unwrap();

    let counts: Vec<_> = db
        .get_most_liked_cuisines()
        .unwrap()
        .into_iter()
        .map(|c| (c.cuisine_name, c.liked_recipe_count))
        .collect();
    assert_eq!(
        counts,
        [
            ("Indian".to_owned(), 3),
            ("Italian".to_owned(), 1),
            ("Mexican".to_owned(), 0),
        ]
    );
}
