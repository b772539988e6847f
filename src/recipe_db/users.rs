// Copyright 2023 Remi Bernotavicius

use super::RecipeDb;
use crate::auth;
use crate::database::models::{NewUser, Preference, Review, ReviewView, User, UserId};
use crate::database::schema::{avatars, user_comments, users};
use crate::database::{procedures, Connection, Error, Result};
use crate::formatting::format_date;
use diesel::prelude::Connection as _;
use diesel::prelude::OptionalExtension as _;
use diesel::ExpressionMethods as _;
use diesel::JoinOnDsl as _;
use diesel::NullableExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use std::collections::BTreeSet;

const MAX_RATING: f64 = 5.0;

fn load_user(conn: &mut Connection, user_id: UserId) -> Result<User> {
    let row = procedures::get_user_row_by_id(conn, user_id)?;
    let preferences = procedures::get_user_preferences(conn, user_id)?;
    let allergies = procedures::get_user_allergies(conn, user_id)?;
    Ok(User::new(row, preferences, allergies))
}

impl RecipeDb {
    /// Creates the account along with its preferences and allergies. Either all of it is stored or
    /// none of it is.
    pub fn add_user(&mut self, user: &NewUser) -> Result<User> {
        if user.email.trim().is_empty() {
            return Err(Error::Invalid("email must not be empty".into()));
        }
        if user.password.is_empty() {
            return Err(Error::Invalid("password must not be empty".into()));
        }
        let password_hash = auth::hash_password(&user.password)?;

        let created = self.conn.transaction::<_, Error, _>(|conn| {
            procedures::create_user(
                conn,
                &user.first_name,
                &user.last_name,
                &user.email,
                &password_hash,
                user.avatar,
            )?;
            let row = procedures::get_user_row_by_email(conn, &user.email)?
                .ok_or_else(|| Error::NotFound(format!("user {:?}", user.email)))?;

            for preference in user.preferences.iter().collect::<BTreeSet<_>>() {
                procedures::add_user_preference(conn, row.user_id, *preference)?;
            }
            for allergy in user.allergies.iter().collect::<BTreeSet<_>>() {
                procedures::add_user_allergy(conn, row.user_id, allergy)?;
            }
            load_user(conn, row.user_id)
        })?;

        log::info!("created user {} <{}>", created.user_id, created.email);
        Ok(created)
    }

    /// The user with these credentials, or `None` when the email is unknown or the password is
    /// wrong.
    pub fn get_user_by_email(&mut self, email: &str, password: &str) -> Result<Option<User>> {
        match procedures::get_user_by_email(&mut self.conn, email, password)? {
            Some(row) => Ok(Some(load_user(&mut self.conn, row.user_id)?)),
            None => Ok(None),
        }
    }

    pub fn get_user_preferences(&mut self, user_id: UserId) -> Result<Vec<Preference>> {
        procedures::get_user_preferences(&mut self.conn, user_id)
    }

    /// Replaces the user's preferences with the distinct members of `preferences`.
    pub fn edit_preferences(&mut self, user_id: UserId, preferences: &[Preference]) -> Result<()> {
        self.conn.transaction::<_, Error, _>(|conn| {
            procedures::delete_user_preferences(conn, user_id)?;
            for preference in preferences.iter().collect::<BTreeSet<_>>() {
                procedures::add_user_preference(conn, user_id, *preference)?;
            }
            Ok(())
        })?;
        log::info!("replaced preferences of user {user_id}");
        Ok(())
    }

    pub fn delete_user(&mut self, user_id: UserId) -> Result<()> {
        if procedures::delete_user_by_id(&mut self.conn, user_id)? == 0 {
            return Err(Error::NotFound(format!("user {user_id}")));
        }
        log::info!("deleted user {user_id}");
        Ok(())
    }

    /// Returns whether the user likes the recipe afterwards.
    pub fn toggle_like_recipe(&mut self, user_id: UserId, recipe_name: &str) -> Result<bool> {
        procedures::toggle_like_recipe(&mut self.conn, user_id, recipe_name)
    }

    /// Returns whether the user likes the meal plan afterwards.
    pub fn toggle_like_meal_plan(&mut self, user_id: UserId, meal_plan: &str) -> Result<bool> {
        procedures::toggle_like_meal_plan(&mut self.conn, user_id, meal_plan)
    }

    pub fn post_user_review(
        &mut self,
        user_id: UserId,
        recipe_name: &str,
        comment: &str,
        rating: f64,
    ) -> Result<()> {
        if !(0.0..=MAX_RATING).contains(&rating) {
            return Err(Error::Invalid(format!(
                "rating {rating} is outside 0 to {MAX_RATING}"
            )));
        }
        procedures::rate_recipe(&mut self.conn, user_id, recipe_name, rating, comment)?;
        log::info!("user {user_id} rated {recipe_name:?} {rating}");
        Ok(())
    }

    pub fn delete_review(&mut self, user_id: UserId, recipe_name: &str) -> Result<()> {
        if procedures::delete_comment(&mut self.conn, user_id, recipe_name)? == 0 {
            return Err(Error::NotFound(format!(
                "review of {recipe_name:?} by user {user_id}"
            )));
        }
        Ok(())
    }

    pub fn get_user_review_of_recipe(
        &mut self,
        user_id: UserId,
        recipe_name: &str,
    ) -> Result<Vec<Review>> {
        Ok(user_comments::table
            .select(Review::as_select())
            .filter(user_comments::user_id.eq(user_id))
            .filter(user_comments::recipe_name.eq(recipe_name))
            .order(user_comments::comment_id)
            .load(&mut self.conn)?)
    }

    /// Newest first, each with its author and a relative date computed against one reading of the
    /// database clock.
    pub fn get_all_reviews_of_recipe(&mut self, recipe_name: &str) -> Result<Vec<ReviewView>> {
        let now: chrono::NaiveDateTime =
            diesel::select(diesel::dsl::now).get_result(&mut self.conn)?;

        let rows: Vec<(Review, String, String, Option<String>)> = user_comments::table
            .inner_join(users::table)
            .left_join(avatars::table.on(avatars::avatar_id.eq(users::avatar)))
            .select((
                Review::as_select(),
                users::first_name,
                users::last_name,
                avatars::avatar_link.nullable(),
            ))
            .filter(user_comments::recipe_name.eq(recipe_name))
            .order((
                user_comments::commented_datetime.desc(),
                user_comments::comment_id.desc(),
            ))
            .load(&mut self.conn)?;

        Ok(rows
            .into_iter()
            .map(|(review, first_name, last_name, avatar)| ReviewView {
                date: format_date(review.commented_datetime, now),
                review,
                first_name,
                last_name,
                avatar,
            })
            .collect())
    }

    pub fn get_user_names(&mut self, user_id: UserId) -> Result<(String, String)> {
        users::table
            .find(user_id)
            .select((users::first_name, users::last_name))
            .first(&mut self.conn)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
    }

    pub fn get_avatar_link(&mut self, user_id: UserId) -> Result<String> {
        users::table
            .inner_join(avatars::table)
            .filter(users::user_id.eq(user_id))
            .select(avatars::avatar_link)
            .first(&mut self.conn)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("avatar of user {user_id}")))
    }
}

#[cfg(test)]
use super::test_support::{register, seeded};
#[cfg(test)]
use crate::database::models::AvatarId;
#[cfg(test)]
use maplit::btreeset;

#[cfg(test)]
fn new_user(email: &str, preferences: Vec<Preference>) -> NewUser {
    NewUser {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        email: email.into(),
        password: "cobol4ever".into(),
        avatar: AvatarId::from(2),
        preferences,
        allergies: vec!["peanuts".into(), "shellfish".into(), "peanuts".into()],
    }
}

#[test]
fn add_user_then_log_in() {
    let mut db = seeded();
    let created = db
        .add_user(&new_user(
            "grace@example.com",
            vec![Preference::Vegan, Preference::GlutenFree, Preference::Vegan],
        ))
        .unwrap();

    let user = db
        .get_user_by_email("grace@example.com", "cobol4ever")
        .unwrap()
        .unwrap();
    assert_eq!(user, created);
    assert_eq!(
        user.preferences.iter().copied().collect::<BTreeSet<_>>(),
        btreeset! {Preference::Vegan, Preference::GlutenFree}
    );
    assert_eq!(user.preferences.len(), 2);
    assert_eq!(user.allergies, ["peanuts", "shellfish"]);
    assert_eq!(user.avatar, AvatarId::from(2));

    assert_eq!(
        db.get_user_names(user.user_id).unwrap(),
        ("Grace".to_owned(), "Hopper".to_owned())
    );
    assert_eq!(
        db.get_avatar_link(user.user_id).unwrap(),
        "/static/avatars/dog.png"
    );
}

#[test]
fn wrong_credentials() {
    let mut db = seeded();
    db.add_user(&new_user("grace@example.com", vec![])).unwrap();

    assert_eq!(
        db.get_user_by_email("grace@example.com", "COBOL4EVER")
            .unwrap(),
        None
    );
    assert_eq!(
        db.get_user_by_email("nobody@example.com", "cobol4ever")
            .unwrap(),
        None
    );
}

#[test]
fn add_user_rejects_duplicates_and_bad_input() {
    let mut db = seeded();
    db.add_user(&new_user("grace@example.com", vec![])).unwrap();

    assert!(matches!(
        db.add_user(&new_user("grace@example.com", vec![Preference::Meat])),
        Err(Error::Conflict(_))
    ));

    let mut blank = new_user("  ", vec![]);
    assert!(matches!(db.add_user(&blank), Err(Error::Invalid(_))));
    blank.email = "blank@example.com".into();
    blank.password = String::new();
    assert!(matches!(db.add_user(&blank), Err(Error::Invalid(_))));
}

#[test]
fn add_user_is_atomic() {
    let mut db = seeded();
    let mut user = new_user("grace@example.com", vec![Preference::Egg]);
    user.avatar = AvatarId::from(99);

    assert!(db.add_user(&user).is_err());
    user.avatar = AvatarId::from(1);
    // nothing from the failed attempt is left behind to conflict with
    let created = db.add_user(&user).unwrap();
    assert_eq!(created.preferences, [Preference::Egg]);
}

#[test]
fn edit_preferences_replaces() {
    let mut db = seeded();
    let user = register(&mut db, "ada@example.com", &[Preference::Vegan, Preference::Egg]);

    db.edit_preferences(
        user.user_id,
        &[Preference::Meat, Preference::Vegetarian, Preference::Meat],
    )
    .unwrap();
    assert_eq!(
        db.get_user_preferences(user.user_id)
            .unwrap()
            .into_iter()
            .collect::<BTreeSet<_>>(),
        btreeset! {Preference::Meat, Preference::Vegetarian}
    );
    assert_eq!(db.get_user_preferences(user.user_id).unwrap().len(), 2);

    db.edit_preferences(user.user_id, &[]).unwrap();
    assert!(db.get_user_preferences(user.user_id).unwrap().is_empty());
}

#[test]
fn toggles_are_involutions() {
    let mut db = seeded();
    let user = register(&mut db, "ada@example.com", &[]);

    assert!(!db.did_user_liked_recipe(user.user_id, "Dal Tadka").unwrap());
    assert!(db.toggle_like_recipe(user.user_id, "Dal Tadka").unwrap());
    assert!(db.did_user_liked_recipe(user.user_id, "Dal Tadka").unwrap());
    assert!(!db.toggle_like_recipe(user.user_id, "Dal Tadka").unwrap());
    assert!(!db.did_user_liked_recipe(user.user_id, "Dal Tadka").unwrap());

    assert!(!db.did_user_like_meal_plan(user.user_id, "Weeknight Vegan").unwrap());
    assert!(db.toggle_like_meal_plan(user.user_id, "Weeknight Vegan").unwrap());
    assert!(!db.toggle_like_meal_plan(user.user_id, "Weeknight Vegan").unwrap());
    assert!(!db.did_user_like_meal_plan(user.user_id, "Weeknight Vegan").unwrap());

    assert!(matches!(
        db.toggle_like_recipe(user.user_id, "Deep Fried Air"),
        Err(Error::Invalid(_))
    ));
}

#[test]
fn reviews_maintain_rating() {
    let mut db = seeded();
    let ada = register(&mut db, "ada@example.com", &[]);
    let bob = register(&mut db, "bob@example.com", &[]);

    db.post_user_review(ada.user_id, "Bean Tacos", "crunchy", 4.0)
        .unwrap();
    db.post_user_review(bob.user_id, "Bean Tacos", "perfect", 5.0)
        .unwrap();
    assert_eq!(db.get_recipe("Bean Tacos").unwrap().rating, 4.5);

    let mine = db.get_user_review_of_recipe(ada.user_id, "Bean Tacos").unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].comment, "crunchy");

    db.delete_review(bob.user_id, "Bean Tacos").unwrap();
    assert_eq!(db.get_recipe("Bean Tacos").unwrap().rating, 4.0);

    db.delete_review(ada.user_id, "Bean Tacos").unwrap();
    assert_eq!(db.get_recipe("Bean Tacos").unwrap().rating, 0.0);

    assert!(matches!(
        db.delete_review(ada.user_id, "Bean Tacos"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn review_validation() {
    let mut db = seeded();
    let user = register(&mut db, "ada@example.com", &[]);

    for rating in [-0.5, 5.5, f64::NAN] {
        assert!(matches!(
            db.post_user_review(user.user_id, "Bean Tacos", "?", rating),
            Err(Error::Invalid(_))
        ));
    }
    assert!(matches!(
        db.post_user_review(user.user_id, "Deep Fried Air", "?", 3.0),
        Err(Error::Invalid(_))
    ));
    assert_eq!(db.get_recipe("Bean Tacos").unwrap().rating, 0.0);
}

#[test]
fn all_reviews_of_recipe() {
    let mut db = seeded();
    let ada = register(&mut db, "ada@example.com", &[]);
    let grace = db
        .add_user(&new_user("grace@example.com", vec![]))
        .unwrap();

    db.post_user_review(ada.user_id, "Dal Tadka", "first", 4.0)
        .unwrap();
    db.post_user_review(grace.user_id, "Dal Tadka", "second", 2.0)
        .unwrap();

    let reviews = db.get_all_reviews_of_recipe("Dal Tadka").unwrap();
    assert_eq!(
        reviews
            .iter()
            .map(|r| (
                r.review.comment.as_str(),
                r.first_name.as_str(),
                r.avatar.as_deref()
            ))
            .collect::<Vec<_>>(),
        [
            ("second", "Grace", Some("/static/avatars/dog.png")),
            ("first", "Ada", Some("/static/avatars/cat.png")),
        ]
    );
    assert!(reviews.iter().all(|r| r.date.ends_with(" ago")));

    assert!(db.get_all_reviews_of_recipe("Bean Tacos").unwrap().is_empty());
}

#[test]
fn delete_user_cascades() {
    let mut db = seeded();
    let ada = register(&mut db, "ada@example.com", &[Preference::Vegan]);
    let bob = register(&mut db, "bob@example.com", &[]);

    db.toggle_like_recipe(ada.user_id, "Dal Tadka").unwrap();
    db.toggle_like_meal_plan(ada.user_id, "High Protein").unwrap();
    db.post_user_review(ada.user_id, "Dal Tadka", "lovely", 5.0)
        .unwrap();
    db.post_user_review(bob.user_id, "Dal Tadka", "meh", 3.0)
        .unwrap();
    assert_eq!(db.get_recipe("Dal Tadka").unwrap().rating, 4.0);

    db.delete_user(ada.user_id).unwrap();

    let dal = db.get_recipe("Dal Tadka").unwrap();
    assert_eq!(dal.like_count, 0);
    assert_eq!(dal.rating, 3.0);
    assert_eq!(db.get_all_reviews_of_recipe("Dal Tadka").unwrap().len(), 1);
    assert!(db.get_user_preferences(ada.user_id).unwrap().is_empty());
    assert!(matches!(
        db.get_user_names(ada.user_id),
        Err(Error::NotFound(_))
    ));
    assert_eq!(
        db.get_user_by_email("ada@example.com", "correct horse")
            .unwrap(),
        None
    );
    assert!(matches!(
        db.delete_user(ada.user_id),
        Err(Error::NotFound(_))
    ));
}
