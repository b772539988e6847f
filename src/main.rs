// Copyright 2023 Remi Bernotavicius

use clap::Parser;
use clap::Subcommand;
use database::models::{AvatarId, NewUser, Preference, User};
use recipe_db::RecipeDb;
use serde::Serialize;
use std::path::PathBuf;

mod auth;
mod database;
mod formatting;
mod import;
mod recipe_db;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
type Result<T> = std::result::Result<T, Error>;

#[derive(Parser, Debug)]
#[command(about = "Browse recipes, meal plans and reviews")]
struct Args {
    /// SQLite database to use. Created and migrated if it doesn't exist.
    #[arg(long, global = true, env = "RECIPE_DB_PATH")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(clap::Args, Debug)]
struct Credentials {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

/// Signing in is optional here; when given, results are personalized.
#[derive(clap::Args, Debug)]
struct MaybeCredentials {
    #[arg(long, requires = "password")]
    email: Option<String>,
    #[arg(long, requires = "email")]
    password: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a JSON catalog of cuisines, ingredients, meal plans and recipes.
    Import { path: PathBuf },
    /// The home page selection of recipes.
    Top {
        #[arg(long, default_value_t = 8)]
        limit: i64,
    },
    Recipe {
        name: String,
        #[command(flatten)]
        credentials: MaybeCredentials,
    },
    /// Images of the given recipes.
    Images { recipes: Vec<String> },
    Search {
        query: String,
        #[command(flatten)]
        credentials: MaybeCredentials,
    },
    Cuisine {
        name: String,
        #[command(flatten)]
        credentials: MaybeCredentials,
    },
    Category { name: String },
    Cuisines,
    Categories,
    MealPlans {
        #[command(flatten)]
        credentials: MaybeCredentials,
    },
    Ingredient {
        name: String,
        /// Leave out where the ingredient can be bought.
        #[arg(long)]
        without_store_links: bool,
    },
    Avatars,
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value_t = 1)]
        avatar: i32,
        #[arg(long = "preference")]
        preferences: Vec<Preference>,
        #[arg(long = "allergy")]
        allergies: Vec<String>,
    },
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },
    LikeRecipe {
        recipe: String,
        #[command(flatten)]
        credentials: Credentials,
    },
    LikeMealPlan {
        meal_plan: String,
        #[command(flatten)]
        credentials: Credentials,
    },
    Review {
        recipe: String,
        /// From 0 to 5.
        rating: f64,
        #[arg(default_value = "")]
        comment: String,
        #[command(flatten)]
        credentials: Credentials,
    },
    DeleteReview {
        recipe: String,
        #[command(flatten)]
        credentials: Credentials,
    },
    Reviews { recipe: String },
    /// Replace the signed in user's dietary preferences.
    EditPreferences {
        #[arg(long = "preference")]
        preferences: Vec<Preference>,
        #[command(flatten)]
        credentials: Credentials,
    },
    DeleteAccount {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Aggregates behind the trends page.
    Trends,
}

#[derive(Serialize)]
struct RecipeOutput {
    #[serde(flatten)]
    page: database::models::RecipePage,
    #[serde(skip_serializing_if = "Option::is_none")]
    liked_by_user: Option<bool>,
}

#[derive(Serialize)]
struct Trends {
    user_count_by_preference: Vec<database::models::PreferenceCount>,
    top_rated_recipes: Vec<database::models::RecipeRating>,
    most_liked_cuisines: Vec<database::models::CuisineLikes>,
}

/// This is where the database and other user-data lives on-disk. On Linux it should be like:
/// `~/.local/share/recipe_browser/`
fn data_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new().ok_or("failed to get user home directory")?;
    let path = dirs.data_dir().join("recipe_browser");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

fn print(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn authenticate(db: &mut RecipeDb, credentials: &Credentials) -> Result<User> {
    Ok(db
        .get_user_by_email(&credentials.email, &credentials.password)?
        .ok_or("invalid email or password")?)
}

fn maybe_authenticate(db: &mut RecipeDb, credentials: MaybeCredentials) -> Result<Option<User>> {
    match (credentials.email, credentials.password) {
        (Some(email), Some(password)) => {
            Ok(Some(authenticate(db, &Credentials { email, password })?))
        }
        _ => Ok(None),
    }
}

fn run(db: &mut RecipeDb, command: Commands) -> Result<()> {
    match command {
        Commands::Import { path } => {
            let imported = import::import_catalog(db.connection(), path)?;
            print(&serde_json::json!({ "imported": imported }))?;
        }
        Commands::Top { limit } => print(&db.get_top_recipes(limit)?)?,
        Commands::Recipe { name, credentials } => {
            let user = maybe_authenticate(db, credentials)?;
            let page = db.get_recipe_page_details(&name)?;
            let liked_by_user = user
                .map(|u| db.did_user_liked_recipe(u.user_id, &name))
                .transpose()?;
            print(&RecipeOutput {
                page,
                liked_by_user,
            })?;
        }
        Commands::Images { recipes } => print(&db.get_images_of_recipes(&recipes)?)?,
        Commands::Search { query, credentials } => {
            let user = maybe_authenticate(db, credentials)?;
            print(&db.search_recipes(&query, user.map(|u| u.user_id))?)?;
        }
        Commands::Cuisine { name, credentials } => {
            let user = maybe_authenticate(db, credentials)?;
            print(&db.get_recipes_by_cuisine(&name, user.map(|u| u.user_id))?)?;
        }
        Commands::Category { name } => print(&db.get_recipes_by_category(&name)?)?,
        Commands::Cuisines => print(&db.get_cuisine_names()?)?,
        Commands::Categories => print(&db.get_all_recipe_categories()?)?,
        Commands::MealPlans { credentials } => {
            let user = maybe_authenticate(db, credentials)?;
            print(&db.get_meal_plans(user.map(|u| u.user_id))?)?;
        }
        Commands::Ingredient {
            name,
            without_store_links,
        } => {
            if without_store_links {
                print(&db.get_ingredient_details(&name)?)?;
            } else {
                print(&db.get_ingredient(&name)?)?;
            }
        }
        Commands::Avatars => print(&db.get_all_avatars()?)?,
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
            avatar,
            preferences,
            allergies,
        } => {
            let user = db.add_user(&NewUser {
                first_name,
                last_name,
                email,
                password,
                avatar: AvatarId::from(avatar),
                preferences,
                allergies,
            })?;
            print(&user)?;
        }
        Commands::Login { credentials } => {
            let user = authenticate(db, &credentials)?;
            let avatar_link = db.get_avatar_link(user.user_id)?;
            print(&serde_json::json!({ "user": user, "avatar_link": avatar_link }))?;
        }
        Commands::LikeRecipe {
            recipe,
            credentials,
        } => {
            let user = authenticate(db, &credentials)?;
            let liked = db.toggle_like_recipe(user.user_id, &recipe)?;
            print(&serde_json::json!({ "recipe_name": recipe, "liked": liked }))?;
        }
        Commands::LikeMealPlan {
            meal_plan,
            credentials,
        } => {
            let user = authenticate(db, &credentials)?;
            let liked = db.toggle_like_meal_plan(user.user_id, &meal_plan)?;
            print(&serde_json::json!({ "meal_plan_name": meal_plan, "liked": liked }))?;
        }
        Commands::Review {
            recipe,
            rating,
            comment,
            credentials,
        } => {
            let user = authenticate(db, &credentials)?;
            db.post_user_review(user.user_id, &recipe, &comment, rating)?;
            print(&db.get_user_review_of_recipe(user.user_id, &recipe)?)?;
        }
        Commands::DeleteReview {
            recipe,
            credentials,
        } => {
            let user = authenticate(db, &credentials)?;
            db.delete_review(user.user_id, &recipe)?;
        }
        Commands::Reviews { recipe } => print(&db.get_all_reviews_of_recipe(&recipe)?)?,
        Commands::EditPreferences {
            preferences,
            credentials,
        } => {
            let user = authenticate(db, &credentials)?;
            db.edit_preferences(user.user_id, &preferences)?;
            print(&db.get_user_preferences(user.user_id)?)?;
        }
        Commands::DeleteAccount { credentials } => {
            let user = authenticate(db, &credentials)?;
            let (first_name, last_name) = db.get_user_names(user.user_id)?;
            db.delete_user(user.user_id)?;
            print(&serde_json::json!({ "deleted": format!("{first_name} {last_name}") }))?;
        }
        Commands::Trends => print(&Trends {
            user_count_by_preference: db.get_user_count_by_preference()?,
            top_rated_recipes: db.get_top_rated_recipes(recipe_db::TOP_RATED_LIMIT)?,
            most_liked_cuisines: db.get_most_liked_cuisines()?,
        })?,
    }
    Ok(())
}

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()?;

    let args = Args::parse();
    let path = match args.database {
        Some(path) => path,
        None => data_path()?.join("data.sqlite"),
    };
    let mut db = RecipeDb::open(path)?;
    run(&mut db, args.commands)
}
