// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use diesel::prelude::Connection as _;
use diesel::RunQueryDsl as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;

pub mod models;
pub mod procedures;
pub mod schema;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Failure of a single data-access call. Every operation returns its own error, so a caller never
/// has to look anywhere else to learn whether the call it just made succeeded.
#[derive(Debug, Display)]
pub enum Error {
    #[display("not found: {_0}")]
    NotFound(String),
    #[display("conflict: {_0}")]
    Conflict(String),
    #[display("database unavailable: {_0}")]
    Unavailable(String),
    #[display("invalid input: {_0}")]
    Invalid(String),
    #[display("query failed: {_0}")]
    Query(diesel::result::Error),
    #[display("migration failed: {_0}")]
    Migration(String),
    #[display("password hashing failed: {_0}")]
    PasswordHash(String),
}

impl std::error::Error for Error {}

impl From<diesel::result::Error> for Error {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        match e {
            DieselError::NotFound => Self::NotFound("no matching row".into()),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Conflict(info.message().into())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::Invalid(info.message().into())
            }
            e => Self::Query(e),
        }
    }
}

impl From<diesel::ConnectionError> for Error {
    fn from(e: diesel::ConnectionError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn establish_connection(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let url = path
        .to_str()
        .ok_or_else(|| Error::Unavailable(format!("database path {path:?} is not UTF-8")))?;
    let mut connection = Connection::establish(url)?;

    // SQLite leaves foreign keys off unless asked, per connection
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut connection)?;

    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Migration(e.to_string()))?;
    if !applied.is_empty() {
        log::info!("applied {} migration(s) to {url}", applied.len());
    }
    Ok(connection)
}

#[cfg(test)]
pub fn test_connection() -> Connection {
    establish_connection(":memory:").unwrap()
}

#[test]
fn migrations() {
    let mut conn = test_connection();
    assert!(!conn.has_pending_migration(MIGRATIONS).unwrap());

    conn.revert_all_migrations(MIGRATIONS).unwrap();
    assert!(conn.has_pending_migration(MIGRATIONS).unwrap());

    conn.run_pending_migrations(MIGRATIONS).unwrap();
    assert!(!conn.has_pending_migration(MIGRATIONS).unwrap());
}

#[test]
fn foreign_keys_enforced() {
    use diesel::ExpressionMethods as _;
    use schema::recipes::dsl::*;

    let mut conn = test_connection();
    let result = diesel::insert_into(recipes)
        .values((
            recipe_name.eq("Orphan Stew"),
            cuisine_name.eq("Nowhere"),
            preparation_time.eq(5),
            cooking_time.eq(5),
        ))
        .execute(&mut conn);

    assert!(matches!(
        result.map_err(Error::from),
        Err(Error::Invalid(_))
    ));
}

#[test]
fn establish_unreachable_path() {
    let result = establish_connection("/nonexistent-dir/for/sure/data.sqlite");
    assert!(matches!(result, Err(Error::Unavailable(_))));
}
