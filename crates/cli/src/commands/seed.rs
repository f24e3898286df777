//! Database seeding for local development.
//!
//! Creates a demo user with a known telephone/password pair and two
//! addresses (one default), so the sign-in and profile flows can be
//! exercised immediately after `et-cli migrate`.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

/// Demo credentials.
const DEMO_TELEPHONE: &str = "01500000000";
const DEMO_EMAIL: &str = "demo@easytech.example";
const DEMO_PASSWORD: &str = "Secr3t!23";

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error")]
    PasswordHash,
}

/// Seed the database with a demo user and addresses.
///
/// Idempotent: re-running replaces nothing if the demo user already exists.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SeedError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    let pool = PgPool::connect(&database_url).await?;

    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(DEMO_EMAIL)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        tracing::info!("Demo user already present, nothing to do");
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(DEMO_PASSWORD.as_bytes(), &salt)
        .map_err(|_| SeedError::PasswordHash)?
        .to_string();

    let (user_id,): (i32,) = sqlx::query_as(
        "INSERT INTO users (email, first_name, last_name, telephone, password_hash, loyalty_points, reward_points)
         VALUES ($1, 'Demo', 'User', $2, $3, 120, 40)
         RETURNING id",
    )
    .bind(DEMO_EMAIL)
    .bind(DEMO_TELEPHONE)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    sqlx::query(
        "INSERT INTO addresses (user_id, label, street, city, state, zip, country, kind, is_default)
         VALUES
           ($1, 'Home', '1 Demo Street', 'Dhaka', '', '1207', 'Bangladesh', 'home', TRUE),
           ($1, 'Office', '99 Work Avenue', 'Dhaka', '', '1212', 'Bangladesh', 'office', FALSE)",
    )
    .bind(user_id)
    .execute(&pool)
    .await?;

    tracing::info!(
        "Seeded demo user (telephone {DEMO_TELEPHONE}, password {DEMO_PASSWORD}) with 2 addresses"
    );
    Ok(())
}
