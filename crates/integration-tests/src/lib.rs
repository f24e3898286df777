//! Integration tests for EasyTech.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and run migrations
//! cargo run -p easytech-cli -- migrate
//!
//! # Start the storefront
//! cargo run -p easytech-storefront
//!
//! # Run the (ignored-by-default) integration tests
//! cargo test -p easytech-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Base URL of the running storefront
//!   (default: <http://localhost:3000>)
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string, used by
//!   tests that read verification codes or assert invariants directly
//!   against the schema.
//!
//! # Test Categories
//!
//! - `storefront_auth` - Sign-up, verification, and sign-in flows
//! - `storefront_addresses` - Address book CRUD and the default invariant
