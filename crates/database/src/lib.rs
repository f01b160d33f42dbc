//! # Library Database Crate
//!
//! Everything that touches PostgreSQL: opening the connection, the declared
//! table catalogue, the seed rows, and the drop/create/seed cycle itself.
//!
//! ## Architectural Principles
//!
//! - **One explicit connection:** callers open a `PgConnection` with
//!   [`connect`], pass it down by `&mut`, and release it with [`close`].
//!   There is no pool and no hidden session.
//! - **Catalogue first:** [`schema::TABLES`] is the single description of the
//!   five tables. DDL is rendered from it and verification compares the live
//!   database against it.
//! - **All or nothing:** [`bootstrap`] runs inside one transaction, so a failed
//!   run leaves the previous tables untouched.
//!
//! ## Public API
//!
//! - `connect` / `close`: open and release the connection.
//! - `bootstrap`: drop, recreate and seed the tables; returns a `SeedReport`.
//! - `verify`: read-only comparison of the live database with the catalogue
//!   and seed data; returns a `VerifyReport`.
//! - `DbRepository`: the individual inserts, counts and fetches.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod bootstrap;
pub mod connection;
pub mod error;
pub mod repository;
pub mod schema;
pub mod seed;
pub mod verify;

// Re-export the key components to create a clean, public-facing API.
pub use bootstrap::{SeedReport, bootstrap};
pub use connection::{close, connect};
pub use error::DbError;
pub use repository::{DbRepository, LiveColumn, LiveForeignKey};
pub use seed::{SeedData, TableCount};
pub use verify::{TableCheck, VerifyReport, verify};
