//! # Library Core Types
//!
//! Plain record types for the five library tables, plus the small amount of
//! logic that belongs to the data itself: parsing timestamp literals and
//! resolving foreign keys at query time.
//!
//! Records carry foreign keys as plain integer fields. Anything that needs to
//! walk a relationship (a user's address, a book's reviews) builds a
//! [`RelationIndex`] over the rows it already holds.

pub mod error;
pub mod relations;
pub mod structs;
pub mod time;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use relations::{DanglingReference, RelationIndex};
pub use structs::{Address, Book, BookId, Checkout, Review, User, UserId};
pub use time::parse_timestamp;
