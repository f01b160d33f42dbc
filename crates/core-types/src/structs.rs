use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type UserId = i32;
pub type BookId = i32;

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub full_name: Option<String>,
    pub enabled: Option<bool>,
    pub last_login: Option<NaiveDateTime>,
}

/// A row of the `addresses` table. Keyed by the owning user, so a user has
/// at most one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Address {
    pub user_id: UserId,
    pub street: String,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
}

/// A row of the `books` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub published_date: NaiveDateTime,
    pub isbn: Option<String>,
}

/// A row of the `checkouts` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Checkout {
    pub id: i32,
    pub user_id: Option<UserId>,
    pub book_id: Option<BookId>,
    pub checkout_date: Option<NaiveDateTime>,
    /// `None` while the book is still out.
    pub return_date: Option<NaiveDateTime>,
}

impl Checkout {
    /// Returns true if the book has not been returned yet.
    pub fn is_outstanding(&self) -> bool {
        self.return_date.is_none()
    }
}

/// A row of the `reviews` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i32,
    pub book_id: BookId,
    pub reviewer_name: Option<String>,
    pub content: Option<String>,
    pub rating: Option<i32>,
    /// Left as `None` on insert to let the database stamp the current time.
    pub published_date: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_timestamp;

    fn checkout(return_date: Option<&str>) -> Checkout {
        Checkout {
            id: 1,
            user_id: Some(1),
            book_id: Some(1),
            checkout_date: Some(parse_timestamp("2017-10-15 14:43:18.095143").unwrap()),
            return_date: return_date.map(|s| parse_timestamp(s).unwrap()),
        }
    }

    #[test]
    fn checkout_without_return_date_is_outstanding() {
        assert!(checkout(None).is_outstanding());
        assert!(!checkout(Some("2017-10-22 17:47:10.407569")).is_outstanding());
    }

    #[test]
    fn user_serializes_nullable_columns_as_null() {
        let user = User {
            id: 7,
            full_name: None,
            enabled: None,
            last_login: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert!(json["full_name"].is_null());
        assert!(json["last_login"].is_null());
    }
}
