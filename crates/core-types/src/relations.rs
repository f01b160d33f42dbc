use crate::structs::{Address, Book, BookId, Checkout, Review, User, UserId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Lookup tables over a snapshot of the library rows.
///
/// Records only hold foreign-key integers; this index is what answers
/// "which address belongs to user 3" or "which reviews point at book 2".
/// It is built from rows already fetched and never writes back.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    user_ids: BTreeSet<UserId>,
    book_ids: BTreeSet<BookId>,
    address_by_user: BTreeMap<UserId, Address>,
    checkouts_by_user: BTreeMap<UserId, Vec<Checkout>>,
    checkouts_by_book: BTreeMap<BookId, Vec<Checkout>>,
    reviews_by_book: BTreeMap<BookId, Vec<Review>>,
    // Kept in input order so dangling references are reported deterministically.
    addresses: Vec<Address>,
    checkouts: Vec<Checkout>,
    reviews: Vec<Review>,
}

/// A foreign key that does not resolve to an existing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub table: &'static str,
    /// Primary key of the offending row.
    pub row: i32,
    pub column: &'static str,
    /// The value that has no matching parent row.
    pub missing: i32,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} row {}: {} = {} has no matching parent",
            self.table, self.row, self.column, self.missing
        )
    }
}

impl RelationIndex {
    pub fn build(
        users: &[User],
        addresses: &[Address],
        books: &[Book],
        checkouts: &[Checkout],
        reviews: &[Review],
    ) -> Self {
        let mut index = RelationIndex {
            user_ids: users.iter().map(|u| u.id).collect(),
            book_ids: books.iter().map(|b| b.id).collect(),
            addresses: addresses.to_vec(),
            checkouts: checkouts.to_vec(),
            reviews: reviews.to_vec(),
            ..Default::default()
        };

        for address in addresses {
            index.address_by_user.insert(address.user_id, address.clone());
        }
        for checkout in checkouts {
            if let Some(user_id) = checkout.user_id {
                index
                    .checkouts_by_user
                    .entry(user_id)
                    .or_default()
                    .push(checkout.clone());
            }
            if let Some(book_id) = checkout.book_id {
                index
                    .checkouts_by_book
                    .entry(book_id)
                    .or_default()
                    .push(checkout.clone());
            }
        }
        for review in reviews {
            index
                .reviews_by_book
                .entry(review.book_id)
                .or_default()
                .push(review.clone());
        }

        index
    }

    /// The user's address, if they have one. The relationship is optional.
    pub fn address_for(&self, user_id: UserId) -> Option<&Address> {
        self.address_by_user.get(&user_id)
    }

    pub fn checkouts_for_user(&self, user_id: UserId) -> &[Checkout] {
        self.checkouts_by_user
            .get(&user_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn checkouts_for_book(&self, book_id: BookId) -> &[Checkout] {
        self.checkouts_by_book
            .get(&book_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn reviews_for_book(&self, book_id: BookId) -> &[Review] {
        self.reviews_by_book
            .get(&book_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every foreign key in the snapshot that points at a missing row.
    /// Null foreign keys are allowed by the schema and are not reported.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();

        for address in &self.addresses {
            if !self.user_ids.contains(&address.user_id) {
                dangling.push(DanglingReference {
                    table: "addresses",
                    row: address.user_id,
                    column: "user_id",
                    missing: address.user_id,
                });
            }
        }

        for checkout in &self.checkouts {
            if let Some(user_id) = checkout.user_id.filter(|id| !self.user_ids.contains(id)) {
                dangling.push(DanglingReference {
                    table: "checkouts",
                    row: checkout.id,
                    column: "user_id",
                    missing: user_id,
                });
            }
            if let Some(book_id) = checkout.book_id.filter(|id| !self.book_ids.contains(id)) {
                dangling.push(DanglingReference {
                    table: "checkouts",
                    row: checkout.id,
                    column: "book_id",
                    missing: book_id,
                });
            }
        }

        for review in &self.reviews {
            if !self.book_ids.contains(&review.book_id) {
                dangling.push(DanglingReference {
                    table: "reviews",
                    row: review.id,
                    column: "book_id",
                    missing: review.book_id,
                });
            }
        }

        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_timestamp;

    fn user(id: UserId) -> User {
        User {
            id,
            full_name: Some(format!("User {id}")),
            enabled: Some(true),
            last_login: None,
        }
    }

    fn book(id: BookId) -> Book {
        Book {
            id,
            title: format!("Book {id}"),
            author: "Someone".to_string(),
            published_date: parse_timestamp("2015-10-18 14:05:44").unwrap(),
            isbn: None,
        }
    }

    fn address(user_id: UserId) -> Address {
        Address {
            user_id,
            street: "1 Market Street".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
        }
    }

    fn checkout(id: i32, user_id: Option<UserId>, book_id: Option<BookId>) -> Checkout {
        Checkout {
            id,
            user_id,
            book_id,
            checkout_date: None,
            return_date: None,
        }
    }

    fn review(id: i32, book_id: BookId) -> Review {
        Review {
            id,
            book_id,
            reviewer_name: None,
            content: None,
            rating: Some(3),
            published_date: None,
        }
    }

    fn dangling_ref(
        table: &'static str,
        row: i32,
        column: &'static str,
        missing: i32,
    ) -> DanglingReference {
        DanglingReference {
            table,
            row,
            column,
            missing,
        }
    }

    #[test]
    fn lookups_follow_foreign_keys() {
        let index = RelationIndex::build(
            &[user(1), user(2)],
            &[address(1)],
            &[book(1), book(2)],
            &[
                checkout(1, Some(1), Some(1)),
                checkout(2, Some(1), Some(2)),
                checkout(3, Some(2), Some(2)),
            ],
            &[review(1, 2), review(2, 2)],
        );

        assert_eq!(
            index.address_for(1).map(|a| a.city.as_str()),
            Some("San Francisco")
        );
        assert!(index.address_for(2).is_none());
        assert_eq!(index.checkouts_for_user(1).len(), 2);
        let book_two: Vec<i32> = index.checkouts_for_book(2).iter().map(|c| c.id).collect();
        assert_eq!(book_two, vec![2, 3]);
        assert_eq!(index.reviews_for_book(2).len(), 2);
        assert!(index.reviews_for_book(1).is_empty());
        assert!(index.dangling_references().is_empty());
    }

    #[test]
    fn reports_every_unresolved_key_in_order() {
        let index = RelationIndex::build(
            &[user(1)],
            &[address(9)],
            &[book(1)],
            &[checkout(4, Some(4), Some(7))],
            &[review(2, 3)],
        );

        let dangling = index.dangling_references();
        assert_eq!(
            dangling,
            vec![
                dangling_ref("addresses", 9, "user_id", 9),
                dangling_ref("checkouts", 4, "user_id", 4),
                dangling_ref("checkouts", 4, "book_id", 7),
                dangling_ref("reviews", 2, "book_id", 3),
            ]
        );
        assert_eq!(
            dangling[1].to_string(),
            "checkouts row 4: user_id = 4 has no matching parent"
        );
    }

    #[test]
    fn null_foreign_keys_are_not_dangling() {
        let index = RelationIndex::build(&[], &[], &[], &[checkout(1, None, None)], &[]);
        assert!(index.dangling_references().is_empty());
        assert!(index.checkouts_for_user(1).is_empty());
    }
}
