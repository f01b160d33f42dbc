use chrono::NaiveDateTime;
use core_types::{Address, Book, Checkout, CoreError, Review, User, parse_timestamp};
use serde::Serialize;

/// The rows written on every bootstrap.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedData {
    pub users: Vec<User>,
    pub addresses: Vec<Address>,
    pub books: Vec<Book>,
    pub checkouts: Vec<Checkout>,
    pub reviews: Vec<Review>,
}

/// Number of rows in one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: i64,
}

fn ts(literal: &str) -> Result<NaiveDateTime, CoreError> {
    parse_timestamp(literal)
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

impl SeedData {
    /// The demonstration library: three books, four users, their addresses,
    /// checkouts and reviews.
    ///
    /// User ids run 1, 2, 3, 5. There is no user 4 and Jane Smith (5) has no
    /// address; both are part of the data set.
    pub fn library() -> Result<Self, CoreError> {
        let books = vec![
            Book {
                id: 1,
                title: "My First SQL Book".to_string(),
                author: "Mary Parker".to_string(),
                published_date: ts("2012-02-22 12:08:17.320053-03")?,
                isbn: text("981483029127"),
            },
            Book {
                id: 2,
                title: "My Second SQL Book".to_string(),
                author: "John Mayer".to_string(),
                published_date: ts("1972-07-03 09:22:45.050088-07")?,
                isbn: text("857300923713"),
            },
            Book {
                id: 3,
                title: "My Third SQL Book".to_string(),
                author: "Cary Flint".to_string(),
                published_date: ts("2015-10-18 14:05:44.547516-07")?,
                isbn: text("523120967812"),
            },
        ];

        let reviews = vec![
            Review {
                id: 1,
                book_id: 1,
                reviewer_name: text("John Smith"),
                content: text("My first review"),
                rating: Some(4),
                published_date: Some(ts("2017-12-10 05:50:11.127281-02")?),
            },
            Review {
                id: 2,
                book_id: 2,
                reviewer_name: text("John Smith"),
                content: text("My second review"),
                rating: Some(5),
                published_date: Some(ts("2017-10-13 15:05:12.673382-05")?),
            },
            Review {
                id: 3,
                book_id: 2,
                reviewer_name: text("Alice Walker"),
                content: text("Another review"),
                rating: Some(1),
                published_date: Some(ts("2017-10-22 23:47:10.407569-07")?),
            },
        ];

        let addresses = vec![
            address(1, "1 Market Street", "San Francisco", "CA"),
            address(2, "2 Elm Street", "San Francisco", "CA"),
            address(3, "3 Main Street", "Boston", "MA"),
        ];

        let users = vec![
            user(1, "John Smith", false, ts("2017-10-25 10:26:10.015152")?),
            user(2, "Alice Walker", true, ts("2017-10-25 10:26:50.295461")?),
            user(3, "Harry Potter", true, ts("2017-10-25 10:26:50.295461")?),
            user(5, "Jane Smith", true, ts("2017-10-25 10:26:43.324015")?),
        ];

        let checkouts = vec![
            checkout(1, 1, 1, ts("2017-10-15 14:43:18.095143")?, None),
            checkout(
                2,
                1,
                2,
                ts("2017-10-05 16:22:44.593188")?,
                Some(ts("2017-10-13 13:0:12.673382")?),
            ),
            checkout(
                3,
                2,
                2,
                ts("2017-10-15 11:11:24.994973")?,
                Some(ts("2017-10-22 17:47:10.407569")?),
            ),
            checkout(4, 5, 3, ts("2017-10-15 09:27:07.215217")?, None),
        ];

        Ok(Self {
            users,
            addresses,
            books,
            checkouts,
            reviews,
        })
    }

    /// Row counts per table, in creation order.
    pub fn row_counts(&self) -> Vec<TableCount> {
        let count = |table, rows: usize| TableCount {
            table,
            rows: rows as i64,
        };
        vec![
            count("users", self.users.len()),
            count("books", self.books.len()),
            count("addresses", self.addresses.len()),
            count("checkouts", self.checkouts.len()),
            count("reviews", self.reviews.len()),
        ]
    }

    pub fn expected_rows(&self, table: &str) -> Option<i64> {
        self.row_counts()
            .into_iter()
            .find(|c| c.table == table)
            .map(|c| c.rows)
    }
}

fn user(id: i32, full_name: &str, enabled: bool, last_login: NaiveDateTime) -> User {
    User {
        id,
        full_name: text(full_name),
        enabled: Some(enabled),
        last_login: Some(last_login),
    }
}

fn address(user_id: i32, street: &str, city: &str, state: &str) -> Address {
    Address {
        user_id,
        street: street.to_string(),
        city: city.to_string(),
        state: state.to_string(),
    }
}

fn checkout(
    id: i32,
    user_id: i32,
    book_id: i32,
    checkout_date: NaiveDateTime,
    return_date: Option<NaiveDateTime>,
) -> Checkout {
    Checkout {
        id,
        user_id: Some(user_id),
        book_id: Some(book_id),
        checkout_date: Some(checkout_date),
        return_date,
    }
}
