use crate::DbError;
use crate::schema;
use core_types::{Address, Book, Checkout, Review, User};
use serde::Serialize;
use sqlx::FromRow;
use sqlx::postgres::PgConnection;

/// The `DbRepository` holds every SQL statement the seeder issues against
/// the library tables.
///
/// It borrows a connection rather than owning a pool: callers hand it either
/// a plain `PgConnection` or an open transaction (which derefs to one), and
/// get the connection back when the repository goes out of scope.
#[derive(Debug)]
pub struct DbRepository<'c> {
    conn: &'c mut PgConnection,
}

/// A column as PostgreSQL reports it in `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct LiveColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub max_length: Option<i32>,
    /// The default expression as PostgreSQL prints it back.
    pub column_default: Option<String>,
}

/// A foreign-key constraint as PostgreSQL reports it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct LiveForeignKey {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

impl<'c> DbRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Each insert returns the number of rows the statement wrote.
    pub async fn insert_user(&mut self, user: &User) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, full_name, enabled, last_login)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(user.enabled)
        .bind(user.last_login)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_address(&mut self, address: &Address) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO addresses (user_id, street, city, state)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(address.user_id)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_book(&mut self, book: &Book) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (id, title, author, published_date, isbn)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.published_date)
        .bind(&book.isbn)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_checkout(&mut self, checkout: &Checkout) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO checkouts (id, user_id, book_id, checkout_date, return_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(checkout.id)
        .bind(checkout.user_id)
        .bind(checkout.book_id)
        .bind(checkout.checkout_date)
        .bind(checkout.return_date)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Inserts a review. A missing `published_date` is stamped with the
    /// database's current local time, same as the column default.
    pub async fn insert_review(&mut self, review: &Review) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO reviews (id, book_id, reviewer_name, content, rating, published_date)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, LOCALTIMESTAMP))
            "#,
        )
        .bind(review.id)
        .bind(review.book_id)
        .bind(&review.reviewer_name)
        .bind(&review.content)
        .bind(review.rating)
        .bind(review.published_date)
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Counts the rows of one of the library tables.
    pub async fn count_rows(&mut self, table: &str) -> Result<i64, DbError> {
        let def = schema::table(table)
            .ok_or_else(|| DbError::UnknownTable(table.to_string()))?;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", def.name))
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    pub async fn fetch_users(&mut self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, full_name, enabled, last_login FROM users ORDER BY id",
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(users)
    }

    pub async fn fetch_addresses(&mut self) -> Result<Vec<Address>, DbError> {
        let addresses = sqlx::query_as::<_, Address>(
            "SELECT user_id, street, city, state FROM addresses ORDER BY user_id",
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(addresses)
    }

    pub async fn fetch_books(&mut self) -> Result<Vec<Book>, DbError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, published_date, isbn FROM books ORDER BY id",
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(books)
    }

    pub async fn fetch_checkouts(&mut self) -> Result<Vec<Checkout>, DbError> {
        let checkouts = sqlx::query_as::<_, Checkout>(
            "SELECT id, user_id, book_id, checkout_date, return_date FROM checkouts ORDER BY id",
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(checkouts)
    }

    pub async fn fetch_reviews(&mut self) -> Result<Vec<Review>, DbError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, book_id, reviewer_name, content, rating, published_date
            FROM reviews
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(reviews)
    }

    /// Columns of `table` in the current schema, in declaration order.
    /// Empty if the table does not exist.
    pub async fn table_columns(&mut self, table: &str) -> Result<Vec<LiveColumn>, DbError> {
        // information_schema uses its own domain types; cast so they decode as plain text/int.
        let columns = sqlx::query_as::<_, LiveColumn>(
            r#"
            SELECT
                column_name::text AS name,
                data_type::text AS data_type,
                (is_nullable::text = 'YES') AS nullable,
                character_maximum_length::int4 AS max_length,
                column_default::text AS column_default
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name::text = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(columns)
    }

    /// Columns of the primary key on `table`, in key order. Empty if there is none.
    pub async fn primary_key(&mut self, table: &str) -> Result<Vec<String>, DbError> {
        let columns = sqlx::query_scalar::<_, String>(
            r#"
            SELECT kcu.column_name::text
            FROM information_schema.table_constraints AS tc
            JOIN information_schema.key_column_usage AS kcu
                ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema
            WHERE tc.constraint_type = 'PRIMARY KEY'
                AND tc.table_schema = current_schema()
                AND tc.table_name::text = $1
            ORDER BY kcu.ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(columns)
    }

    /// Foreign keys declared on `table`, ordered by column.
    pub async fn foreign_keys(&mut self, table: &str) -> Result<Vec<LiveForeignKey>, DbError> {
        let keys = sqlx::query_as::<_, LiveForeignKey>(
            r#"
            SELECT
                kcu.column_name::text AS "column",
                ccu.table_name::text AS foreign_table,
                ccu.column_name::text AS foreign_column
            FROM information_schema.table_constraints AS tc
            JOIN information_schema.key_column_usage AS kcu
                ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage AS ccu
                ON tc.constraint_name = ccu.constraint_name AND tc.table_schema = ccu.table_schema
            WHERE tc.constraint_type = 'FOREIGN KEY'
                AND tc.table_schema = current_schema()
                AND tc.table_name::text = $1
            ORDER BY kcu.column_name
            "#,
        )
        .bind(table)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(keys)
    }
}
