use crate::DbError;
use crate::repository::DbRepository;
use crate::schema;
use crate::seed::{SeedData, TableCount};
use serde::Serialize;
use sqlx::Connection;
use sqlx::postgres::PgConnection;

/// What a bootstrap wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Rows inserted per table, in creation order.
    pub tables: Vec<TableCount>,
}

impl SeedReport {
    pub fn total_rows(&self) -> i64 {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Drops, recreates and seeds the library tables.
///
/// Everything runs in one transaction: if any statement fails the
/// transaction is dropped uncommitted, PostgreSQL rolls it back, and the
/// previous tables are left as they were.
#[tracing::instrument(name = "bootstrap", skip_all)]
pub async fn bootstrap(conn: &mut PgConnection) -> Result<SeedReport, DbError> {
    let seed = SeedData::library()?;

    let mut tx = conn.begin().await?;

    schema::drop_all(&mut tx).await?;
    tracing::info!("Dropped existing library tables");

    schema::create_all(&mut tx).await?;
    tracing::info!(tables = schema::TABLES.len(), "Created library tables");

    let report = insert_seed(&mut tx, &seed).await?;
    schema::reset_sequences(&mut tx).await?;

    tx.commit().await?;
    tracing::info!(rows = report.total_rows(), "Seed data committed");

    Ok(report)
}

/// Inserts the seed rows, parents before the rows that reference them.
/// The report counts what the database says it wrote.
pub async fn insert_seed(conn: &mut PgConnection, seed: &SeedData) -> Result<SeedReport, DbError> {
    let mut repo = DbRepository::new(conn);

    let mut users = 0;
    for user in &seed.users {
        users += repo.insert_user(user).await?;
    }
    let mut books = 0;
    for book in &seed.books {
        books += repo.insert_book(book).await?;
    }
    let mut addresses = 0;
    for address in &seed.addresses {
        addresses += repo.insert_address(address).await?;
    }
    let mut checkouts = 0;
    for checkout in &seed.checkouts {
        checkouts += repo.insert_checkout(checkout).await?;
    }
    let mut reviews = 0;
    for review in &seed.reviews {
        reviews += repo.insert_review(review).await?;
    }

    let report = SeedReport {
        tables: vec![
            inserted("users", users),
            inserted("books", books),
            inserted("addresses", addresses),
            inserted("checkouts", checkouts),
            inserted("reviews", reviews),
        ],
    };
    for table in &report.tables {
        tracing::debug!(table = table.table, rows = table.rows, "Seeded table");
    }
    Ok(report)
}

fn inserted(table: &'static str, rows: u64) -> TableCount {
    TableCount {
        table,
        rows: rows as i64,
    }
}
