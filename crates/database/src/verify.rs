//! Read-only checks that the live database matches the declared model and
//! the seed data.

use crate::DbError;
use crate::repository::{DbRepository, LiveColumn, LiveForeignKey};
use crate::schema::{self, ColumnDef, ColumnType, TableDef};
use crate::seed::SeedData;
use core_types::{DanglingReference, RelationIndex};
use serde::Serialize;
use sqlx::postgres::PgConnection;
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCheck {
    pub table: &'static str,
    pub exists: bool,
    /// Differences between declared and live columns, defaults included.
    pub column_issues: Vec<String>,
    pub primary_key_issues: Vec<String>,
    /// Differences between declared and live foreign keys.
    pub foreign_key_issues: Vec<String>,
    pub rows: i64,
    pub expected_rows: i64,
}

impl TableCheck {
    fn missing(table: &'static str, expected_rows: i64) -> Self {
        Self {
            table,
            exists: false,
            column_issues: Vec::new(),
            primary_key_issues: Vec::new(),
            foreign_key_issues: Vec::new(),
            rows: 0,
            expected_rows,
        }
    }

    pub fn issues(&self) -> impl Iterator<Item = &String> {
        self.column_issues
            .iter()
            .chain(&self.primary_key_issues)
            .chain(&self.foreign_key_issues)
    }

    pub fn is_ok(&self) -> bool {
        self.exists && self.issues().next().is_none() && self.rows == self.expected_rows
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub tables: Vec<TableCheck>,
    pub dangling: Vec<DanglingReference>,
    /// Rows that are missing, extra, or differ from the seed data.
    pub value_issues: Vec<String>,
    /// Users with no address row. Informational; the relationship is optional.
    pub users_without_address: Vec<i32>,
    /// Checkouts whose book has not come back.
    pub outstanding_checkouts: Vec<i32>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.tables.iter().all(TableCheck::is_ok)
            && self.dangling.is_empty()
            && self.value_issues.is_empty()
    }
}

/// Compares the live database with the catalogue and the seed data.
#[tracing::instrument(name = "verify", skip_all)]
pub async fn verify(conn: &mut PgConnection) -> Result<VerifyReport, DbError> {
    let seed = SeedData::library()?;
    let mut repo = DbRepository::new(conn);
    let mut tables = Vec::with_capacity(schema::TABLES.len());

    for def in schema::TABLES {
        let live_columns = repo.table_columns(def.name).await?;
        let expected_rows = seed.expected_rows(def.name).unwrap_or(0);

        if live_columns.is_empty() {
            tracing::warn!(table = def.name, "Table is missing");
            tables.push(TableCheck::missing(def.name, expected_rows));
            continue;
        }

        let live_key = repo.primary_key(def.name).await?;
        let live_foreign_keys = repo.foreign_keys(def.name).await?;
        tables.push(TableCheck {
            table: def.name,
            exists: true,
            column_issues: compare_columns(def, &live_columns),
            primary_key_issues: compare_primary_key(def, &live_key),
            foreign_key_issues: compare_foreign_keys(def, &live_foreign_keys),
            rows: repo.count_rows(def.name).await?,
            expected_rows,
        });
    }

    // Row-level checks need every table to be there.
    if tables.iter().any(|t| !t.exists) {
        return Ok(VerifyReport {
            tables,
            dangling: Vec::new(),
            value_issues: Vec::new(),
            users_without_address: Vec::new(),
            outstanding_checkouts: Vec::new(),
        });
    }

    let live = SeedData {
        users: repo.fetch_users().await?,
        addresses: repo.fetch_addresses().await?,
        books: repo.fetch_books().await?,
        checkouts: repo.fetch_checkouts().await?,
        reviews: repo.fetch_reviews().await?,
    };

    let index = RelationIndex::build(
        &live.users,
        &live.addresses,
        &live.books,
        &live.checkouts,
        &live.reviews,
    );
    let dangling = index.dangling_references();
    for reference in &dangling {
        tracing::warn!(%reference, "Dangling foreign key");
    }

    let value_issues = compare_rows(&seed, &live);
    for issue in &value_issues {
        tracing::warn!(%issue, "Row differs from seed data");
    }

    Ok(VerifyReport {
        tables,
        dangling,
        value_issues,
        users_without_address: live
            .users
            .iter()
            .filter(|u| index.address_for(u.id).is_none())
            .map(|u| u.id)
            .collect(),
        outstanding_checkouts: live
            .checkouts
            .iter()
            .filter(|c| c.is_outstanding())
            .map(|c| c.id)
            .collect(),
    })
}

/// Lists every way the live columns differ from the declared ones.
pub fn compare_columns(def: &TableDef, live: &[LiveColumn]) -> Vec<String> {
    let mut issues = Vec::new();

    for column in def.columns {
        let Some(found) = live.iter().find(|c| c.name == column.name) else {
            issues.push(format!("missing column {}", column.name));
            continue;
        };
        if found.data_type != column.ty.data_type() {
            issues.push(format!(
                "{} is {}, expected {}",
                column.name,
                found.data_type,
                column.ty.data_type()
            ));
        }
        if found.max_length != column.ty.max_length() {
            issues.push(format!(
                "{} length is {:?}, expected {:?}",
                column.name,
                found.max_length,
                column.ty.max_length()
            ));
        }
        if found.nullable != column.nullable {
            let expected = if column.nullable { "nullable" } else { "NOT NULL" };
            issues.push(format!("{} should be {}", column.name, expected));
        }
        if !default_matches(column, found.column_default.as_deref()) {
            issues.push(format!(
                "{} default is {}, expected {}",
                column.name,
                found.column_default.as_deref().unwrap_or("none"),
                expected_default(column)
            ));
        }
    }

    for extra in live.iter().filter(|c| def.column(&c.name).is_none()) {
        issues.push(format!("unexpected column {}", extra.name));
    }

    issues
}

fn default_matches(column: &ColumnDef, live: Option<&str>) -> bool {
    match (column.ty, column.default, live) {
        (ColumnType::Serial, _, Some(expr)) => expr.starts_with("nextval("),
        (ColumnType::Serial, _, None) => false,
        (_, Some(declared), Some(expr)) => expr.eq_ignore_ascii_case(declared),
        (_, declared, live) => declared.is_none() && live.is_none(),
    }
}

fn expected_default(column: &ColumnDef) -> &'static str {
    match (column.ty, column.default) {
        (ColumnType::Serial, _) => "nextval(<sequence>)",
        (_, Some(expr)) => expr,
        (_, None) => "none",
    }
}

/// Reports a primary key that is missing or covers the wrong columns.
pub fn compare_primary_key(def: &TableDef, live: &[String]) -> Vec<String> {
    let declared: Vec<&str> = def
        .columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| c.name)
        .collect();

    if live.iter().map(String::as_str).eq(declared.iter().copied()) {
        Vec::new()
    } else if live.is_empty() {
        vec![format!("missing primary key ({})", declared.join(", "))]
    } else {
        vec![format!(
            "primary key is ({}), expected ({})",
            live.join(", "),
            declared.join(", ")
        )]
    }
}

/// Lists every declared foreign key that is missing live, and every live one
/// that was not declared.
pub fn compare_foreign_keys(def: &TableDef, live: &[LiveForeignKey]) -> Vec<String> {
    let mut issues = Vec::new();

    for (column, fk) in def.foreign_keys() {
        let present = live.iter().any(|k| {
            k.column == column.name && k.foreign_table == fk.table && k.foreign_column == fk.column
        });
        if !present {
            issues.push(format!(
                "missing foreign key {} -> {}.{}",
                column.name, fk.table, fk.column
            ));
        }
    }

    for key in live {
        let declared = def
            .column(&key.column)
            .and_then(|c| c.references)
            .is_some_and(|fk| fk.table == key.foreign_table && fk.column == key.foreign_column);
        if !declared {
            issues.push(format!(
                "unexpected foreign key {} -> {}.{}",
                key.column, key.foreign_table, key.foreign_column
            ));
        }
    }

    issues
}

/// Compares the rows read back from the database with the seed rows, table
/// by table, matching on each table's key.
pub fn compare_rows(expected: &SeedData, live: &SeedData) -> Vec<String> {
    let mut issues = Vec::new();
    issues.extend(diff_table("users", &expected.users, &live.users, |u| u.id));
    issues.extend(diff_table("books", &expected.books, &live.books, |b| b.id));
    issues.extend(diff_table(
        "addresses",
        &expected.addresses,
        &live.addresses,
        |a| a.user_id,
    ));
    issues.extend(diff_table("checkouts", &expected.checkouts, &live.checkouts, |c| c.id));
    issues.extend(diff_table("reviews", &expected.reviews, &live.reviews, |r| r.id));
    issues
}

fn diff_table<T, K>(table: &str, expected: &[T], live: &[T], key: K) -> Vec<String>
where
    T: PartialEq + Debug,
    K: Fn(&T) -> i32,
{
    let mut issues = Vec::new();

    for want in expected {
        match live.iter().find(|row| key(*row) == key(want)) {
            None => issues.push(format!("{table} row {} is missing", key(want))),
            Some(got) if got != want => issues.push(format!(
                "{table} row {} differs: found {got:?}, expected {want:?}",
                key(want)
            )),
            Some(_) => {}
        }
    }

    for got in live {
        if !expected.iter().any(|want| key(want) == key(got)) {
            issues.push(format!("{table} row {} is not in the seed data", key(got)));
        }
    }

    issues
}
