//! The declared model: one [`TableDef`] per library table.
//!
//! DDL is rendered from this catalogue, drops run over it in reverse, and
//! `verify` compares the live `information_schema` against it.

use crate::error::DbError;
use sqlx::postgres::PgConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing integer key backed by a sequence.
    Serial,
    Integer,
    Boolean,
    /// Wall-clock timestamp, no time zone.
    Timestamp,
    Varchar(u32),
}

impl ColumnType {
    pub fn sql(&self) -> String {
        match self {
            ColumnType::Serial => "SERIAL".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Varchar(len) => format!("VARCHAR({len})"),
        }
    }

    /// The `data_type` PostgreSQL reports for this column in
    /// `information_schema.columns`.
    pub fn data_type(&self) -> &'static str {
        match self {
            ColumnType::Serial | ColumnType::Integer => "integer",
            ColumnType::Boolean => "boolean",
            ColumnType::Timestamp => "timestamp without time zone",
            ColumnType::Varchar(_) => "character varying",
        }
    }

    pub fn max_length(&self) -> Option<i32> {
        match self {
            ColumnType::Varchar(len) => Some(*len as i32),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub references: Option<ForeignKey>,
    /// Raw SQL default expression.
    pub default: Option<&'static str>,
}

impl ColumnDef {
    const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
            primary_key: false,
            references: None,
            default: None,
        }
    }

    const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some(ForeignKey { table, column });
        self
    }

    const fn default(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

use ColumnType::*;

pub const USERS: TableDef = TableDef {
    name: "users",
    columns: &[
        ColumnDef::new("id", Serial).primary_key(),
        ColumnDef::new("full_name", Varchar(64)),
        ColumnDef::new("enabled", Boolean),
        ColumnDef::new("last_login", Timestamp),
    ],
};

pub const BOOKS: TableDef = TableDef {
    name: "books",
    columns: &[
        ColumnDef::new("id", Serial).primary_key(),
        ColumnDef::new("title", Varchar(64)).not_null(),
        ColumnDef::new("author", Varchar(64)).not_null(),
        ColumnDef::new("published_date", Timestamp).not_null(),
        ColumnDef::new("isbn", Varchar(12)),
    ],
};

pub const ADDRESSES: TableDef = TableDef {
    name: "addresses",
    columns: &[
        ColumnDef::new("user_id", Integer).primary_key().references("users", "id"),
        ColumnDef::new("street", Varchar(64)).not_null(),
        ColumnDef::new("city", Varchar(64)).not_null(),
        ColumnDef::new("state", Varchar(2)).not_null(),
    ],
};

pub const CHECKOUTS: TableDef = TableDef {
    name: "checkouts",
    columns: &[
        ColumnDef::new("id", Serial).primary_key(),
        ColumnDef::new("user_id", Integer).references("users", "id"),
        ColumnDef::new("book_id", Integer).references("books", "id"),
        ColumnDef::new("checkout_date", Timestamp),
        ColumnDef::new("return_date", Timestamp),
    ],
};

pub const REVIEWS: TableDef = TableDef {
    name: "reviews",
    columns: &[
        ColumnDef::new("id", Serial).primary_key(),
        ColumnDef::new("book_id", Integer).not_null().references("books", "id"),
        ColumnDef::new("reviewer_name", Varchar(64)),
        ColumnDef::new("content", Varchar(64)),
        ColumnDef::new("rating", Integer),
        ColumnDef::new("published_date", Timestamp).default("LOCALTIMESTAMP"),
    ],
};

/// Every table, parents before children.
pub const TABLES: &[TableDef] = &[USERS, BOOKS, ADDRESSES, CHECKOUTS, REVIEWS];

/// Looks a table up by name.
pub fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().find(|t| t.name == name)
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&ColumnDef, ForeignKey)> {
        self.columns
            .iter()
            .filter_map(|c| c.references.map(|fk| (c, fk)))
    }

    fn serial_column(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.ty == Serial)
    }

    /// Renders the `CREATE TABLE` statement for this table.
    pub fn create_sql(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut line = format!("{} {}", c.name, c.ty.sql());
                if !c.nullable {
                    line.push_str(" NOT NULL");
                }
                if let Some(expr) = c.default {
                    line.push_str(" DEFAULT ");
                    line.push_str(expr);
                }
                line
            })
            .collect();

        let keys: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name)
            .collect();
        if !keys.is_empty() {
            lines.push(format!("PRIMARY KEY ({})", keys.join(", ")));
        }
        for (column, fk) in self.foreign_keys() {
            lines.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                column.name, fk.table, fk.column
            ));
        }

        format!("CREATE TABLE {} (\n    {}\n)", self.name, lines.join(",\n    "))
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }
}

/// The full DDL script, in creation order.
pub fn create_script() -> String {
    TABLES
        .iter()
        .map(|t| format!("{};\n", t.create_sql()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drops every library table that exists, children first.
pub async fn drop_all(conn: &mut PgConnection) -> Result<(), DbError> {
    for table in TABLES.iter().rev() {
        sqlx::query(&table.drop_sql()).execute(&mut *conn).await?;
        tracing::debug!(table = table.name, "Dropped table");
    }
    Ok(())
}

/// Creates every library table, parents first.
pub async fn create_all(conn: &mut PgConnection) -> Result<(), DbError> {
    for table in TABLES {
        sqlx::query(&table.create_sql()).execute(&mut *conn).await?;
        tracing::debug!(table = table.name, "Created table");
    }
    Ok(())
}

/// Moves each `SERIAL` sequence past the highest key present.
///
/// Seed rows carry explicit ids, which leaves the sequences at their start
/// value; without this the next insert that relies on the default would hit
/// a duplicate key.
pub async fn reset_sequences(conn: &mut PgConnection) -> Result<(), DbError> {
    for table in TABLES {
        let Some(column) = table.serial_column() else {
            continue;
        };
        let sql = format!(
            "SELECT setval(pg_get_serial_sequence('{table}', '{column}'), \
             COALESCE(MAX({column}), 1), MAX({column}) IS NOT NULL) FROM {table}",
            table = table.name,
            column = column.name,
        );
        let next: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
        tracing::debug!(table = table.name, value = next, "Sequence reset");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_in_dependency_order() {
        for (position, table) in TABLES.iter().enumerate() {
            for (_, fk) in table.foreign_keys() {
                let parent = TABLES
                    .iter()
                    .position(|t| t.name == fk.table)
                    .unwrap_or_else(|| {
                        panic!("{} references unknown table {}", table.name, fk.table)
                    });
                assert!(
                    parent < position,
                    "{} must be created after {}",
                    table.name,
                    fk.table
                );
            }
        }
    }

    #[test]
    fn every_reference_targets_a_primary_key() {
        for table in TABLES {
            for (_, fk) in table.foreign_keys() {
                let target = table_by_name(fk.table).column(fk.column).unwrap();
                assert!(target.primary_key, "{}.{} is not a key", fk.table, fk.column);
            }
        }
    }

    fn table_by_name(name: &str) -> &'static TableDef {
        table(name).unwrap()
    }

    #[test]
    fn renders_users_ddl() {
        assert_eq!(
            USERS.create_sql(),
            "CREATE TABLE users (\n    \
             id SERIAL NOT NULL,\n    \
             full_name VARCHAR(64),\n    \
             enabled BOOLEAN,\n    \
             last_login TIMESTAMP,\n    \
             PRIMARY KEY (id)\n)"
        );
    }

    #[test]
    fn renders_keys_and_defaults() {
        let sql = REVIEWS.create_sql();
        assert!(sql.contains("book_id INTEGER NOT NULL,"));
        assert!(sql.contains("published_date TIMESTAMP DEFAULT LOCALTIMESTAMP,"));
        assert!(sql.ends_with("FOREIGN KEY (book_id) REFERENCES books (id)\n)"));

        let sql = ADDRESSES.create_sql();
        assert!(sql.contains("user_id INTEGER NOT NULL,"));
        assert!(sql.contains("state VARCHAR(2) NOT NULL,"));
        assert!(sql.contains("PRIMARY KEY (user_id),"));
    }

    #[test]
    fn required_columns_match_the_model() {
        let required = |t: &TableDef| -> Vec<&str> {
            t.columns
                .iter()
                .filter(|c| !c.nullable && !c.primary_key)
                .map(|c| c.name)
                .collect()
        };
        assert_eq!(required(&ADDRESSES), vec!["street", "city", "state"]);
        assert_eq!(required(&BOOKS), vec!["title", "author", "published_date"]);
        assert_eq!(required(&REVIEWS), vec!["book_id"]);
        assert!(required(&USERS).is_empty());
        assert!(CHECKOUTS.column("return_date").unwrap().nullable);
    }

    #[test]
    fn drops_run_children_first() {
        let order: Vec<&str> = TABLES.iter().rev().map(|t| t.name).collect();
        assert_eq!(order, vec!["reviews", "checkouts", "addresses", "books", "users"]);
        assert_eq!(REVIEWS.drop_sql(), "DROP TABLE IF EXISTS reviews");
    }

    #[test]
    fn create_script_has_one_statement_per_table() {
        let script = create_script();
        assert_eq!(script.matches("CREATE TABLE").count(), TABLES.len());
        let users = script.find("CREATE TABLE users").unwrap();
        let addresses = script.find("CREATE TABLE addresses").unwrap();
        assert!(users < addresses);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(table("checkouts").map(|t| t.columns.len()), Some(5));
        assert!(table("patrons").is_none());
    }
}
