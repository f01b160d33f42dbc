use comfy_table::Table;
use database::{SeedReport, VerifyReport};

pub fn seed_table(report: &SeedReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Table", "Rows seeded"]);
    for count in &report.tables {
        table.add_row(vec![count.table.to_string(), count.rows.to_string()]);
    }
    table.add_row(vec!["total".to_string(), report.total_rows().to_string()]);
    table
}

/// The verification table followed by any row-level findings.
pub fn verify_summary(report: &VerifyReport) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Table", "Exists", "Rows", "Expected", "Issues", "Status"]);
    for check in &report.tables {
        let issues: Vec<&str> = check.issues().map(String::as_str).collect();
        table.add_row(vec![
            check.table.to_string(),
            yes_no(check.exists).to_string(),
            check.rows.to_string(),
            check.expected_rows.to_string(),
            issues.join("\n"),
            if check.is_ok() { "ok" } else { "FAIL" }.to_string(),
        ]);
    }

    let mut lines = vec![table.to_string()];
    lines.extend(report.dangling.iter().map(|r| format!("dangling: {r}")));
    lines.extend(report.value_issues.iter().map(|v| format!("value: {v}")));
    if !report.users_without_address.is_empty() {
        let ids = join_ids(&report.users_without_address);
        lines.push(format!("users without address: {ids}"));
    }
    if !report.outstanding_checkouts.is_empty() {
        let ids = join_ids(&report.outstanding_checkouts);
        lines.push(format!("outstanding checkouts: {ids}"));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn join_ids(ids: &[i32]) -> String {
    ids.iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::{SeedData, TableCheck};

    fn check(table: &'static str, rows: i64, expected_rows: i64) -> TableCheck {
        TableCheck {
            table,
            exists: true,
            column_issues: Vec::new(),
            primary_key_issues: Vec::new(),
            foreign_key_issues: Vec::new(),
            rows,
            expected_rows,
        }
    }

    #[test]
    fn seed_table_lists_every_table_and_total() {
        let report = SeedReport {
            tables: SeedData::library().unwrap().row_counts(),
        };
        let rendered = seed_table(&report).to_string();
        for name in ["users", "books", "addresses", "checkouts", "reviews", "total"] {
            assert!(rendered.contains(name), "{name} missing from\n{rendered}");
        }
        assert!(rendered.contains("17"));
    }

    #[test]
    fn verify_summary_flags_failures_and_notes() {
        let mut bad = check("checkouts", 3, 4);
        bad.foreign_key_issues
            .push("missing foreign key book_id -> books.id".to_string());
        let mut keyless = check("addresses", 3, 3);
        keyless
            .primary_key_issues
            .push("missing primary key (user_id)".to_string());
        let report = VerifyReport {
            tables: vec![check("users", 4, 4), bad, keyless],
            dangling: Vec::new(),
            value_issues: vec!["users row 1 differs".to_string()],
            users_without_address: vec![5],
            outstanding_checkouts: vec![1, 4],
        };

        let rendered = verify_summary(&report);
        assert!(rendered.contains("FAIL"));
        assert!(rendered.contains("missing foreign key book_id -> books.id"));
        assert!(rendered.contains("missing primary key (user_id)"));
        assert!(rendered.contains("value: users row 1 differs\n"));
        assert!(rendered.contains("users without address: 5\n"));
        assert!(rendered.ends_with("outstanding checkouts: 1, 4\n"));
        assert!(!rendered.contains("dangling:"));
    }
}
