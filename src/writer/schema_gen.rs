//! DDL for the exported reference table.

/// Name of the exported table
pub const REFS_TABLE: &str = "refs";

/// Column name and SQL type, in insert order
pub const REFS_COLUMNS: &[(&str, &str)] = &[
    ("target_type", "TEXT NOT NULL"),
    ("target_id", "INTEGER NOT NULL"),
    ("target_name", "TEXT"),
    ("source_type", "TEXT NOT NULL"),
    ("source_id", "INTEGER NOT NULL"),
    ("source_name", "TEXT"),
    ("event_id", "INTEGER"),
    ("event_name", "TEXT"),
    ("page", "INTEGER"),
    ("line", "INTEGER"),
    ("kind", "TEXT NOT NULL"),
    ("kind_label", "TEXT NOT NULL"),
    ("sequence", "INTEGER NOT NULL"),
];

/// Generate CREATE TABLE SQL for the reference table
pub fn generate_create_table() -> String {
    let mut sql = format!("CREATE TABLE {} (\n", REFS_TABLE);
    let mut columns = vec!["    id INTEGER PRIMARY KEY".to_string()];

    for (name, sql_type) in REFS_COLUMNS {
        columns.push(format!("    {} {}", name, sql_type));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for the lookup directions
pub fn generate_indexes() -> Vec<String> {
    [
        ("target", "target_type, target_id"),
        ("source", "source_type, source_id"),
    ]
    .iter()
    .map(|(suffix, columns)| {
        format!(
            "CREATE INDEX idx_{}_{} ON {}({})",
            REFS_TABLE, suffix, REFS_TABLE, columns
        )
    })
    .collect()
}

/// `INSERT INTO refs (...) VALUES (?, ...)`
pub fn generate_insert() -> String {
    let names: Vec<&str> = REFS_COLUMNS.iter().map(|(name, _)| *name).collect();
    let placeholders: Vec<&str> = names.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        REFS_TABLE,
        names.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table();
        assert!(sql.contains("CREATE TABLE refs"));
        assert!(sql.contains("id INTEGER PRIMARY KEY"));
        assert!(sql.contains("target_type TEXT NOT NULL"));
        assert!(sql.contains("event_name TEXT"));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes();
        assert!(indexes.iter().any(|i| i.contains("idx_refs_target")));
        assert!(indexes.iter().any(|i| i.contains("(source_type, source_id)")));
    }

    #[test]
    fn test_insert_has_one_placeholder_per_column() {
        let sql = generate_insert();
        assert_eq!(sql.matches('?').count(), REFS_COLUMNS.len());
    }
}
