//! The panel and the db crate both target Postgres; this guard keeps
//! SQLite-isms from sneaking back into sqlx query literals.

use std::fs;
use std::path::{Path, PathBuf};

fn source_roots() -> Vec<PathBuf> {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    vec![
        manifest.join("src"),
        manifest.join("../../libs/jobradar-db/src"),
    ]
}

fn collect_rs_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

/// Pull the string literal passed to each sqlx::query* call. Handles the
/// plain `"..."` and raw `r#"..."#` forms used in this codebase.
fn sql_literals(content: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut search_from = 0;

    while let Some(rel) = content[search_from..].find("sqlx::query") {
        let call_start = search_from + rel;
        search_from = call_start + "sqlx::query".len();

        let Some(paren_rel) = content[call_start..].find('(') else {
            continue;
        };
        let after_paren = content[call_start + paren_rel + 1..].trim_start();

        if let Some(raw) = after_paren.strip_prefix("r#\"") {
            if let Some(end) = raw.find("\"#") {
                found.push(raw[..end].to_string());
            }
        } else if let Some(plain) = after_paren.strip_prefix('"') {
            if let Some(end) = plain.find('"') {
                found.push(plain[..end].to_string());
            }
        }
    }

    found
}

fn check_sources(check: impl Fn(&str) -> Option<&'static str>) -> Vec<String> {
    let mut files = Vec::new();
    for root in source_roots() {
        collect_rs_files(&root, &mut files);
    }
    assert!(!files.is_empty(), "guard found no source files to scan");

    let mut violations = Vec::new();
    for file in files {
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        for sql in sql_literals(&content) {
            if let Some(problem) = check(&sql) {
                violations.push(format!("{}: {} in {:?}", file.display(), problem, sql));
            }
        }
    }
    violations
}

#[test]
fn queries_use_postgres_placeholders() {
    let violations = check_sources(|sql| sql.contains('?').then_some("'?' placeholder"));
    assert!(
        violations.is_empty(),
        "SQLite-style placeholders found:\n{}",
        violations.join("\n")
    );
}

#[test]
fn queries_avoid_sqlite_functions() {
    let violations = check_sources(|sql| {
        let lower = sql.to_lowercase();
        if lower.contains("insert or ignore")
            || lower.contains("strftime(")
            || lower.contains("datetime(")
        {
            Some("SQLite-only syntax")
        } else {
            None
        }
    });
    assert!(
        violations.is_empty(),
        "SQLite-only SQL found:\n{}",
        violations.join("\n")
    );
}
