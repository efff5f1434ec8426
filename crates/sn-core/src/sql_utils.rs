//! SQL identifier and literal helpers
//!
//! Node names are trusted configuration and are emitted into DDL as written.
//! These helpers cover the places where a name or column must be embedded
//! as a quoted identifier or as a string literal (catalog lookups).

/// Schema assumed for unqualified names, matching PostgreSQL's default search path.
pub const DEFAULT_SCHEMA: &str = "public";

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use sn_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("updatedAt"), r#""updatedAt""#);
/// assert_eq!(quote_ident(r#"my"col"#), r#""my""col""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Split a potentially schema-qualified name into (schema, object).
///
/// Uses the first `.` as the separator. If no `.` is present, returns
/// `("public", name)`.
///
/// # Examples
/// ```
/// use sn_core::sql_utils::split_qualified_name;
/// assert_eq!(split_qualified_name("surveys"), ("public", "surveys"));
/// assert_eq!(split_qualified_name("derived.surveys"), ("derived", "surveys"));
/// ```
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    match name.find('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => (DEFAULT_SCHEMA, name),
    }
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}
