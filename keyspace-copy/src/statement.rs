use std::borrow::Cow;

use cdrs_tokio::query::QueryValues;
use itertools::Itertools;

use crate::args::RawPredicate;
use crate::row::Row;

// Reserved words which cannot be used as bare column identifiers.
const RESERVED_KEYWORDS: &[&str] = &[
    "add",
    "allow",
    "alter",
    "and",
    "apply",
    "asc",
    "authorize",
    "batch",
    "begin",
    "by",
    "columnfamily",
    "create",
    "delete",
    "desc",
    "describe",
    "drop",
    "entries",
    "execute",
    "from",
    "full",
    "grant",
    "if",
    "in",
    "index",
    "infinity",
    "insert",
    "into",
    "keyspace",
    "limit",
    "modify",
    "nan",
    "norecursive",
    "not",
    "null",
    "of",
    "on",
    "or",
    "order",
    "primary",
    "rename",
    "replace",
    "revoke",
    "schema",
    "select",
    "set",
    "table",
    "to",
    "token",
    "truncate",
    "unlogged",
    "update",
    "use",
    "using",
    "view",
    "where",
    "with",
];

/// Builds the source query. The predicate is inserted verbatim.
pub fn select_query(table: &str, predicate: &RawPredicate) -> String {
    format!("SELECT * FROM {table} WHERE {predicate};")
}

/// Quotes a column name unless it is a plain lower-case identifier.
pub fn quote_identifier(name: &str) -> Cow<'_, str> {
    let plain = name.starts_with(|c: char| c.is_ascii_lowercase())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !RESERVED_KEYWORDS.contains(&name);

    if plain {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("\"{}\"", name.replace('"', "\"\"")))
    }
}

/// An `INSERT` covering exactly the columns present in one row, with values bound by name.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertStatement {
    pub query: String,
    pub values: QueryValues,
}

impl InsertStatement {
    pub fn for_row(table: &str, row: Row) -> Self {
        let query = {
            let columns = row.columns().map(quote_identifier).collect_vec();
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.iter().join(","),
                columns.iter().map(|column| format!(":{column}")).join(",")
            )
        };

        InsertStatement {
            query,
            values: row.into_query_values(),
        }
    }
}
