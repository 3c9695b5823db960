//! Catalog introspection.
//!
//! Reads a routine's definition from `pg_proc` and friends into a
//! [`FunctionRecord`]. Only plain functions are considered: aggregates,
//! window functions and procedures are filtered out by `prokind`.

use fnsync_sql::{QualifiedName, Volatility, quote_ident};
use tokio_postgres::Row;

use crate::error::describe;
use crate::{Connection, ConnectionExt, Error, FunctionCatalog, FunctionRecord, Result};

/// One row per overload of `$1` in schema `$2`.
///
/// `$2` is a quoted identifier resolved through `regnamespace`, so a schema
/// that does not exist is an error rather than an empty result.
const FUNCTION_QUERY: &str = "\
SELECT r.rolname,
       pg_catalog.pg_get_function_arguments(p.oid),
       l.lanname,
       pg_catalog.format_type(t.oid, NULL),
       p.provolatile::text,
       p.proisstrict,
       p.prosecdef,
       p.prosrc
FROM pg_catalog.pg_proc AS p
JOIN pg_catalog.pg_language AS l ON l.oid = p.prolang
JOIN pg_catalog.pg_type AS t ON t.oid = p.prorettype
JOIN pg_catalog.pg_roles AS r ON r.oid = p.proowner
WHERE p.prokind = 'f'
  AND p.proname = $1
  AND p.pronamespace = $2::text::regnamespace::oid
ORDER BY p.oid";

/// Fetch every overload of `name`.
pub async fn candidates<C: Connection>(conn: &C, name: &QualifiedName) -> Result<Vec<FunctionRecord>> {
    let schema = quote_ident(name.schema());
    let rows = conn
        .traced()
        .query(FUNCTION_QUERY, &[&name.name(), &schema])
        .await
        .map_err(|e| inspection_error(name, describe(&e)))?;

    rows.iter().map(|row| record_from_row(name, row)).collect()
}

/// Look up `name` expecting at most one routine.
///
/// More than one overload under the same name is an [`Error::Inspection`]:
/// a bare name cannot tell them apart.
pub async fn inspect<C: FunctionCatalog + ?Sized>(
    catalog: &C,
    name: &QualifiedName,
) -> Result<Option<FunctionRecord>> {
    single(name, catalog.candidates(name).await?)
}

/// At most one record, or an ambiguity error.
pub(crate) fn single(name: &QualifiedName, mut rows: Vec<FunctionRecord>) -> Result<Option<FunctionRecord>> {
    match rows.len() {
        0 | 1 => Ok(rows.pop()),
        n => Err(inspection_error(
            name,
            format!("{n} overloads share this name; a bare name cannot tell them apart"),
        )),
    }
}

/// Pick the overload whose argument text equals `arguments`.
///
/// Without an exact match the oldest overload stands in for the family, so
/// the diff sees an existing routine with a different signature and reports
/// that a new overload is about to be created. This holds whether one or
/// several overloads already exist.
pub(crate) fn select_overload(
    mut rows: Vec<FunctionRecord>,
    arguments: &str,
) -> Option<FunctionRecord> {
    match rows.iter().position(|r| r.arguments == arguments) {
        Some(i) => Some(rows.swap_remove(i)),
        None if rows.is_empty() => None,
        None => Some(rows.swap_remove(0)),
    }
}

fn inspection_error(name: &QualifiedName, message: String) -> Error {
    Error::Inspection {
        function: name.to_string(),
        message,
    }
}

fn record_from_row(name: &QualifiedName, row: &Row) -> Result<FunctionRecord> {
    let column = |e: tokio_postgres::Error| inspection_error(name, describe(&e));

    let code: String = row.try_get(4).map_err(column)?;
    let volatility = Volatility::from_code(&code)
        .ok_or_else(|| inspection_error(name, format!("unknown volatility code '{code}'")))?;

    Ok(FunctionRecord {
        name: name.clone(),
        owner: Some(row.try_get(0).map_err(column)?),
        arguments: row.try_get(1).map_err(column)?,
        language: row.try_get(2).map_err(column)?,
        return_type: row.try_get(3).map_err(column)?,
        volatility,
        strict: row.try_get(5).map_err(column)?,
        security_definer: row.try_get(6).map_err(column)?,
        source: row.try_get(7).map_err(column)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(arguments: &str) -> FunctionRecord {
        FunctionRecord {
            name: QualifiedName::parse("f").unwrap(),
            owner: Some("postgres".into()),
            language: "sql".into(),
            return_type: "integer".into(),
            arguments: arguments.into(),
            volatility: Volatility::Volatile,
            strict: false,
            security_definer: false,
            source: "SELECT 1".into(),
        }
    }

    #[test]
    fn test_single_match() {
        let name = QualifiedName::parse("f").unwrap();
        assert_eq!(single(&name, vec![]).unwrap(), None);
        assert_eq!(single(&name, vec![record("")]).unwrap(), Some(record("")));
        assert!(matches!(
            single(&name, vec![record(""), record("a integer")]),
            Err(Error::Inspection { .. })
        ));
    }

    #[test]
    fn test_select_overload() {
        let rows = vec![record("a integer"), record("a integer, b integer")];
        assert_eq!(
            select_overload(rows.clone(), "a integer, b integer"),
            Some(record("a integer, b integer"))
        );
        assert_eq!(
            select_overload(vec![record("x text")], "a integer"),
            Some(record("x text"))
        );
        assert_eq!(select_overload(vec![], "a integer"), None);
    }

    #[test]
    fn test_select_overload_without_match_uses_oldest() {
        let rows = vec![record("a integer"), record("a integer, b integer")];
        assert_eq!(select_overload(rows, "b text"), Some(record("a integer")));
    }
}
