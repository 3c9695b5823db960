//! Lexical screening of untrusted input.
//!
//! Names, types and roles end up in DDL positions that cannot be bound as
//! query parameters. When the caller does not trust its input, every such
//! value is screened line by line for the usual injection shapes before
//! anything touches the database.

use crate::{Error, FunctionSpec, Result};

const STATEMENT_KEYWORDS: &[&str] = &[
    "SELECT", "UPDATE", "INSERT", "DELETE", "DROP", "TRUNCATE", "ALTER",
];

const SET_OPERATORS: &[&str] = &["UNION", "INTERSECT", "EXCEPT"];

/// Returns true if `value` looks like it is trying to escape its position.
///
/// A line is suspicious when it has a quote followed by a comment marker, a
/// set operator followed by `SELECT`, or a `;` followed by a statement keyword.
pub fn is_input_dangerous(value: &str) -> bool {
    value.lines().any(|line| {
        let upper = line.to_ascii_uppercase();

        let quote_then_comment = line
            .find(['\'', '"'])
            .is_some_and(|q| line[q..].contains("--"));

        let set_then_select = SET_OPERATORS.iter().any(|op| {
            upper
                .find(op)
                .is_some_and(|i| upper[i + op.len()..].contains("SELECT"))
        });

        let semicolon_then_statement = upper.find(';').is_some_and(|i| {
            let rest = &upper[i..];
            STATEMENT_KEYWORDS.iter().any(|kw| rest.contains(kw))
        });

        quote_then_comment || set_then_select || semicolon_then_statement
    })
}

/// Reject the first field whose value is dangerous.
pub fn check_input<'a>(fields: impl IntoIterator<Item = (&'static str, &'a str)>) -> Result<()> {
    for (field, value) in fields {
        if is_input_dangerous(value) {
            return Err(Error::Configuration(format!(
                "passed input '{}' for '{}' is potentially dangerous",
                value, field
            )));
        }
    }
    Ok(())
}

/// Screen every spec field that is interpolated into DDL.
///
/// The source body is not screened: it is dollar-quoted behind a tag chosen
/// not to occur in it.
pub fn check_spec(spec: &FunctionSpec) -> Result<()> {
    let mut fields: Vec<(&'static str, &str)> = vec![("name", spec.name.as_str())];
    let optional = [
        ("owner", &spec.owner),
        ("rename", &spec.rename),
        ("language", &spec.language),
        ("return_type", &spec.return_type),
        ("volatility", &spec.volatility),
    ];
    for (field, value) in optional {
        if let Some(value) = value {
            fields.push((field, value.as_str()));
        }
    }
    for argument in spec.arguments.iter().flatten() {
        fields.push(("arguments", argument.as_str()));
    }
    check_input(fields)
}
