//! Identifier quoting and function DDL rendering.
//!
//! Everything here is pure string work: no database handle is involved.
//! Function names are always rendered schema-qualified, with each segment
//! quoted on its own so the dot separator is never part of an identifier.

use thiserror::Error;

mod name;
pub use name::*;

mod render;
pub use render::*;

mod stmt;
pub use stmt::*;

/// A PostgreSQL identifier wrapper.
///
/// Display writes the value escaped and quoted with double quotes.
///
/// # Example
/// ```
/// use fnsync_sql::Ident;
/// assert_eq!(format!("{}", Ident("user")), "\"user\"");
/// assert_eq!(format!("{}", Ident("bla\"h")), "\"bla\"\"h\"");
/// ```
pub struct Ident<T: AsRef<str>>(pub T);

impl<T: AsRef<str>> std::fmt::Display for Ident<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"")?;
        for c in self.0.as_ref().chars() {
            if c == '"' {
                write!(f, "\"\"")?;
            } else {
                write!(f, "{}", c)?;
            }
        }
        write!(f, "\"")
    }
}

/// Quote a single PostgreSQL identifier.
///
/// Always quotes, so reserved words and mixed case survive as written.
/// Doubles any embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("{}", Ident(name))
}

/// The kind of catalog object a name refers to.
///
/// The kind decides how many dotted segments a reference may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A routine: `name` or `schema.name`.
    Function,
    /// A role. Dots are part of the name, never separators.
    Role,
}

impl ObjectKind {
    /// Maximum number of dot-separated segments a reference may carry.
    pub fn max_segments(self) -> usize {
        match self {
            ObjectKind::Function => 2,
            ObjectKind::Role => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Function => "function",
            ObjectKind::Role => "role",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name that cannot be turned into a quoted reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("{kind} name is empty")]
    Empty { kind: ObjectKind },

    #[error("{kind} name '{name}' has an empty segment")]
    EmptySegment { kind: ObjectKind, name: String },

    #[error("{kind} name '{name}' has more than {max} dotted segments")]
    TooManySegments {
        kind: ObjectKind,
        name: String,
        max: usize,
    },
}

/// Split a reference into its segments according to `kind`.
pub fn split_segments(name: &str, kind: ObjectKind) -> Result<Vec<&str>, QuoteError> {
    if name.is_empty() {
        return Err(QuoteError::Empty { kind });
    }

    let max = kind.max_segments();
    let segments: Vec<&str> = if max == 1 {
        vec![name]
    } else {
        name.split('.').collect()
    };

    if segments.len() > max {
        return Err(QuoteError::TooManySegments {
            kind,
            name: name.to_string(),
            max,
        });
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(QuoteError::EmptySegment {
            kind,
            name: name.to_string(),
        });
    }

    Ok(segments)
}

/// Quote a possibly dotted reference, one segment at a time.
///
/// # Example
/// ```
/// use fnsync_sql::{ObjectKind, quote_object};
/// assert_eq!(
///     quote_object("billing.total", ObjectKind::Function).unwrap(),
///     "\"billing\".\"total\""
/// );
/// assert_eq!(
///     quote_object("ops.team", ObjectKind::Role).unwrap(),
///     "\"ops.team\""
/// );
/// ```
pub fn quote_object(name: &str, kind: ObjectKind) -> Result<String, QuoteError> {
    let quoted: Vec<String> = split_segments(name, kind)?
        .into_iter()
        .map(quote_ident)
        .collect();
    Ok(quoted.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_doubles_quotes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("MixedCase"), "\"MixedCase\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_quote_object_function() {
        assert_eq!(
            quote_object("myfunc", ObjectKind::Function).unwrap(),
            "\"myfunc\""
        );
        assert_eq!(
            quote_object("s.myfunc", ObjectKind::Function).unwrap(),
            "\"s\".\"myfunc\""
        );
    }

    #[test]
    fn test_quote_object_rejects_malformed() {
        assert_eq!(
            quote_object("", ObjectKind::Function),
            Err(QuoteError::Empty {
                kind: ObjectKind::Function
            })
        );
        assert!(matches!(
            quote_object("a..b", ObjectKind::Function),
            Err(QuoteError::TooManySegments { .. })
        ));
        assert!(matches!(
            quote_object(".b", ObjectKind::Function),
            Err(QuoteError::EmptySegment { .. })
        ));
        assert!(matches!(
            quote_object("a.b.c", ObjectKind::Function),
            Err(QuoteError::TooManySegments { max: 2, .. })
        ));
    }

    #[test]
    fn test_quote_object_role_keeps_dots() {
        assert_eq!(
            quote_object("ops.team", ObjectKind::Role).unwrap(),
            "\"ops.team\""
        );
        assert_eq!(
            quote_object("", ObjectKind::Role).unwrap_err().to_string(),
            "role name is empty"
        );
    }

    #[test]
    fn test_quote_object_is_injective_on_dots() {
        // A quote inside a segment must not be confusable with a separator.
        let a = quote_object("a.b", ObjectKind::Function).unwrap();
        let b = quote_object("a\".\"b", ObjectKind::Role).unwrap();
        assert_ne!(a, b);
    }
}
