//! Schema-qualified routine names.

use crate::{Ident, ObjectKind, QuoteError, split_segments};

/// Schema used when a name carries no explicit qualifier.
pub const DEFAULT_SCHEMA: &str = "public";

/// A routine name resolved to `(schema, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    schema: String,
    name: String,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse `name` or `schema.name`, defaulting the schema to [`DEFAULT_SCHEMA`].
    pub fn parse(input: &str) -> Result<Self, QuoteError> {
        let mut segments = split_segments(input, ObjectKind::Function)?.into_iter().rev();
        let name = segments.next().unwrap_or_default();
        let schema = segments.next().unwrap_or(DEFAULT_SCHEMA);
        Ok(Self::new(schema, name))
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same schema, different local name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self::new(self.schema.clone(), name)
    }

    /// `"schema"."name"`, ready to embed in DDL.
    pub fn quoted(&self) -> String {
        format!("{}.{}", Ident(&self.schema), Ident(&self.name))
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_schema() {
        let name = QualifiedName::parse("myfunc").unwrap();
        assert_eq!(name.schema(), "public");
        assert_eq!(name.name(), "myfunc");
        assert_eq!(name.to_string(), "public.myfunc");
    }

    #[test]
    fn test_parse_qualified() {
        let name = QualifiedName::parse("billing.Total").unwrap();
        assert_eq!(name.schema(), "billing");
        assert_eq!(name.name(), "Total");
        assert_eq!(name.quoted(), "\"billing\".\"Total\"");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(QualifiedName::parse("").is_err());
        assert!(QualifiedName::parse("schema.").is_err());
    }

    #[test]
    fn test_with_name_keeps_schema() {
        let name = QualifiedName::parse("billing.old").unwrap();
        assert_eq!(name.with_name("new").to_string(), "billing.new");
    }
}
