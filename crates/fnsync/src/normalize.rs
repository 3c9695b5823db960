//! Desired-state normalization.
//!
//! Configuration hands over arguments as a list and volatility as a word;
//! the catalog reports a joined argument string and a one-letter code. The
//! diff only ever compares normalized values.

use fnsync_sql::{QualifiedName, Volatility};

use crate::{Error, FunctionRecord, FunctionSpec, Result};

/// Join argument declarations the way `pg_get_function_arguments` does.
pub fn join_arguments(arguments: &[String]) -> String {
    arguments
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Map a volatility word to its class. Anything unrecognized is volatile.
pub fn volatility_from_word(word: Option<&str>) -> Volatility {
    word.and_then(Volatility::from_word).unwrap_or_default()
}

/// Build the desired record for `present` mode.
pub fn normalize(name: &QualifiedName, spec: &FunctionSpec) -> Result<FunctionRecord> {
    let required = |value: &Option<String>, field: &str| {
        value.clone().ok_or_else(|| {
            Error::Configuration(format!("{}: missing required field '{}'", spec.name, field))
        })
    };

    Ok(FunctionRecord {
        name: name.clone(),
        owner: spec.owner.clone().filter(|o| !o.is_empty()),
        language: required(&spec.language, "language")?,
        return_type: required(&spec.return_type, "return_type")?.trim().to_string(),
        arguments: join_arguments(spec.arguments.as_deref().unwrap_or_default()),
        volatility: volatility_from_word(spec.volatility.as_deref()),
        strict: spec.strict.unwrap_or(false),
        security_definer: spec.security_definer.unwrap_or(false),
        source: required(&spec.source, "source")?,
    })
}
