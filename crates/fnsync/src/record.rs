//! The normalized shape of one routine, current or desired.

use fnsync_sql::{QualifiedName, Volatility};

/// Everything reconciliation compares about a routine.
///
/// The inspector builds one from the catalog, the normalizer builds one from
/// configuration; both produce the same shapes so they can be compared field
/// by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    pub name: QualifiedName,
    /// `None` when unknown (desired state without an owner).
    pub owner: Option<String>,
    pub language: String,
    /// Cannot be altered in place once the routine exists.
    pub return_type: String,
    /// Argument declarations joined with `", "`, as the catalog renders them.
    pub arguments: String,
    pub volatility: Volatility,
    pub strict: bool,
    pub security_definer: bool,
    pub source: String,
}
