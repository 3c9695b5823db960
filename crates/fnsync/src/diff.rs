//! Function diffing - compare the catalog's current record against the
//! desired one and decide what, if anything, to issue.
//!
//! Precedence when the routine exists in `present` mode:
//!
//! 1. A different return type is fatal. PostgreSQL cannot alter it in place
//!    and `CREATE OR REPLACE` refuses to change it, so nothing is issued.
//! 2. Any difference in language, arguments, volatility, strictness,
//!    security-definer or source means `CREATE OR REPLACE`. An owner change,
//!    if any, is queued after it so a failing owner change never hides a
//!    stale body behind a successful one.
//! 3. Otherwise an owner difference alone is an `ALTER FUNCTION ... OWNER TO`.
//!
//! A different argument list does not replace the existing routine: the
//! catalog keys routines by `(schema, name, argument types)`, so a new
//! overload is created next to the old one. That is reported as a
//! [`Notice::OverloadCreated`], not an error.

use fnsync_sql::{
    AlterOwner, CreateFunction, DropFunction, FunctionStmt, QualifiedName, RenameFunction,
};

use crate::{Error, FunctionRecord, Mode, ReconcileRequest, Result};

/// The action reconciliation settled on.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Already converged.
    NoOp,
    /// Only the owner differs. `arguments` names the overload to alter.
    OwnerOnly { owner: String, arguments: String },
    /// Create the routine or replace its definition, then optionally hand
    /// it to `owner`.
    CreateOrReplace {
        desired: FunctionRecord,
        owner: Option<String>,
        /// The argument list differs from the existing routine's, so this
        /// creates a separate overload.
        new_overload: bool,
    },
    /// Drop the routine.
    Drop { cascade: bool },
    /// Rename the routine within its schema.
    Rename { to: String },
}

/// Something the caller should know about that is not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A differing argument list creates a distinct routine alongside the
    /// existing one.
    OverloadCreated {
        function: String,
        existing: String,
        desired: String,
    },
    /// `cascade` only applies when dropping.
    CascadeIgnored { function: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::OverloadCreated {
                function,
                existing,
                desired,
            } => write!(
                f,
                "{}: cannot change arguments of an existing function ({}) -> ({}); \
                 a new distinct overload will be created",
                function, existing, desired
            ),
            Notice::CascadeIgnored { function } => {
                write!(f, "{}: cascade=true is ignored unless dropping", function)
            }
        }
    }
}

/// The diff result: one action plus any notices raised while deciding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub notices: Vec<Notice>,
}

impl Decision {
    fn new(action: Action) -> Self {
        Self {
            action,
            notices: Vec::new(),
        }
    }
}

/// Fields whose difference forces `CREATE OR REPLACE`.
pub const REPLACE_FIELDS: &[&str] = &[
    "language",
    "arguments",
    "volatility",
    "strict",
    "security_definer",
    "source",
];

/// Names of the replace-relevant fields that differ between two records.
///
/// Owner and return type are not included: they have their own handling.
pub fn changed_fields(current: &FunctionRecord, desired: &FunctionRecord) -> Vec<&'static str> {
    let diffs = [
        current.language != desired.language,
        current.arguments != desired.arguments,
        current.volatility != desired.volatility,
        current.strict != desired.strict,
        current.security_definer != desired.security_definer,
        current.source != desired.source,
    ];
    REPLACE_FIELDS
        .iter()
        .zip(diffs)
        .filter_map(|(field, differs)| differs.then_some(*field))
        .collect()
}

/// Decide how to move from `current` (as inspected) to what `request` asks for.
///
/// Returns [`Error::ImmutableAttribute`] when the request needs a return type
/// change on an existing routine; no action is produced in that case.
pub fn decide(current: Option<&FunctionRecord>, request: &ReconcileRequest) -> Result<Decision> {
    let mut decision = match (request.mode(), current) {
        (Mode::Present(desired), None) => Decision::new(Action::CreateOrReplace {
            desired: desired.clone(),
            owner: desired.owner.clone(),
            new_overload: false,
        }),
        (Mode::Present(desired), Some(current)) => diff_existing(current, desired)?,
        (Mode::Absent, Some(_)) => Decision::new(Action::Drop {
            cascade: request.cascade(),
        }),
        (Mode::Rename(to), Some(_)) => Decision::new(Action::Rename { to: to.clone() }),
        (Mode::Absent | Mode::Rename(_), None) => Decision::new(Action::NoOp),
    };

    if request.cascade() && !matches!(request.mode(), Mode::Absent) {
        decision.notices.push(Notice::CascadeIgnored {
            function: request.name().to_string(),
        });
    }

    Ok(decision)
}

fn diff_existing(current: &FunctionRecord, desired: &FunctionRecord) -> Result<Decision> {
    if current.return_type != desired.return_type {
        return Err(Error::ImmutableAttribute {
            function: desired.name.to_string(),
            current: current.return_type.clone(),
            desired: desired.return_type.clone(),
        });
    }

    let owner = desired
        .owner
        .as_ref()
        .filter(|owner| current.owner.as_ref() != Some(*owner))
        .cloned();

    let changed = changed_fields(current, desired);
    if changed.is_empty() {
        return Ok(Decision::new(match owner {
            Some(owner) => Action::OwnerOnly {
                owner,
                arguments: desired.arguments.clone(),
            },
            None => Action::NoOp,
        }));
    }

    let new_overload = current.arguments != desired.arguments;
    let mut decision = Decision::new(Action::CreateOrReplace {
        desired: desired.clone(),
        owner,
        new_overload,
    });
    if new_overload {
        decision.notices.push(Notice::OverloadCreated {
            function: desired.name.to_string(),
            existing: current.arguments.clone(),
            desired: desired.arguments.clone(),
        });
    }
    Ok(decision)
}

impl Action {
    pub fn is_noop(&self) -> bool {
        matches!(self, Action::NoOp)
    }

    /// Build the statements for this action, in execution order.
    pub fn statements(&self, name: &QualifiedName) -> Vec<FunctionStmt> {
        match self {
            Action::NoOp => Vec::new(),
            Action::OwnerOnly { owner, arguments } => vec![
                AlterOwner {
                    name: name.clone(),
                    signature: Some(arguments.clone()),
                    owner: owner.clone(),
                }
                .into(),
            ],
            Action::CreateOrReplace { desired, owner, .. } => {
                let mut stmts: Vec<FunctionStmt> = vec![
                    CreateFunction {
                        name: name.clone(),
                        arguments: desired.arguments.clone(),
                        returns: desired.return_type.clone(),
                        language: desired.language.clone(),
                        volatility: desired.volatility,
                        strict: desired.strict,
                        security_definer: desired.security_definer,
                        body: desired.source.clone(),
                    }
                    .into(),
                ];
                if let Some(owner) = owner {
                    stmts.push(
                        AlterOwner {
                            name: name.clone(),
                            signature: Some(desired.arguments.clone()),
                            owner: owner.clone(),
                        }
                        .into(),
                    );
                }
                stmts
            }
            Action::Drop { cascade } => vec![
                DropFunction {
                    name: name.clone(),
                    cascade: *cascade,
                }
                .into(),
            ],
            Action::Rename { to } => vec![
                RenameFunction {
                    name: name.clone(),
                    to: to.clone(),
                }
                .into(),
            ],
        }
    }

    /// Render the statements for this action to SQL.
    pub fn to_sql(&self, name: &QualifiedName) -> Vec<String> {
        self.statements(name).iter().map(fnsync_sql::render).collect()
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::NoOp => write!(f, "= no change"),
            Action::OwnerOnly { owner, .. } => write!(f, "~ owner -> {}", owner),
            Action::CreateOrReplace {
                desired,
                owner,
                new_overload,
            } => {
                let verb = if *new_overload { "+ overload" } else { "~ replace" };
                write!(f, "{} {}({})", verb, desired.name, desired.arguments)?;
                if let Some(owner) = owner {
                    write!(f, ", owner -> {}", owner)?;
                }
                Ok(())
            }
            Action::Drop { cascade: true } => write!(f, "- drop (cascade)"),
            Action::Drop { cascade: false } => write!(f, "- drop"),
            Action::Rename { to } => write!(f, "~ rename -> {}", to),
        }
    }
}
