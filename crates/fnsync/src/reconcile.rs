//! The reconciliation state machine.
//!
//! ```text
//! Inspecting -> Deciding -> Executing -> Verifying -> Done
//!                   |
//!                   +-> Aborted (return type change: nothing issued)
//! ```
//!
//! The catalog is read at exactly two points: once before deciding and, if
//! anything was issued, once after. Everything runs on the caller's session
//! and inside the caller's transaction; committing or rolling back (for a
//! dry run) is the caller's business.

use tracing::Instrument;

use crate::introspect::{select_overload, single};
use crate::{Decision, FunctionCatalog, FunctionRecord, Mode, Notice, ReconcileRequest, Result};

/// Where the state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Inspecting,
    Deciding,
    Executing,
    Verifying,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Inspecting => "inspecting",
            Phase::Deciding => "deciding",
            Phase::Executing => "executing",
            Phase::Verifying => "verifying",
            Phase::Done => "done",
        };
        f.write_str(s)
    }
}

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    /// State after reconciliation, `None` if the routine does not exist.
    pub function: Option<FunctionRecord>,
    /// Whether any statement was issued.
    pub changed: bool,
    /// Every statement issued, verbatim, in order.
    pub statements: Vec<String>,
    pub notices: Vec<Notice>,
}

/// Bring the routine named by `request` to the requested state.
///
/// Errors are terminal: nothing is retried, and when a statement fails the
/// remaining ones are not issued. The transaction is left for the caller to
/// roll back.
pub async fn reconcile<C: FunctionCatalog + ?Sized>(
    catalog: &C,
    request: &ReconcileRequest,
) -> Result<ReconcileReport> {
    let span = tracing::info_span!("reconcile", function = %request.name());
    run(catalog, request).instrument(span).await
}

async fn run<C: FunctionCatalog + ?Sized>(
    catalog: &C,
    request: &ReconcileRequest,
) -> Result<ReconcileReport> {
    tracing::debug!(phase = %Phase::Inspecting);
    let current = current_state(catalog, request).await?;

    tracing::debug!(phase = %Phase::Deciding, exists = current.is_some());
    let Decision { action, notices } = match crate::diff::decide(current.as_ref(), request) {
        Ok(decision) => decision,
        Err(err) => {
            tracing::error!(error = %err, "aborting before issuing any statement");
            return Err(err);
        }
    };
    tracing::info!(action = %action, "decided");
    for notice in &notices {
        tracing::warn!("{}", notice);
    }

    if action.is_noop() {
        tracing::debug!(phase = %Phase::Done, changed = false);
        return Ok(ReconcileReport {
            function: current,
            changed: false,
            statements: Vec::new(),
            notices,
        });
    }

    tracing::debug!(phase = %Phase::Executing);
    let mut statements = Vec::new();
    for sql in action.to_sql(request.name()) {
        catalog.execute(&sql).await?;
        statements.push(sql);
    }

    tracing::debug!(phase = %Phase::Verifying);
    let function = verified_state(catalog, request).await?;

    tracing::debug!(phase = %Phase::Done, changed = true, statements = statements.len());
    Ok(ReconcileReport {
        function,
        changed: true,
        statements,
        notices,
    })
}

/// The routine as it is before anything is issued.
async fn current_state<C: FunctionCatalog + ?Sized>(
    catalog: &C,
    request: &ReconcileRequest,
) -> Result<Option<FunctionRecord>> {
    let rows = catalog.candidates(request.name()).await?;
    match request.mode() {
        Mode::Present(desired) => Ok(select_overload(rows, &desired.arguments)),
        Mode::Absent | Mode::Rename(_) => single(request.name(), rows),
    }
}

/// The routine as the catalog reports it after the statements ran.
async fn verified_state<C: FunctionCatalog + ?Sized>(
    catalog: &C,
    request: &ReconcileRequest,
) -> Result<Option<FunctionRecord>> {
    let target = request.target_name();
    let rows = catalog.candidates(&target).await?;
    match request.mode() {
        Mode::Present(desired) => Ok(select_overload(rows, &desired.arguments)),
        Mode::Absent | Mode::Rename(_) => single(&target, rows),
    }
}
