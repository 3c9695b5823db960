//! Transaction handling around [`reconcile`](crate::reconcile()).
//!
//! The reconciler never commits. [`apply`] is the usual caller: it opens a
//! transaction on the session, reconciles inside it, and either commits or
//! rolls back depending on [`ApplyMode`].

use fnsync_sql::{ObjectKind, quote_object};
use tokio_postgres::Client;

use crate::error::describe;
use crate::{Error, ReconcileReport, ReconcileRequest, Result, reconcile};

/// What to do with the transaction once reconciliation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    #[default]
    Commit,
    /// Run everything, report it, then roll back.
    DryRun,
}

/// Reconcile `request` inside a fresh transaction on `client`.
///
/// On error the transaction is rolled back before the error is returned. In
/// [`ApplyMode::DryRun`] the report describes the state as it was inside the
/// transaction, just before rollback.
pub async fn apply(
    client: &mut Client,
    request: &ReconcileRequest,
    mode: ApplyMode,
) -> Result<ReconcileReport> {
    let tx = client.transaction().await?;

    match reconcile(&tx, request).await {
        Ok(report) => {
            match mode {
                ApplyMode::Commit => tx.commit().await?,
                ApplyMode::DryRun => {
                    tracing::info!(changed = report.changed, "dry run, rolling back");
                    tx.rollback().await?;
                }
            }
            Ok(report)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %describe(&rollback), "rollback failed");
            }
            Err(err)
        }
    }
}

/// Switch the session to `role` for everything issued afterwards.
pub async fn set_session_role(client: &Client, role: &str) -> Result<()> {
    let sql = format!("SET ROLE {}", quote_object(role, ObjectKind::Role)?);
    client
        .batch_execute(&sql)
        .await
        .map_err(|e| Error::Execution {
            message: describe(&e),
            statement: sql.clone(),
        })
}
