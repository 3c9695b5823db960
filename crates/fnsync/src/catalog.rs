//! The narrow interface reconciliation needs from the catalog.

use std::future::Future;
use std::pin::Pin;

use fnsync_sql::QualifiedName;

use crate::error::describe;
use crate::{Connection, ConnectionExt, Error, FunctionRecord, Result, introspect};

/// A boxed future returned by [`FunctionCatalog`] methods.
pub type CatalogFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Read routine definitions and issue DDL against one session.
///
/// Implemented for every [`Connection`]. Implementations never begin or end
/// a transaction: they run inside whatever the caller has open.
pub trait FunctionCatalog: Send + Sync {
    /// Every plain function named `name`, one record per overload.
    fn candidates<'a>(&'a self, name: &'a QualifiedName) -> CatalogFuture<'a, Vec<FunctionRecord>>;

    /// Run one DDL statement. Failures are [`Error::Execution`] and carry the statement.
    fn execute<'a>(&'a self, sql: &'a str) -> CatalogFuture<'a, ()>;
}

impl<C: Connection> FunctionCatalog for C {
    fn candidates<'a>(&'a self, name: &'a QualifiedName) -> CatalogFuture<'a, Vec<FunctionRecord>> {
        Box::pin(introspect::candidates(self, name))
    }

    fn execute<'a>(&'a self, sql: &'a str) -> CatalogFuture<'a, ()> {
        Box::pin(async move {
            self.traced()
                .execute(sql, &[])
                .await
                .map(|_| ())
                .map_err(|e| Error::Execution {
                    statement: sql.to_string(),
                    message: describe(&e),
                })
        })
    }
}
