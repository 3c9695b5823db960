//! Statement logging for catalog reads and DDL.
//!
//! Every query and statement the reconciler sends goes through [`TracedConn`],
//! which opens a `db.query` or `db.execute` debug span. Function bodies can run
//! to hundreds of lines, so a span carries the statement's leading keywords and
//! its first line rather than the whole text. The full text is logged at trace.

use std::future::Future;
use std::pin::Pin;

use tokio_postgres::types::ToSql;
use tokio_postgres::{Error, Row};
use tracing::{Instrument, Span};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 'a>>;

/// Longest first line a span records before it is cut.
const SUMMARY_LEN: usize = 120;

/// Borrowed connection whose calls are logged through tracing.
///
/// ```ignore
/// use fnsync::ConnectionExt;
///
/// let tx = client.transaction().await?;
/// tx.traced().execute(r#"DROP FUNCTION "public"."myfunc""#, &[]).await?;
/// ```
pub struct TracedConn<'a, C: Connection> {
    conn: &'a C,
}

impl<'a, C: Connection> TracedConn<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Execute a statement, returning the number of rows affected.
    pub async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64, Error> {
        let span = tracing::debug_span!(
            "db.execute",
            verb = %verb(sql),
            statement = %summary(sql),
            params = params.len(),
            affected = tracing::field::Empty,
            error = tracing::field::Empty,
        );
        let affected = observe(&span, sql, self.conn.execute(sql, params)).await?;
        span.record("affected", affected);
        Ok(affected)
    }

    /// Run a query, returning all rows.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Error> {
        let span = tracing::debug_span!(
            "db.query",
            statement = %summary(sql),
            params = params.len(),
            rows = tracing::field::Empty,
            error = tracing::field::Empty,
        );
        let rows = observe(&span, sql, self.conn.query(sql, params)).await?;
        span.record("rows", rows.len());
        Ok(rows)
    }
}

/// Drive `fut` inside `span`, recording the server's message when it fails.
async fn observe<T>(span: &Span, sql: &str, fut: BoxFuture<'_, T>) -> Result<T, Error> {
    tracing::trace!(parent: span, sql, "sending");
    fut.instrument(span.clone()).await.inspect_err(|e| {
        let message = e
            .as_db_error()
            .map(|db| db.message().to_string())
            .unwrap_or_else(|| e.to_string());
        span.record("error", message.as_str());
    })
}

/// Leading keywords of a statement, e.g. `CREATE OR REPLACE FUNCTION`.
///
/// Stops at the first word that is not all ASCII letters, which is where the
/// object name starts.
fn verb(sql: &str) -> String {
    sql.split_whitespace()
        .take_while(|w| w.chars().all(|c| c.is_ascii_alphabetic()))
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// First non-blank line of `sql`, trimmed and cut to [`SUMMARY_LEN`] chars.
fn summary(sql: &str) -> String {
    let line = sql.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let more = sql.trim().len() > line.len();
    match line.char_indices().nth(SUMMARY_LEN) {
        Some((cut, _)) => format!("{}…", &line[..cut]),
        None if more => format!("{line} …"),
        None => line.to_string(),
    }
}

/// Adds [`traced`](ConnectionExt::traced) to every [`Connection`].
pub trait ConnectionExt: Connection + Sized {
    fn traced(&self) -> TracedConn<'_, Self> {
        TracedConn::new(self)
    }
}

impl<C: Connection> ConnectionExt for C {}

/// A session the reconciler can read the catalog from and send DDL to.
///
/// Implemented for `tokio_postgres::Client` and `tokio_postgres::Transaction`,
/// so a run can go straight to a session or sit inside a transaction the
/// caller controls.
pub trait Connection: Send + Sync {
    fn execute<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [&'a (dyn ToSql + Sync)],
    ) -> BoxFuture<'a, u64>;

    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [&'a (dyn ToSql + Sync)],
    ) -> BoxFuture<'a, Vec<Row>>;
}

impl Connection for tokio_postgres::Client {
    fn execute<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [&'a (dyn ToSql + Sync)],
    ) -> BoxFuture<'a, u64> {
        Box::pin(tokio_postgres::Client::execute(self, sql, params))
    }

    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [&'a (dyn ToSql + Sync)],
    ) -> BoxFuture<'a, Vec<Row>> {
        Box::pin(tokio_postgres::Client::query(self, sql, params))
    }
}

impl Connection for tokio_postgres::Transaction<'_> {
    fn execute<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [&'a (dyn ToSql + Sync)],
    ) -> BoxFuture<'a, u64> {
        Box::pin(tokio_postgres::Transaction::execute(self, sql, params))
    }

    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [&'a (dyn ToSql + Sync)],
    ) -> BoxFuture<'a, Vec<Row>> {
        Box::pin(tokio_postgres::Transaction::query(self, sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_stops_at_object_name() {
        assert_eq!(
            verb("CREATE OR REPLACE FUNCTION \"public\".\"f\"() RETURNS integer"),
            "CREATE OR REPLACE FUNCTION"
        );
        assert_eq!(verb("drop function \"public\".\"f\" CASCADE"), "DROP FUNCTION");
        assert_eq!(verb("ALTER FUNCTION \"f\"(a integer) OWNER TO x"), "ALTER FUNCTION");
        assert_eq!(verb(""), "");
    }

    #[test]
    fn test_summary_keeps_first_line_only() {
        let sql = "\n  CREATE OR REPLACE FUNCTION \"public\".\"f\"()\nRETURNS integer AS $$\nBEGIN RETURN 1; END;\n$$";
        assert_eq!(summary(sql), "CREATE OR REPLACE FUNCTION \"public\".\"f\"() …");
        assert_eq!(summary("SET ROLE \"app\""), "SET ROLE \"app\"");
    }

    #[test]
    fn test_summary_cuts_long_lines_on_char_boundary() {
        let sql = "é".repeat(SUMMARY_LEN + 10);
        let out = summary(&sql);
        assert_eq!(out.chars().count(), SUMMARY_LEN + 1);
        assert!(out.ends_with('…'));
    }
}
