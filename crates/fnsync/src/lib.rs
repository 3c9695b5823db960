//! Declarative management of PostgreSQL functions.
//!
//! Given the desired definition of one routine, this crate inspects what the
//! catalog currently holds, computes the smallest set of DDL statements that
//! converges the two, issues them on the caller's session, and reads the
//! result back.
//!
//! ```ignore
//! let request = ReconcileRequest::from_spec(&spec)?;
//! let report = fnsync::apply(&mut client, &request, ApplyMode::Commit).await?;
//! for stmt in &report.statements {
//!     println!("{stmt}");
//! }
//! ```
//!
//! # Statement order
//!
//! When both the definition and the owner change, `CREATE OR REPLACE` is
//! issued before `ALTER ... OWNER TO`. A routine that does not exist yet has
//! to be created before it can be given away.
//!
//! # What cannot change in place
//!
//! PostgreSQL refuses to change the return type of an existing function
//! through `CREATE OR REPLACE`. Such a request fails with
//! [`Error::ImmutableAttribute`] before anything is issued; drop the routine
//! first.

mod catalog;
mod diff;
mod error;
pub mod introspect;
mod normalize;
mod record;
mod reconcile;
mod request;
pub mod safety;
mod session;
mod traced;

pub use catalog::{CatalogFuture, FunctionCatalog};
pub use diff::{Action, Decision, Notice, REPLACE_FIELDS, changed_fields, decide};
pub use error::Error;
pub use introspect::inspect;
pub use normalize::{join_arguments, normalize, volatility_from_word};
pub use record::FunctionRecord;
pub use reconcile::{Phase, ReconcileReport, reconcile};
pub use request::{FunctionSpec, Mode, ReconcileRequest, State};
pub use session::{ApplyMode, apply, set_session_role};
pub use traced::{Connection, ConnectionExt, TracedConn};

pub use fnsync_sql::{DEFAULT_SCHEMA, QualifiedName, Volatility};

pub type Result<T> = std::result::Result<T, Error>;
