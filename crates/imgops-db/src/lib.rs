//! Persistence for operation history
//!
//! `HistoryStore` is the seam the workflow depends on: open a transaction,
//! insert one record, commit or roll back. `PgHistoryStore` is the Postgres
//! implementation; `schema` owns migrations and the administrative reset.

pub mod history;
pub mod schema;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;
pub mod transaction;

pub use history::{HistoryStore, HistoryTransaction, PgHistoryStore};
pub use schema::{reset_schema, run_migrations};
pub use transaction::insert_in_transaction;
