//! Transaction helper for history writes

use crate::history::HistoryStore;
use imgops_core::{AppError, HistoryRecord, NewHistoryRecord};

/// Insert `record` in its own transaction.
///
/// Commits on success. Any insert failure rolls the transaction back and is
/// returned unchanged; a rollback failure is only logged.
pub async fn insert_in_transaction(
    store: &dyn HistoryStore,
    record: &NewHistoryRecord,
) -> Result<HistoryRecord, AppError> {
    let mut tx = store.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        e
    })?;

    match tx.insert(record).await {
        Ok(saved) => {
            tx.commit().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to commit transaction");
                e
            })?;
            Ok(saved)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(
                    error = %rollback_err,
                    original_error = %e,
                    "Failed to rollback transaction"
                );
            }
            Err(e)
        }
    }
}
