use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::db::DbPool;
use crate::models::trip::TripStatus;

#[derive(Debug, Error)]
pub enum RpcError {
    /// The row no longer matched the expected status/assignment at the moment
    /// of write. Another driver or the dispatcher got there first.
    #[error("trip is no longer available: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// The dispatch-side procedures the lifecycle core delegates to. These were
/// remote stored procedures in the hosted deployment; the contract the core
/// relies on is unchanged: each call is atomic, and success means a row was
/// actually affected.
#[async_trait]
pub trait DispatchRpc: Send + Sync {
    async fn accept_trip(&self, trip_id: &str, driver_id: &str) -> Result<(), RpcError>;
    async fn reject_trip(&self, trip_id: &str, driver_id: &str) -> Result<(), RpcError>;
    async fn assign_trip_to_driver(&self, trip_id: &str, driver_id: &str) -> Result<(), RpcError>;
}

/// In-process adapter: each procedure is a single conditional UPDATE, so the
/// status check and the write are one atomic statement (compare-and-swap on
/// `status` plus the driver assignment).
pub struct SqlDispatch {
    db: DbPool,
}

impl SqlDispatch {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DispatchRpc for SqlDispatch {
    async fn accept_trip(&self, trip_id: &str, driver_id: &str) -> Result<(), RpcError> {
        let result = sqlx::query(
            "UPDATE trips SET status = ? \
             WHERE id = ? AND driver_id = ? AND status = ?",
        )
        .bind(TripStatus::Upcoming)
        .bind(trip_id)
        .bind(driver_id)
        .bind(TripStatus::AwaitingDriverAcceptance)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RpcError::Conflict(
                "trip is not awaiting acceptance by this driver".into(),
            ));
        }
        info!(trip_id, driver_id, "trip accepted");
        Ok(())
    }

    async fn reject_trip(&self, trip_id: &str, driver_id: &str) -> Result<(), RpcError> {
        // Rejection releases the assignment; the trip stays visible to the
        // rejecting driver through rejected_by_driver_id.
        let result = sqlx::query(
            "UPDATE trips SET status = ?, rejected_by_driver_id = ?, driver_id = NULL \
             WHERE id = ? AND driver_id = ? AND status IN (?, ?)",
        )
        .bind(TripStatus::Rejected)
        .bind(driver_id)
        .bind(trip_id)
        .bind(driver_id)
        .bind(TripStatus::AwaitingDriverAcceptance)
        .bind(TripStatus::Upcoming)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RpcError::Conflict(
                "trip is not rejectable by this driver".into(),
            ));
        }
        info!(trip_id, driver_id, "trip rejected");
        Ok(())
    }

    async fn assign_trip_to_driver(&self, trip_id: &str, driver_id: &str) -> Result<(), RpcError> {
        let result = sqlx::query(
            "UPDATE trips SET status = ?, driver_id = ? \
             WHERE id = ? AND driver_id IS NULL AND status = ?",
        )
        .bind(TripStatus::AwaitingDriverAcceptance)
        .bind(driver_id)
        .bind(trip_id)
        .bind(TripStatus::Pending)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RpcError::Conflict("trip is not assignable".into()));
        }
        info!(trip_id, driver_id, "trip assigned to driver");
        Ok(())
    }
}
