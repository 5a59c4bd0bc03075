use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::db::DbPool;
use crate::models::client::{Facility, ManagedClient, RiderProfile, TripDetails};
use crate::models::trip::{transition, Trip, TripAction, TripStatus};
use crate::services::dispatch::{DispatchRpc, RpcError};

/// Discriminated outcome of a lifecycle operation. Expected conditions
/// (authorization, lost races, illegal actions) are variants, not panics;
/// only real store failures are opaque.
#[derive(Debug, Error)]
pub enum TripError {
    #[error("trip not found for this driver")]
    NotFound,
    #[error("trip is not assigned to this driver")]
    NotAuthorized,
    #[error("cannot {action} a trip in status {status}")]
    InvalidTransition {
        status: TripStatus,
        action: TripAction,
    },
    #[error("incomplete submission: {0}")]
    IncompleteSubmission(String),
    #[error("transition failed: {0}")]
    TransitionFailed(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl TripError {
    pub fn kind(&self) -> &'static str {
        match self {
            TripError::NotFound => "not_found",
            TripError::NotAuthorized => "not_authorized",
            TripError::InvalidTransition { .. } => "invalid_transition",
            TripError::IncompleteSubmission(_) => "incomplete_submission",
            TripError::TransitionFailed(_) => "transition_failed",
            TripError::Database(_) => "database",
        }
    }
}

impl From<RpcError> for TripError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Conflict(msg) => TripError::TransitionFailed(msg),
            RpcError::Database(inner) => TripError::Database(inner),
        }
    }
}

/// The trip lifecycle controller. Every operation takes the caller's driver
/// id explicitly; nothing here reads ambient session state. All reads are
/// driver-scoped, and zero rows from a scoped query is `NotFound`, never
/// silent success.
#[derive(Clone)]
pub struct TripService {
    db: DbPool,
    dispatch: Arc<dyn DispatchRpc>,
}

impl TripService {
    pub fn new(db: DbPool, dispatch: Arc<dyn DispatchRpc>) -> Self {
        Self { db, dispatch }
    }

    /// Trips the driver is currently responsible for, soonest pickup first.
    pub async fn list_current(&self, driver_id: &str) -> Result<Vec<Trip>, TripError> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT * FROM trips \
             WHERE driver_id = ? AND status IN (?, ?, ?) \
             ORDER BY pickup_time ASC",
        )
        .bind(driver_id)
        .bind(TripStatus::AwaitingDriverAcceptance)
        .bind(TripStatus::Upcoming)
        .bind(TripStatus::InProgress)
        .fetch_all(&self.db)
        .await?;
        Ok(trips)
    }

    pub async fn list_completed(&self, driver_id: &str) -> Result<Vec<Trip>, TripError> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT * FROM trips \
             WHERE driver_id = ? AND status = ? \
             ORDER BY pickup_time DESC LIMIT 10",
        )
        .bind(driver_id)
        .bind(TripStatus::Completed)
        .fetch_all(&self.db)
        .await?;
        Ok(trips)
    }

    /// Rejected trips match on either column: rejection clears the
    /// assignment but records who rejected.
    pub async fn list_rejected(&self, driver_id: &str) -> Result<Vec<Trip>, TripError> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT * FROM trips \
             WHERE status = ? AND (driver_id = ? OR rejected_by_driver_id = ?) \
             ORDER BY pickup_time DESC LIMIT 10",
        )
        .bind(TripStatus::Rejected)
        .bind(driver_id)
        .bind(driver_id)
        .fetch_all(&self.db)
        .await?;
        Ok(trips)
    }

    /// Driver-scoped fetch. A trip another driver owns does not resolve for
    /// this caller at all.
    pub async fn find_visible(&self, trip_id: &str, driver_id: &str) -> Result<Trip, TripError> {
        sqlx::query_as::<_, Trip>(
            "SELECT * FROM trips \
             WHERE id = ? AND (driver_id = ? OR rejected_by_driver_id = ?)",
        )
        .bind(trip_id)
        .bind(driver_id)
        .bind(driver_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(TripError::NotFound)
    }

    pub async fn details(&self, trip_id: &str, driver_id: &str) -> Result<TripDetails, TripError> {
        let trip = self.find_visible(trip_id, driver_id).await?;

        let rider_profile = match &trip.user_id {
            Some(user_id) => {
                sqlx::query_as::<_, RiderProfile>("SELECT * FROM profiles WHERE id = ?")
                    .bind(user_id)
                    .fetch_optional(&self.db)
                    .await?
            }
            None => None,
        };
        let managed_client = match &trip.managed_client_id {
            Some(client_id) => {
                sqlx::query_as::<_, ManagedClient>(
                    "SELECT * FROM facility_managed_clients WHERE id = ?",
                )
                .bind(client_id)
                .fetch_optional(&self.db)
                .await?
            }
            None => None,
        };
        let facility = match &trip.facility_id {
            Some(facility_id) => {
                sqlx::query_as::<_, Facility>("SELECT * FROM facilities WHERE id = ?")
                    .bind(facility_id)
                    .fetch_optional(&self.db)
                    .await?
            }
            None => None,
        };

        Ok(TripDetails {
            trip,
            rider_profile,
            managed_client,
            facility,
        })
    }

    pub async fn accept(&self, trip_id: &str, driver_id: &str) -> Result<Trip, TripError> {
        let trip = self.find_visible(trip_id, driver_id).await?;
        self.guard(&trip, TripAction::Accept, driver_id)?;
        self.dispatch.accept_trip(trip_id, driver_id).await?;
        self.find_visible(trip_id, driver_id).await
    }

    pub async fn reject(&self, trip_id: &str, driver_id: &str) -> Result<Trip, TripError> {
        let trip = self.find_visible(trip_id, driver_id).await?;
        self.guard(&trip, TripAction::Reject, driver_id)?;
        self.dispatch.reject_trip(trip_id, driver_id).await?;
        self.find_visible(trip_id, driver_id).await
    }

    pub async fn start(&self, trip_id: &str, driver_id: &str) -> Result<Trip, TripError> {
        let trip = self.find_visible(trip_id, driver_id).await?;
        self.guard(&trip, TripAction::Start, driver_id)?;

        let result = sqlx::query(
            "UPDATE trips SET status = ?, actual_pickup_time = ? \
             WHERE id = ? AND driver_id = ? AND status = ?",
        )
        .bind(TripStatus::InProgress)
        .bind(Utc::now())
        .bind(trip_id)
        .bind(driver_id)
        .bind(TripStatus::Upcoming)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TripError::TransitionFailed(
                "trip was reassigned or already started".into(),
            ));
        }
        info!(trip_id, driver_id, "trip started");
        self.find_visible(trip_id, driver_id).await
    }

    /// Pickup-arrival sub-step while in progress: confirms the pickup
    /// timestamp if the start transition somehow left it unset.
    pub async fn arrive_pickup(&self, trip_id: &str, driver_id: &str) -> Result<Trip, TripError> {
        let trip = self.find_visible(trip_id, driver_id).await?;
        self.guard(&trip, TripAction::ArrivePickup, driver_id)?;

        let result = sqlx::query(
            "UPDATE trips SET actual_pickup_time = COALESCE(actual_pickup_time, ?) \
             WHERE id = ? AND driver_id = ? AND status = ?",
        )
        .bind(Utc::now())
        .bind(trip_id)
        .bind(driver_id)
        .bind(TripStatus::InProgress)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TripError::TransitionFailed(
                "trip is no longer in progress".into(),
            ));
        }
        self.find_visible(trip_id, driver_id).await
    }

    pub async fn complete(
        &self,
        trip_id: &str,
        driver_id: &str,
        feedback: Option<&str>,
        signature: &str,
    ) -> Result<Trip, TripError> {
        // Rejected locally before any store access.
        if signature.trim().is_empty() {
            return Err(TripError::IncompleteSubmission("signature is required".into()));
        }

        let trip = self.find_visible(trip_id, driver_id).await?;
        self.guard(&trip, TripAction::Complete, driver_id)?;

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE trips SET status = ?, actual_dropoff_time = ?, trip_completed_at = ?, \
             driver_feedback = ?, driver_signature = ? \
             WHERE id = ? AND driver_id = ? AND status = ?",
        )
        .bind(TripStatus::Completed)
        .bind(now)
        .bind(now)
        .bind(feedback)
        .bind(signature)
        .bind(trip_id)
        .bind(driver_id)
        .bind(TripStatus::InProgress)
        .execute(&self.db)
        .await?;

        // Zero affected rows means another process already completed or
        // reassigned the trip; that is a failure, not success.
        if result.rows_affected() == 0 {
            return Err(TripError::TransitionFailed(
                "trip was already completed or reassigned".into(),
            ));
        }
        info!(trip_id, driver_id, "trip completed");
        self.find_visible(trip_id, driver_id).await
    }

    /// Tracking sample. The status predicate lives in the UPDATE itself, so
    /// a sample that arrives after the trip left `in_progress` writes
    /// nothing; it is dropped, not queued or retried.
    pub async fn record_location(
        &self,
        trip_id: &str,
        driver_id: &str,
        lat: f64,
        lng: f64,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), TripError> {
        let at = at.unwrap_or_else(Utc::now);
        let result = sqlx::query(
            "UPDATE trips SET driver_location_lat = ?, driver_location_lng = ?, \
             driver_location_at = ? \
             WHERE id = ? AND driver_id = ? AND status = ?",
        )
        .bind(lat)
        .bind(lng)
        .bind(at)
        .bind(trip_id)
        .bind(driver_id)
        .bind(TripStatus::InProgress)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            debug!(trip_id, "dropped location sample for trip not in progress");
        }
        Ok(())
    }

    /// An action is legal iff the (status, action) pair is in the lifecycle
    /// table and the caller holds the assignment.
    fn guard(&self, trip: &Trip, action: TripAction, driver_id: &str) -> Result<TripStatus, TripError> {
        let next = transition(trip.status, action).ok_or(TripError::InvalidTransition {
            status: trip.status,
            action,
        })?;
        if !trip.is_assigned_to(driver_id) {
            return Err(TripError::NotAuthorized);
        }
        Ok(next)
    }
}
