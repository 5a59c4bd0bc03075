use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TripStatus {
    Pending,
    AwaitingDriverAcceptance,
    Upcoming,
    InProgress,
    Completed,
    Rejected,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Pending => "pending",
            TripStatus::AwaitingDriverAcceptance => "awaiting_driver_acceptance",
            TripStatus::Upcoming => "upcoming",
            TripStatus::InProgress => "in_progress",
            TripStatus::Completed => "completed",
            TripStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(TripStatus::Pending),
            "awaiting_driver_acceptance" => Some(TripStatus::AwaitingDriverAcceptance),
            "upcoming" => Some(TripStatus::Upcoming),
            "in_progress" => Some(TripStatus::InProgress),
            "completed" => Some(TripStatus::Completed),
            "rejected" => Some(TripStatus::Rejected),
            _ => None,
        }
    }

    /// `completed` and `rejected` are absorbing: nothing transitions out.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Rejected)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripAction {
    Accept,
    Reject,
    Start,
    ArrivePickup,
    Complete,
}

impl TripAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripAction::Accept => "accept",
            TripAction::Reject => "reject",
            TripAction::Start => "start",
            TripAction::ArrivePickup => "arrive_pickup",
            TripAction::Complete => "complete",
        }
    }
}

impl fmt::Display for TripAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The legal trip lifecycle. A pair absent from this table is an illegal
/// transition, whatever the caller or the store says.
pub fn transition(status: TripStatus, action: TripAction) -> Option<TripStatus> {
    use TripAction::*;
    use TripStatus::*;

    match (status, action) {
        (AwaitingDriverAcceptance, Accept) => Some(Upcoming),
        (AwaitingDriverAcceptance, Reject) => Some(Rejected),
        (Upcoming, Reject) => Some(Rejected),
        (Upcoming, Start) => Some(InProgress),
        // Pickup arrival flips the navigation leg, not the status.
        (InProgress, ArrivePickup) => Some(InProgress),
        (InProgress, Complete) => Some(Completed),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DriverLocation {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: String,
    pub driver_id: Option<String>,
    pub rejected_by_driver_id: Option<String>,
    pub user_id: Option<String>,
    pub managed_client_id: Option<String>,
    pub facility_id: Option<String>,
    pub status: TripStatus,
    pub pickup_time: DateTime<Utc>,
    pub actual_pickup_time: Option<DateTime<Utc>>,
    pub actual_dropoff_time: Option<DateTime<Utc>>,
    pub trip_completed_at: Option<DateTime<Utc>>,
    pub pickup_address: String,
    pub destination_address: String,
    pub special_requirements: Option<String>,
    pub wheelchair_type: Option<String>,
    pub is_round_trip: bool,
    pub distance: Option<f64>,
    pub price: Option<f64>,
    pub driver_feedback: Option<String>,
    pub driver_signature: Option<String>,
    pub driver_location_lat: Option<f64>,
    pub driver_location_lng: Option<f64>,
    pub driver_location_at: Option<DateTime<Utc>>,
}

impl Trip {
    pub fn driver_location(&self) -> Option<DriverLocation> {
        match (
            self.driver_location_lat,
            self.driver_location_lng,
            self.driver_location_at,
        ) {
            (Some(lat), Some(lng), Some(timestamp)) => Some(DriverLocation {
                lat,
                lng,
                timestamp,
            }),
            _ => None,
        }
    }

    pub fn is_assigned_to(&self, driver_id: &str) -> bool {
        self.driver_id.as_deref() == Some(driver_id)
    }
}
