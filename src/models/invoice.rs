use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub driver_id: String,
    pub trip_id: Option<String>,
    pub amount: f64,
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Earnings rollup over a driver's completed trips. Read-only to this portal.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EarningsSummary {
    pub completed_trips: i64,
    pub total_earnings: f64,
    pub today_earnings: f64,
    pub week_earnings: f64,
    pub month_earnings: f64,
}
