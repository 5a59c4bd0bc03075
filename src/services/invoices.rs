use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::invoice::{EarningsSummary, Invoice};
use crate::models::trip::TripStatus;

/// Invoice and earnings views. Read-only: amounts are attributed elsewhere,
/// this portal only reports them.
#[derive(Clone)]
pub struct InvoiceService {
    db: DbPool,
}

impl InvoiceService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn list_for_driver(&self, driver_id: &str) -> Result<Vec<Invoice>, AppError> {
        let invoices = sqlx::query_as::<_, Invoice>(
            "SELECT * FROM invoices WHERE driver_id = ? ORDER BY issued_at DESC",
        )
        .bind(driver_id)
        .fetch_all(&self.db)
        .await?;
        Ok(invoices)
    }

    pub async fn find_for_driver(
        &self,
        invoice_id: &str,
        driver_id: &str,
    ) -> Result<Invoice, AppError> {
        sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = ? AND driver_id = ?")
            .bind(invoice_id)
            .bind(driver_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn earnings_summary(&self, driver_id: &str) -> Result<EarningsSummary, AppError> {
        let (completed_trips, total_earnings): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(price), 0.0) FROM trips \
             WHERE driver_id = ? AND status = ?",
        )
        .bind(driver_id)
        .bind(TripStatus::Completed)
        .fetch_one(&self.db)
        .await?;

        // Buckets run from calendar boundaries: midnight today, the most
        // recent Sunday, and the first of the current month.
        let today = Utc::now().date_naive();
        let today_start = today.and_time(NaiveTime::MIN).and_utc();
        let week_start =
            today_start - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
        let month_start = today
            .with_day(1)
            .expect("the first of the current month is a valid date")
            .and_time(NaiveTime::MIN)
            .and_utc();

        let today_earnings = self.earnings_since(driver_id, today_start).await?;
        let week_earnings = self.earnings_since(driver_id, week_start).await?;
        let month_earnings = self.earnings_since(driver_id, month_start).await?;

        Ok(EarningsSummary {
            completed_trips,
            total_earnings,
            today_earnings,
            week_earnings,
            month_earnings,
        })
    }

    async fn earnings_since(
        &self,
        driver_id: &str,
        since: DateTime<Utc>,
    ) -> Result<f64, AppError> {
        let sum: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(price), 0.0) FROM trips \
             WHERE driver_id = ? AND status = ? AND actual_dropoff_time >= ?",
        )
        .bind(driver_id)
        .bind(TripStatus::Completed)
        .bind(since)
        .fetch_one(&self.db)
        .await?;
        Ok(sum)
    }
}
