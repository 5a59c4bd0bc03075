use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::checkoff::{CheckoffForm, VehicleCheckoff};

/// Daily pre-trip inspection records. One row per (driver, calendar day);
/// resubmitting the same day updates in place, the later values win.
#[derive(Clone)]
pub struct CheckoffService {
    db: DbPool,
}

impl CheckoffService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn find_for_date(
        &self,
        driver_id: &str,
        date: NaiveDate,
    ) -> Result<Option<VehicleCheckoff>, AppError> {
        let checkoff = sqlx::query_as::<_, VehicleCheckoff>(
            "SELECT * FROM vehicle_checkoffs WHERE driver_id = ? AND checkoff_date = ?",
        )
        .bind(driver_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;
        Ok(checkoff)
    }

    pub async fn upsert(
        &self,
        driver_id: &str,
        date: NaiveDate,
        form: &CheckoffForm,
    ) -> Result<VehicleCheckoff, AppError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO vehicle_checkoffs (\
                 id, driver_id, checkoff_date, vehicle_id, \
                 exterior_condition, tires_condition, lights_working, mirrors_clean, \
                 windshield_clean, fluid_levels, brakes_working, horn_working, \
                 seatbelts_working, emergency_equipment, wheelchair_lift_working, \
                 wheelchair_securements, interior_clean, seats_clean, floor_clean, \
                 registration_current, insurance_current, inspection_current, \
                 notes, issues_found, submitted_at\
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (driver_id, checkoff_date) DO UPDATE SET \
                 vehicle_id = excluded.vehicle_id, \
                 exterior_condition = excluded.exterior_condition, \
                 tires_condition = excluded.tires_condition, \
                 lights_working = excluded.lights_working, \
                 mirrors_clean = excluded.mirrors_clean, \
                 windshield_clean = excluded.windshield_clean, \
                 fluid_levels = excluded.fluid_levels, \
                 brakes_working = excluded.brakes_working, \
                 horn_working = excluded.horn_working, \
                 seatbelts_working = excluded.seatbelts_working, \
                 emergency_equipment = excluded.emergency_equipment, \
                 wheelchair_lift_working = excluded.wheelchair_lift_working, \
                 wheelchair_securements = excluded.wheelchair_securements, \
                 interior_clean = excluded.interior_clean, \
                 seats_clean = excluded.seats_clean, \
                 floor_clean = excluded.floor_clean, \
                 registration_current = excluded.registration_current, \
                 insurance_current = excluded.insurance_current, \
                 inspection_current = excluded.inspection_current, \
                 notes = excluded.notes, \
                 issues_found = excluded.issues_found, \
                 submitted_at = excluded.submitted_at",
        )
        .bind(&id)
        .bind(driver_id)
        .bind(date)
        .bind(&form.vehicle_id)
        .bind(form.exterior_condition)
        .bind(form.tires_condition)
        .bind(form.lights_working)
        .bind(form.mirrors_clean)
        .bind(form.windshield_clean)
        .bind(form.fluid_levels)
        .bind(form.brakes_working)
        .bind(form.horn_working)
        .bind(form.seatbelts_working)
        .bind(form.emergency_equipment)
        .bind(form.wheelchair_lift_working)
        .bind(form.wheelchair_securements)
        .bind(form.interior_clean)
        .bind(form.seats_clean)
        .bind(form.floor_clean)
        .bind(form.registration_current)
        .bind(form.insurance_current)
        .bind(form.inspection_current)
        .bind(&form.notes)
        .bind(&form.issues_found)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        self.find_for_date(driver_id, date)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn count_for_driver(&self, driver_id: &str) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM vehicle_checkoffs WHERE driver_id = ?")
                .bind(driver_id)
                .fetch_one(&self.db)
                .await?;
        Ok(count)
    }
}
