use chrono::Utc;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::driver::{DriverProfile, ProfileForm};

/// Driver account profile: contact, license, and vehicle details the driver
/// maintains themselves. The account row already exists by the time a driver
/// can reach this, so updates never insert.
#[derive(Clone)]
pub struct ProfileService {
    db: DbPool,
}

impl ProfileService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn get(&self, driver_id: &str) -> Result<DriverProfile, AppError> {
        sqlx::query_as::<_, DriverProfile>("SELECT * FROM drivers WHERE id = ?")
            .bind(driver_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update(
        &self,
        driver_id: &str,
        form: &ProfileForm,
    ) -> Result<DriverProfile, AppError> {
        let result = sqlx::query(
            "UPDATE drivers SET \
                 first_name = ?, last_name = ?, full_name = ?, phone_number = ?, \
                 address = ?, emergency_contact = ?, driver_license_number = ?, \
                 driver_license_expiry = ?, vehicle_make = ?, vehicle_model = ?, \
                 vehicle_year = ?, vehicle_color = ?, vehicle_license_plate = ?, \
                 vehicle_insurance_policy = ?, vehicle_insurance_expiry = ?, \
                 is_available = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&form.first_name)
        .bind(&form.last_name)
        .bind(form.full_name())
        .bind(&form.phone_number)
        .bind(&form.address)
        .bind(&form.emergency_contact)
        .bind(&form.driver_license_number)
        .bind(&form.driver_license_expiry)
        .bind(&form.vehicle_make)
        .bind(&form.vehicle_model)
        .bind(&form.vehicle_year)
        .bind(&form.vehicle_color)
        .bind(&form.vehicle_license_plate)
        .bind(&form.vehicle_insurance_policy)
        .bind(&form.vehicle_insurance_expiry)
        .bind(form.is_available)
        .bind(Utc::now())
        .bind(driver_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        self.get(driver_id).await
    }
}
