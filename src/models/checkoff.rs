use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleCheckoff {
    pub id: String,
    pub driver_id: String,
    pub checkoff_date: NaiveDate,
    pub vehicle_id: Option<String>,
    pub exterior_condition: bool,
    pub tires_condition: bool,
    pub lights_working: bool,
    pub mirrors_clean: bool,
    pub windshield_clean: bool,
    pub fluid_levels: bool,
    pub brakes_working: bool,
    pub horn_working: bool,
    pub seatbelts_working: bool,
    pub emergency_equipment: bool,
    pub wheelchair_lift_working: bool,
    pub wheelchair_securements: bool,
    pub interior_clean: bool,
    pub seats_clean: bool,
    pub floor_clean: bool,
    pub registration_current: bool,
    pub insurance_current: bool,
    pub inspection_current: bool,
    pub notes: Option<String>,
    pub issues_found: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// The daily pre-trip inspection form as submitted by a driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoffForm {
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub exterior_condition: bool,
    #[serde(default)]
    pub tires_condition: bool,
    #[serde(default)]
    pub lights_working: bool,
    #[serde(default)]
    pub mirrors_clean: bool,
    #[serde(default)]
    pub windshield_clean: bool,
    #[serde(default)]
    pub fluid_levels: bool,
    #[serde(default)]
    pub brakes_working: bool,
    #[serde(default)]
    pub horn_working: bool,
    #[serde(default)]
    pub seatbelts_working: bool,
    #[serde(default)]
    pub emergency_equipment: bool,
    #[serde(default)]
    pub wheelchair_lift_working: bool,
    #[serde(default)]
    pub wheelchair_securements: bool,
    #[serde(default)]
    pub interior_clean: bool,
    #[serde(default)]
    pub seats_clean: bool,
    #[serde(default)]
    pub floor_clean: bool,
    #[serde(default)]
    pub registration_current: bool,
    #[serde(default)]
    pub insurance_current: bool,
    #[serde(default)]
    pub inspection_current: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub issues_found: Option<String>,
}

impl CheckoffForm {
    /// Safety items that get flagged back to the driver when unchecked.
    /// A failure here does not block submission.
    pub fn critical_failures(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if !self.exterior_condition {
            failed.push("exterior_condition");
        }
        if !self.tires_condition {
            failed.push("tires_condition");
        }
        if !self.lights_working {
            failed.push("lights_working");
        }
        if !self.brakes_working {
            failed.push("brakes_working");
        }
        if !self.seatbelts_working {
            failed.push("seatbelts_working");
        }
        failed
    }
}
