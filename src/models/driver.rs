use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DriverRole {
    #[default]
    #[serde(rename = "driver")]
    Driver,
    #[serde(rename = "dispatcher")]
    Dispatcher,
}

impl DriverRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverRole::Driver => "driver",
            DriverRole::Dispatcher => "dispatcher",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "driver" => Some(DriverRole::Driver),
            "dispatcher" => Some(DriverRole::Dispatcher),
            _ => None,
        }
    }
}

impl fmt::Display for DriverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// The editable slice of a driver's account: contact details, license and
/// vehicle information, and the availability flag.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DriverProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub driver_license_number: Option<String>,
    pub driver_license_expiry: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_year: Option<String>,
    pub vehicle_color: Option<String>,
    pub vehicle_license_plate: Option<String>,
    pub vehicle_insurance_policy: Option<String>,
    pub vehicle_insurance_expiry: Option<String>,
    pub is_available: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub driver_license_number: Option<String>,
    #[serde(default)]
    pub driver_license_expiry: Option<String>,
    #[serde(default)]
    pub vehicle_make: Option<String>,
    #[serde(default)]
    pub vehicle_model: Option<String>,
    #[serde(default)]
    pub vehicle_year: Option<String>,
    #[serde(default)]
    pub vehicle_color: Option<String>,
    #[serde(default)]
    pub vehicle_license_plate: Option<String>,
    #[serde(default)]
    pub vehicle_insurance_policy: Option<String>,
    #[serde(default)]
    pub vehicle_insurance_expiry: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl ProfileForm {
    /// Display name derived from the name fields, as the account metadata
    /// stores it.
    pub fn full_name(&self) -> Option<String> {
        let joined = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub driver_id: String,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
