use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::trip::Trip;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RiderProfile {
    pub id: String,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ManagedClient {
    pub id: String,
    pub facility_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub special_needs: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Facility {
    pub id: String,
    pub name: String,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
}

/// A trip enriched with the rider/facility context the detail view shows.
#[derive(Debug, Clone, Serialize)]
pub struct TripDetails {
    pub trip: Trip,
    pub rider_profile: Option<RiderProfile>,
    pub managed_client: Option<ManagedClient>,
    pub facility: Option<Facility>,
}

impl TripDetails {
    /// Managed client wins over the rider profile, names win over emails.
    pub fn client_name(&self) -> String {
        if let Some(client) = &self.managed_client {
            if let (Some(first), Some(last)) = (&client.first_name, &client.last_name) {
                return format!("{first} {last}");
            }
            if let Some(email) = &client.email {
                return email.clone();
            }
            return "Managed Client".to_string();
        }
        if let Some(profile) = &self.rider_profile {
            if let Some(full) = &profile.full_name {
                return full.clone();
            }
            if let (Some(first), Some(last)) = (&profile.first_name, &profile.last_name) {
                return format!("{first} {last}");
            }
            if let Some(email) = &profile.email {
                return email.clone();
            }
            return "Individual Client".to_string();
        }
        "Unknown Client".to_string()
    }

    pub fn client_phone(&self) -> String {
        self.managed_client
            .as_ref()
            .and_then(|client| client.phone.clone())
            .unwrap_or_else(|| "Not provided".to_string())
    }

    pub fn client_email(&self) -> String {
        self.managed_client
            .as_ref()
            .and_then(|client| client.email.clone())
            .or_else(|| {
                self.rider_profile
                    .as_ref()
                    .and_then(|profile| profile.email.clone())
            })
            .unwrap_or_else(|| "Not provided".to_string())
    }
}
