//! Data model shared by the session, the pages and the REST endpoints.
//!
//! Field names follow the JSON representation of the portal API
//! (`camelCase`, identifiers under `_id`).

use chrono::{DateTime, NaiveDate};
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum_macros::{EnumIter, EnumString};

/// Role of an account. Fixed at registration.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[display("admin")]
    Admin,
    #[display("doctor")]
    Doctor,
    #[display("patient")]
    Patient,
}

impl Role {
    /// Capitalised name, as shown in select boxes and badges.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Doctor => "Doctor",
            Role::Patient => "Patient",
        }
    }
}

/// An authenticated identity, as returned by `/auth/login` and `/auth/me`.
///
/// Role-specific attributes are optional. Whatever else the server sends is
/// kept in `extra` so that a local merge never drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[display("{full_name}")]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    // Doctor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub years_of_experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    // Patient
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Registration payload. Doctor attributes are only sent for doctors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
}

/// Counterpart reference inside an appointment, record or prescription.
/// The API either returns the bare id or the populated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Party {
    Populated(PartySummary),
    Ref(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

impl Party {
    pub fn id(&self) -> &str {
        match self {
            Party::Populated(summary) => &summary.id,
            Party::Ref(id) => id,
        }
    }

    pub fn full_name(&self) -> Option<&str> {
        match self {
            Party::Populated(summary) => summary.full_name.as_deref(),
            Party::Ref(_) => None,
        }
    }

    pub fn summary(&self) -> Option<&PartySummary> {
        match self {
            Party::Populated(summary) => Some(summary),
            Party::Ref(_) => None,
        }
    }
}

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppointmentStatus {
    #[display("scheduled")]
    Scheduled,
    #[display("pending")]
    Pending,
    #[display("completed")]
    Completed,
    #[display("cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub doctor_id: Option<Party>,
    #[serde(default)]
    pub patient_id: Option<Party>,
    pub appointment_date: String,
    #[serde(default)]
    pub appointment_time: String,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Appointment {
    /// `YYYY-MM-DD` part of the appointment date, suitable for a date input.
    pub fn date_part(&self) -> &str {
        date_part(&self.appointment_date)
    }

    /// Date in the `Mar 05, 2025` form, or the raw value when it cannot be parsed.
    pub fn display_date(&self) -> String {
        display_date(&self.appointment_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    #[serde(default, deserialize_with = "lenient_string")]
    pub blood_pressure: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub temperature: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub heart_rate: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub weight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub patient_id: Option<Party>,
    #[serde(default)]
    pub doctor_id: Option<Party>,
    pub visit_date: String,
    pub diagnosis: String,
    pub treatment: String,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub vital_signs: Option<VitalSigns>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub patient_id: Option<Party>,
    #[serde(default)]
    pub doctor_id: Option<Party>,
    #[serde(default)]
    pub date_prescribed: Option<String>,
}

/// Strips the time part of an ISO-8601 timestamp.
pub fn date_part(value: &str) -> &str {
    value.split('T').next().unwrap_or(value)
}

/// Formats an ISO date or timestamp as `Mar 05, 2025`.
pub fn display_date(value: &str) -> String {
    let date = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(date_part(value), "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%b %d, %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Accepts a JSON string or number (vitals and years of experience come back
/// either way) and keeps it as text.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a string or a number, got {other}"
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip_names() {
        assert_eq!(Role::from_str("doctor").unwrap(), Role::Doctor);
        assert_eq!(Role::Patient.to_string(), "patient");
        assert!(Role::from_str("nurse").is_err(), "Unknown role was accepted");
        assert_eq!(
            serde_json::to_value(Role::Admin).unwrap(),
            json!("admin")
        );
    }

    #[test]
    fn test_user_from_api_payload() {
        let user: User = serde_json::from_value(json!({
            "_id": "d1",
            "email": "doctor@healthcard.com",
            "fullName": "Dr. Ana Silva",
            "role": "doctor",
            "specialization": "Cardiology",
            "yearsOfExperience": 12,
            "createdAt": "2025-01-01T00:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(user.id, "d1");
        assert_eq!(user.role, Role::Doctor);
        assert_eq!(user.years_of_experience.as_deref(), Some("12"));
        assert_eq!(user.extra.get("createdAt"), Some(&json!("2025-01-01T00:00:00.000Z")));
        assert_eq!(user.to_string(), "Dr. Ana Silva");
    }

    #[test]
    fn test_user_with_unknown_role_is_rejected() {
        let result = serde_json::from_value::<User>(json!({
            "_id": "x",
            "email": "x@healthcard.com",
            "fullName": "X",
            "role": "superuser"
        }));
        assert!(result.is_err(), "User with unknown role was accepted");
    }

    #[test]
    fn test_party_variants() {
        let populated: Party =
            serde_json::from_value(json!({"_id": "d1", "fullName": "Ana"})).unwrap();
        let bare: Party = serde_json::from_value(json!("d2")).unwrap();

        assert_eq!(populated.id(), "d1");
        assert_eq!(populated.full_name(), Some("Ana"));
        assert_eq!(bare.id(), "d2");
        assert_eq!(bare.full_name(), None);
    }

    #[test]
    fn test_appointment_dates() {
        let appointment: Appointment = serde_json::from_value(json!({
            "_id": "a1",
            "doctorId": {"_id": "d1", "fullName": "Ana"},
            "patientId": "p1",
            "appointmentDate": "2025-03-05T00:00:00.000Z",
            "appointmentTime": "10:30",
            "status": "pending"
        }))
        .unwrap();

        assert_eq!(appointment.date_part(), "2025-03-05");
        assert_eq!(appointment.display_date(), "Mar 05, 2025");
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(display_date("not a date"), "not a date");
    }

    #[test]
    fn test_vitals_accept_numbers() {
        let vitals: VitalSigns =
            serde_json::from_value(json!({"heartRate": 72, "bloodPressure": "120/80"})).unwrap();
        assert_eq!(vitals.heart_rate.as_deref(), Some("72"));
        assert_eq!(vitals.blood_pressure.as_deref(), Some("120/80"));
        assert_eq!(vitals.weight, None);
    }
}
