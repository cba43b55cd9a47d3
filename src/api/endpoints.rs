//! Typed endpoint groups of the portal API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ApiClient, ApiError};
use crate::models::{Appointment, MedicalRecord, NewUser, Prescription, Role, User};
use crate::session::Authenticator;

/// Common filters of the list endpoints. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub role: Option<Role>,
    pub limit: Option<u32>,
    pub status: Option<String>,
}

impl ListQuery {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(role) = self.role {
            pairs.push(("role".to_string(), role.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
struct PatientList {
    #[serde(default)]
    patients: Vec<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentList {
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordList {
    #[serde(default)]
    pub records: Vec<MedicalRecord>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrescriptionList {
    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
struct AppointmentEnvelope {
    appointment: Appointment,
}

#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    record: MedicalRecord,
}

#[derive(Debug, Deserialize)]
struct PrescriptionEnvelope {
    prescription: Prescription,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    #[serde(flatten)]
    user: &'a NewUser,
    password: &'a str,
}

/// `/auth`
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.client
            .post("/auth/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn register(&self, user: &NewUser, password: &str) -> Result<Value, ApiError> {
        self.client
            .post("/auth/register", &RegisterBody { user, password })
            .await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.client.get("/auth/me", Vec::new()).await?;
        Ok(envelope.user)
    }
}

#[async_trait]
impl Authenticator for AuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        AuthApi::login(self, email, password).await
    }

    async fn register(&self, user: &NewUser, password: &str) -> Result<(), ApiError> {
        AuthApi::register(self, user, password).await.map(|_| ())
    }
}

/// `/users`
#[derive(Clone)]
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<UserList, ApiError> {
        self.client.get("/users", query.to_pairs()).await
    }

    pub async fn get(&self, id: &str) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.client.get(&format!("/users/{id}"), Vec::new()).await?;
        Ok(envelope.user)
    }

    pub async fn update(&self, id: &str, data: &Value) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.client.put(&format!("/users/{id}"), data).await?;
        Ok(envelope.user)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/users/{id}")).await
    }

    pub async fn assign_doctor(&self, patient_id: &str, doctor_id: &str) -> Result<Value, ApiError> {
        self.client
            .put(
                &format!("/users/{patient_id}/assign-doctor"),
                &json!({ "doctorId": doctor_id }),
            )
            .await
    }

    pub async fn doctor_patients(&self, doctor_id: &str) -> Result<Vec<User>, ApiError> {
        let list: PatientList = self
            .client
            .get(&format!("/users/doctor/{doctor_id}/patients"), Vec::new())
            .await?;
        Ok(list.patients)
    }
}

/// `/appointments`
#[derive(Clone)]
pub struct AppointmentsApi {
    client: ApiClient,
}

impl AppointmentsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, data: &Value) -> Result<Value, ApiError> {
        self.client.post("/appointments", data).await
    }

    pub async fn list(&self, query: &ListQuery) -> Result<AppointmentList, ApiError> {
        self.client.get("/appointments", query.to_pairs()).await
    }

    pub async fn get(&self, id: &str) -> Result<Appointment, ApiError> {
        let envelope: AppointmentEnvelope = self
            .client
            .get(&format!("/appointments/{id}"), Vec::new())
            .await?;
        Ok(envelope.appointment)
    }

    pub async fn update<B: Serialize + Sync + ?Sized>(
        &self,
        id: &str,
        data: &B,
    ) -> Result<Value, ApiError> {
        self.client.put(&format!("/appointments/{id}"), data).await
    }

    pub async fn cancel(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/appointments/{id}")).await
    }
}

/// `/medical-records`
#[derive(Clone)]
pub struct MedicalRecordsApi {
    client: ApiClient,
}

impl MedicalRecordsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, data: &Value) -> Result<Value, ApiError> {
        self.client.post("/medical-records", data).await
    }

    pub async fn list(&self, query: &ListQuery) -> Result<RecordList, ApiError> {
        self.client.get("/medical-records", query.to_pairs()).await
    }

    pub async fn get(&self, id: &str) -> Result<MedicalRecord, ApiError> {
        let envelope: RecordEnvelope = self
            .client
            .get(&format!("/medical-records/{id}"), Vec::new())
            .await?;
        Ok(envelope.record)
    }

    pub async fn update(&self, id: &str, data: &Value) -> Result<Value, ApiError> {
        self.client.put(&format!("/medical-records/{id}"), data).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/medical-records/{id}")).await
    }
}

/// `/prescriptions`
#[derive(Clone)]
pub struct PrescriptionsApi {
    client: ApiClient,
}

impl PrescriptionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, data: &Value) -> Result<Value, ApiError> {
        self.client.post("/prescriptions", data).await
    }

    pub async fn list(&self, query: &ListQuery) -> Result<PrescriptionList, ApiError> {
        self.client.get("/prescriptions", query.to_pairs()).await
    }

    pub async fn get(&self, id: &str) -> Result<Prescription, ApiError> {
        let envelope: PrescriptionEnvelope = self
            .client
            .get(&format!("/prescriptions/{id}"), Vec::new())
            .await?;
        Ok(envelope.prescription)
    }

    pub async fn update(&self, id: &str, data: &Value) -> Result<Value, ApiError> {
        self.client.put(&format!("/prescriptions/{id}"), data).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/prescriptions/{id}")).await
    }
}
