//! Landing pages: counts for admins, the latest appointments for everyone else.

use futures::join;
use log::{error, info};

use super::{PageError, Services};
use crate::api::{ApiError, ListQuery};
use crate::consts::RECENT_APPOINTMENTS_LIMIT;
use crate::models::{Appointment, Role, User};
use crate::utils::error_messages::{APPOINTMENTS_FETCH_FAILED, STATS_PARTIAL};

/// Headline counts. `None` when that count could not be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: Option<u64>,
    pub doctors: Option<u64>,
    pub patients: Option<u64>,
    pub appointments: Option<u64>,
}

impl AdminStats {
    /// Issues the four counts together. A failed count does not hide the others.
    pub async fn load(services: &Services) -> Result<Self, PageError> {
        let viewer = services.current_user()?;
        if viewer.role != Role::Admin {
            return Err(PageError::Forbidden(viewer.role));
        }

        let users = &services.users;
        let everyone = ListQuery::default();
        let doctor_query = ListQuery::role(Role::Doctor);
        let patient_query = ListQuery::role(Role::Patient);
        let (total_users, doctors, patients, appointments) = join!(
            users.list(&everyone),
            users.list(&doctor_query),
            users.list(&patient_query),
            services.appointments.list(&everyone),
        );

        let stats = Self {
            total_users: count("users", total_users.map(|list| list.total)),
            doctors: count("doctors", doctors.map(|list| list.total)),
            patients: count("patients", patients.map(|list| list.total)),
            appointments: count("appointments", appointments.map(|list| list.total)),
        };
        if !stats.is_complete() {
            services.notifier.error(STATS_PARTIAL);
        }
        Ok(stats)
    }

    pub fn is_complete(&self) -> bool {
        [self.total_users, self.doctors, self.patients, self.appointments]
            .iter()
            .all(Option::is_some)
    }

    /// `(label, shown value)` pairs, "N/A" for what could not be loaded.
    pub fn cards(&self) -> [(&'static str, String); 4] {
        let shown = |value: Option<u64>| value.map_or_else(|| "N/A".to_string(), |v| v.to_string());
        [
            ("Total Users", shown(self.total_users)),
            ("Doctors", shown(self.doctors)),
            ("Patients", shown(self.patients)),
            ("Appointments", shown(self.appointments)),
        ]
    }
}

fn count(what: &str, outcome: Result<u64, ApiError>) -> Option<u64> {
    outcome
        .map_err(|e| error!("Failed to count {what}: {e}"))
        .ok()
}

/// Doctor and patient landing page.
pub struct MemberDashboard {
    pub user: User,
    pub recent: Vec<Appointment>,
}

impl MemberDashboard {
    pub async fn load(services: &Services) -> Result<Self, PageError> {
        let user = services.current_user()?;
        if user.role == Role::Admin {
            return Err(PageError::Forbidden(user.role));
        }

        let recent = match services
            .appointments
            .list(&ListQuery::limit(RECENT_APPOINTMENTS_LIMIT))
            .await
        {
            Ok(list) => list.appointments,
            Err(e) => {
                error!("Failed to fetch recent appointments: {e}");
                services.notifier.error(APPOINTMENTS_FETCH_FAILED);
                Vec::new()
            }
        };
        info!("Dashboard of {} shows {} appointments", user.email, recent.len());
        Ok(Self { user, recent })
    }

    pub fn greeting(&self) -> String {
        match self.user.role {
            Role::Doctor => format!("Welcome back, Dr. {}", self.user.full_name),
            _ => format!("Welcome back, {}", self.user.full_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{offline, respond};
    use crate::notify::Notification;
    use crate::pages::fixtures::{services_as, user};
    use serde_json::json;

    fn role_of(request: &crate::api::ApiRequest) -> Option<&str> {
        request
            .query
            .iter()
            .find(|(key, _)| key == "role")
            .map(|(_, value)| value.as_str())
    }

    #[tokio::test]
    async fn test_admin_stats() {
        let (services, transport, notifier) = services_as(&user("a1", Role::Admin, "Ada"), |request| {
            match (request.path.as_str(), role_of(request)) {
                ("/users", Some("doctor")) => respond(200, json!({"users": [], "total": 3})),
                ("/users", Some("patient")) => respond(200, json!({"users": [], "total": 10})),
                ("/users", _) => respond(200, json!({"users": [], "total": 14})),
                _ => respond(200, json!({"appointments": [], "total": 7})),
            }
        });

        let stats = AdminStats::load(&services).await.unwrap();

        assert_eq!(
            stats,
            AdminStats {
                total_users: Some(14),
                doctors: Some(3),
                patients: Some(10),
                appointments: Some(7),
            }
        );
        assert_eq!(transport.requests().len(), 4);
        assert!(notifier.take().is_empty());
    }

    #[tokio::test]
    async fn test_failed_count_is_unavailable() {
        let (services, _, notifier) = services_as(&user("a1", Role::Admin, "Ada"), |request| {
            match (request.path.as_str(), role_of(request)) {
                ("/users", Some("doctor")) => offline(),
                ("/users", _) => respond(200, json!({"users": [], "total": 5})),
                _ => respond(500, json!({})),
            }
        });

        let stats = AdminStats::load(&services).await.unwrap();

        assert_eq!(stats.doctors, None);
        assert_eq!(stats.appointments, None);
        assert_eq!(stats.patients, Some(5));
        assert_eq!(stats.cards()[1], ("Doctors", "N/A".to_string()));
        assert_eq!(notifier.take(), vec![Notification::error(STATS_PARTIAL)]);
    }

    #[tokio::test]
    async fn test_stats_are_admin_only() {
        let (services, transport, _) =
            services_as(&user("d1", Role::Doctor, "Ana"), |_| respond(200, json!({})));
        assert!(AdminStats::load(&services).await.is_err());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_recent_appointments_are_limited() {
        let (services, transport, _) = services_as(&user("d1", Role::Doctor, "Ana"), |_| {
            respond(200, json!({"appointments": [{
                "_id": "a1",
                "appointmentDate": "2025-03-05T00:00:00.000Z",
                "appointmentTime": "10:00",
                "status": "pending"
            }]}))
        });

        let dashboard = MemberDashboard::load(&services).await.unwrap();

        assert_eq!(dashboard.recent.len(), 1);
        assert_eq!(dashboard.greeting(), "Welcome back, Dr. Ana");
        assert_eq!(
            transport.requests()[0].query,
            vec![("limit".to_string(), "5".to_string())]
        );
    }
}
