//! Route surface and route guard.
//!
//! Every screen of the portal is a [`Route`]. Access is decided from the
//! session snapshot alone: unauthenticated visitors are sent to the login
//! screen, authenticated users outside the route's roles go back to their
//! own home. Nothing here ever produces a "not found".

use log::{debug, info};
use std::str::FromStr;
use thiserror::Error;

use crate::models::Role;
use crate::session::Session;

pub const LANDING_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const DOCTOR_ONLY: &[Role] = &[Role::Doctor];
const PATIENT_ONLY: &[Role] = &[Role::Patient];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unknown role `{0}`")]
    UnknownRole(String),
    #[error("No route matches `{0}`")]
    NoMatch(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    Profile(Role),

    AdminDashboard,
    AdminUsers,
    AdminAnalytics,

    DoctorDashboard,
    DoctorPatients,
    DoctorAppointments,
    DoctorRecords,
    DoctorPrescriptions,

    PatientDashboard,
    PatientHistory,
    PatientAppointments,
    PatientMedications,
    PatientDoctors,
    PatientDoctor(String),
}

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    /// Any authenticated role.
    Authenticated,
    Roles(&'static [Role]),
}

impl Requirement {
    /// Roles the guard checks, `None` meaning "any role".
    pub fn roles(self) -> Option<&'static [Role]> {
        match self {
            Requirement::Roles(roles) => Some(roles),
            _ => None,
        }
    }
}

impl Route {
    /// Resolves a location. Unknown paths give `None`.
    pub fn parse(path: &str) -> Option<Route> {
        path.parse().ok()
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => LANDING_PATH.to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Register => REGISTER_PATH.to_string(),
            Route::Profile(role) => format!("/{role}/profile"),
            Route::AdminDashboard => "/admin".to_string(),
            Route::AdminUsers => "/admin/users".to_string(),
            Route::AdminAnalytics => "/admin/analytics".to_string(),
            Route::DoctorDashboard => "/doctor".to_string(),
            Route::DoctorPatients => "/doctor/patients".to_string(),
            Route::DoctorAppointments => "/doctor/appointments".to_string(),
            Route::DoctorRecords => "/doctor/records".to_string(),
            Route::DoctorPrescriptions => "/doctor/prescriptions".to_string(),
            Route::PatientDashboard => "/patient".to_string(),
            Route::PatientHistory => "/patient/history".to_string(),
            Route::PatientAppointments => "/patient/appointments".to_string(),
            Route::PatientMedications => "/patient/medications".to_string(),
            Route::PatientDoctors => "/patient/doctors".to_string(),
            Route::PatientDoctor(id) => format!("/patient/doctors/{id}"),
        }
    }

    /// The access policy itself: this table is the only place route
    /// permissions are defined.
    pub fn requirement(&self) -> Requirement {
        match self {
            Route::Landing | Route::Login | Route::Register => Requirement::Public,
            Route::Profile(_) => Requirement::Authenticated,
            Route::AdminDashboard | Route::AdminUsers | Route::AdminAnalytics => {
                Requirement::Roles(ADMIN_ONLY)
            }
            Route::DoctorDashboard
            | Route::DoctorPatients
            | Route::DoctorAppointments
            | Route::DoctorRecords
            | Route::DoctorPrescriptions => Requirement::Roles(DOCTOR_ONLY),
            Route::PatientDashboard
            | Route::PatientHistory
            | Route::PatientAppointments
            | Route::PatientMedications
            | Route::PatientDoctors
            | Route::PatientDoctor(_) => Requirement::Roles(PATIENT_ONLY),
        }
    }

    pub fn is_public(&self) -> bool {
        self.requirement() == Requirement::Public
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let no_match = || RouteError::NoMatch(path.to_string());
        let location = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = location.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Landing,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            [role, "profile"] => {
                let role =
                    Role::from_str(role).map_err(|_| RouteError::UnknownRole(role.to_string()))?;
                Route::Profile(role)
            }
            ["admin"] => Route::AdminDashboard,
            ["admin", "users"] => Route::AdminUsers,
            ["admin", "analytics"] => Route::AdminAnalytics,
            ["doctor"] => Route::DoctorDashboard,
            ["doctor", "patients"] => Route::DoctorPatients,
            ["doctor", "appointments"] => Route::DoctorAppointments,
            ["doctor", "records"] => Route::DoctorRecords,
            ["doctor", "prescriptions"] => Route::DoctorPrescriptions,
            ["patient"] => Route::PatientDashboard,
            ["patient", "history"] => Route::PatientHistory,
            ["patient", "appointments"] => Route::PatientAppointments,
            ["patient", "medications"] => Route::PatientMedications,
            ["patient", "doctors"] => Route::PatientDoctors,
            ["patient", "doctors", id] => Route::PatientDoctor(id.to_string()),
            _ => return Err(no_match()),
        };
        Ok(route)
    }
}

/// Landing screen of each role.
pub fn home_for_role(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::Doctor => "/doctor",
        Role::Patient => "/patient",
    }
}

/// Same as [`home_for_role`], for a role name coming from outside.
pub fn home_for_role_name(role: &str) -> Result<&'static str, RouteError> {
    Role::from_str(role)
        .map(home_for_role)
        .map_err(|_| RouteError::UnknownRole(role.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// `from` is the location the visitor asked for, kept so the login flow
    /// can send them back there.
    RedirectTo { path: String, from: Option<String> },
}

/// The route guard. `requested` is the location being visited.
pub fn can_access(session: &Session, required_roles: Option<&[Role]>, requested: &str) -> Access {
    let Some(user) = session.identity() else {
        debug!("Unauthenticated visit to {requested}, redirecting to login");
        return Access::RedirectTo {
            path: LOGIN_PATH.to_string(),
            from: Some(requested.to_string()),
        };
    };

    match required_roles {
        Some(roles) if !roles.contains(&user.role) => {
            info!(
                "{} ({}) is not allowed on {requested}, redirecting home",
                user.email, user.role
            );
            Access::RedirectTo {
                path: home_for_role(user.role).to_string(),
                from: None,
            }
        }
        _ => Access::Allow,
    }
}

/// What to show for a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect { to: String, from: Option<String> },
}

impl Navigation {
    fn redirect(to: &str) -> Self {
        Navigation::Redirect {
            to: to.to_string(),
            from: None,
        }
    }
}

/// Resolves a location against the session: public screens, the root and
/// the catch-all policy, then the guard for protected screens.
pub fn navigate(session: &Session, path: &str) -> Navigation {
    let home = session.identity().map(|user| home_for_role(user.role));

    let route = match Route::parse(path) {
        Some(route) => route,
        None => return Navigation::redirect(home.unwrap_or(LANDING_PATH)),
    };

    match (route.requirement(), home) {
        (Requirement::Public, Some(home)) => Navigation::redirect(home),
        (Requirement::Public, None) => Navigation::Render(route),
        (requirement, _) => match can_access(session, requirement.roles(), path) {
            Access::Allow => Navigation::Render(route),
            Access::RedirectTo { path, from } => Navigation::Redirect { to: path, from },
        },
    }
}
