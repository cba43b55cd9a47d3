//! Side navigation of each role.

use crate::authorization::Route;
use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub path: &'static str,
}

const fn item(label: &'static str, path: &'static str) -> MenuItem {
    MenuItem { label, path }
}

const ADMIN_MENU: &[MenuItem] = &[
    item("Dashboard", "/admin"),
    item("Manage Users", "/admin/users"),
    item("Analytics", "/admin/analytics"),
];

const DOCTOR_MENU: &[MenuItem] = &[
    item("Dashboard", "/doctor"),
    item("My Patients", "/doctor/patients"),
    item("Appointments", "/doctor/appointments"),
    item("Medical Records", "/doctor/records"),
    item("Prescriptions", "/doctor/prescriptions"),
];

const PATIENT_MENU: &[MenuItem] = &[
    item("Dashboard", "/patient"),
    item("Medical History", "/patient/history"),
    item("Medications", "/patient/medications"),
    item("Appointments", "/patient/appointments"),
    item("Doctors", "/patient/doctors"),
];

pub fn menu_for(role: Role) -> &'static [MenuItem] {
    match role {
        Role::Admin => ADMIN_MENU,
        Role::Doctor => DOCTOR_MENU,
        Role::Patient => PATIENT_MENU,
    }
}

/// Menu entry shown as active for `current`.
pub fn active_item(role: Role, current: &str) -> Option<MenuItem> {
    let current = Route::parse(current)?.path();
    menu_for(role).iter().copied().find(|item| item.path == current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::{can_access, Access};
    use crate::pages::fixtures::user;
    use crate::session::Session;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_menu_entry_is_reachable_by_its_role() {
        for role in Role::iter() {
            let session = Session::authenticated(user("u1", role, "Someone"), "jwt");
            for entry in menu_for(role) {
                let route = Route::parse(entry.path);
                assert!(route.is_some(), "Menu path {} does not resolve !", entry.path);

                let roles = route.unwrap().requirement().roles();
                assert_eq!(
                    can_access(&session, roles, entry.path),
                    Access::Allow,
                    "{} cannot open its own menu entry {} !",
                    role,
                    entry.path
                );
            }
        }
    }

    #[test]
    fn test_active_item() {
        assert_eq!(
            active_item(Role::Doctor, "/doctor/records/").map(|item| item.label),
            Some("Medical Records")
        );
        assert_eq!(active_item(Role::Patient, "/patient/doctors/d1"), None);
    }
}
