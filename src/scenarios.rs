//! End-to-end walks through the portal, from the pages down to the scripted
//! transport.

use http::Method;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::api::testing::{respond, ScriptedTransport};
use crate::authorization::{navigate, Navigation};
use crate::forms::{Control, FormError};
use crate::models::Role;
use crate::notify::RecordingNotifier;
use crate::pages::appointments::AppointmentsBoard;
use crate::pages::auth::{LoginPage, RegisterPage};
use crate::pages::fixtures::{services_as, user, user_json};
use crate::pages::{PageError, Services};
use crate::session::SessionState;
use crate::storage::Storage;

fn logged_out(transport: Arc<ScriptedTransport>) -> Services {
    Services::new(
        transport,
        Arc::new(Storage::in_memory()),
        Arc::new(RecordingNotifier::default()),
    )
}

#[tokio::test]
async fn test_patient_login_then_admin_area_sends_home() {
    let transport = ScriptedTransport::new(|request| {
        let body = request.body.clone().unwrap_or_default();
        if body["email"] == json!("patient@healthcard.com") && body["password"] == json!("patient123") {
            respond(
                200,
                json!({"token": "jwt", "user": user_json("p1", Role::Patient, "Paula")}),
            )
        } else {
            respond(401, json!({"message": "Invalid credentials"}))
        }
    });
    let services = logged_out(transport.clone());

    let mut page = LoginPage::open(&services, None).unwrap();
    page.form_mut().set("email", "patient@healthcard.com").unwrap();
    page.form_mut().set("password", "patient123").unwrap();
    let next = page.submit(&services).await.unwrap();

    assert_eq!(next, "/patient");
    assert_eq!(services.session.state(), SessionState::Authenticated);
    assert_eq!(services.current_user().unwrap().role, Role::Patient);
    assert_eq!(transport.paths(), vec!["/auth/login"]);

    assert_eq!(
        navigate(&services.session.snapshot(), "/admin"),
        Navigation::Redirect {
            to: "/patient".to_string(),
            from: None
        }
    );
}

#[tokio::test]
async fn test_doctor_registration_without_license_is_blocked() {
    let transport = ScriptedTransport::new(|_| respond(201, json!({})));
    let services = logged_out(transport.clone());

    let mut page = RegisterPage::open().unwrap();
    let form = page.form_mut();
    form.set("fullName", "Dr. Ana").unwrap();
    form.set("email", "ana@healthcard.com").unwrap();
    form.set("role", "doctor").unwrap();
    form.set("specialization", "Cardiology").unwrap();
    form.set("password", "secret1").unwrap();
    form.set("confirmPassword", "secret1").unwrap();

    let result = page.submit(&services).await;

    assert!(matches!(
        result,
        Err(PageError::Form(FormError::Validation(_)))
    ));
    assert_eq!(
        page.form().error("licenseNumber"),
        Some("License number is required for doctors")
    );
    assert!(transport.requests().is_empty(), "A request was sent !");
}

#[tokio::test]
async fn test_prefilled_doctor_is_locked_and_only_free_fields_fail() {
    let (services, _, _) = services_as(&user("p1", Role::Patient, "Paula"), |_| {
        respond(200, json!({"appointments": []}))
    });
    let mut board = AppointmentsBoard::open(&services).await.unwrap();

    let form = board.start_new("d1").unwrap();
    let doctor = form
        .render()
        .into_iter()
        .find(|field| field.name == "doctorId")
        .unwrap();
    assert_eq!(
        doctor.control,
        Control::Locked {
            display: "Doctor already selected".to_string(),
            hidden_value: "d1".to_string(),
        }
    );

    match form.submit() {
        Err(FormError::Validation(errors)) => {
            assert_eq!(
                errors.fields().collect::<Vec<_>>(),
                vec!["appointmentDate", "appointmentTime", "reason"]
            );
        }
        other => panic!("Incomplete appointment was accepted: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_mid_session_sends_to_login() {
    let (services, _, _) = services_as(&user("d1", Role::Doctor, "Ana"), |request| {
        if request.method == Method::GET && request.path == "/appointments" {
            respond(401, json!({"message": "Token expired"}))
        } else {
            respond(200, json!({}))
        }
    });
    assert!(matches!(
        navigate(&services.session.snapshot(), "/doctor/appointments"),
        Navigation::Render(_)
    ));

    AppointmentsBoard::open(&services).await.unwrap();

    assert_eq!(services.session.state(), SessionState::Unauthenticated);
    assert_eq!(
        navigate(&services.session.snapshot(), "/doctor/appointments"),
        Navigation::Redirect {
            to: "/login".to_string(),
            from: Some("/doctor/appointments".to_string())
        }
    );
}

#[tokio::test]
async fn test_doctor_selector_search_and_pick() {
    let (services, transport, _) = services_as(&user("p1", Role::Patient, "Paula"), |request| {
        if request.path == "/users" {
            respond(
                200,
                json!({"users": [
                    user_json("d1", Role::Doctor, "Dr. Ana Silva"),
                    user_json("d2", Role::Doctor, "Dr. Bruno Costa"),
                    user_json("d3", Role::Doctor, "Dr. Mariana Lopes"),
                ]}),
            )
        } else {
            respond(200, json!({"appointments": []}))
        }
    });
    let board = AppointmentsBoard::open(&services).await.unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let (on_select, on_close) = (events.clone(), events.clone());
    let mut selector = board
        .doctor_selector(
            move |id| on_select.lock().unwrap().push(format!("select:{id}")),
            move || on_close.lock().unwrap().push("close".to_string()),
        )
        .unwrap();
    selector.load(&services.users).await;

    selector.set_search("ana");
    let names: Vec<&str> = selector
        .filtered()
        .iter()
        .map(|doctor| doctor.full_name.as_str())
        .collect();
    assert_eq!(names, vec!["Dr. Ana Silva", "Dr. Mariana Lopes"]);

    selector.select("d3").unwrap();
    selector.close();

    assert_eq!(*events.lock().unwrap(), vec!["select:d3", "close"]);
    assert!(!selector.is_open());
    assert!(transport
        .requests()
        .iter()
        .any(|request| request.query == vec![("role".to_string(), "doctor".to_string())]));
}
