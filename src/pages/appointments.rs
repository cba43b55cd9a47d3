//! Appointments board, shared by doctors and patients.

use log::{error, info};
use serde_json::json;

use super::{PageError, Services};
use crate::api::ListQuery;
use crate::consts::APPOINTMENTS_PAGE_SIZE;
use crate::forms::{catalog, Form, FormValues};
use crate::models::{Appointment, AppointmentStatus, Party, Role, User};
use crate::selector::Selector;
use crate::utils::error_messages::{
    APPOINTMENTS_FETCH_FAILED, APPOINTMENT_ACCEPTED, APPOINTMENT_ACCEPT_FAILED,
    APPOINTMENT_CANCELLED, APPOINTMENT_CANCEL_FAILED, APPOINTMENT_CREATED,
    APPOINTMENT_SAVE_FAILED, APPOINTMENT_UPDATED,
};

const DEFAULT_REASON: &str = "Regular checkup";
const UNKNOWN_PARTY: &str = "Unknown";

/// What clicking an appointment does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Edit,
    Accept,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    New,
    Update { appointment_id: String },
}

pub struct AppointmentsBoard {
    services: Services,
    user: User,
    appointments: Vec<Appointment>,
    filter: Option<AppointmentStatus>,
    visible: usize,
    editor: Option<(EditorMode, Form)>,
}

impl AppointmentsBoard {
    pub async fn open(services: &Services) -> Result<Self, PageError> {
        let mut board = Self {
            services: services.clone(),
            user: services.current_user()?,
            appointments: Vec::new(),
            filter: None,
            visible: APPOINTMENTS_PAGE_SIZE,
            editor: None,
        };
        board.refresh().await;
        Ok(board)
    }

    /// Refetches the list. On failure the current list is kept.
    pub async fn refresh(&mut self) {
        match self.services.appointments.list(&ListQuery::default()).await {
            Ok(list) => self.appointments = list.appointments,
            Err(e) => {
                error!("Failed to fetch appointments: {e}");
                self.services.notifier.error(APPOINTMENTS_FETCH_FAILED);
            }
        }
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn filter(&self) -> Option<AppointmentStatus> {
        self.filter
    }

    /// `None` shows every status.
    pub fn set_filter(&mut self, filter: Option<AppointmentStatus>) {
        self.filter = filter;
    }

    pub fn filtered(&self) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|appointment| self.filter.map_or(true, |status| appointment.status == status))
            .collect()
    }

    pub fn visible(&self) -> Vec<&Appointment> {
        self.filtered().into_iter().take(self.visible).collect()
    }

    pub fn has_more(&self) -> bool {
        self.filtered().len() > self.visible
    }

    pub fn show_more(&mut self) {
        self.visible += APPOINTMENTS_PAGE_SIZE;
    }

    pub fn can_create(&self) -> bool {
        self.user.role == Role::Patient
    }

    pub fn action_for(&self, appointment: &Appointment) -> AppointmentAction {
        match appointment.status {
            AppointmentStatus::Scheduled => AppointmentAction::Edit,
            AppointmentStatus::Pending if self.user.role == Role::Doctor => {
                AppointmentAction::Accept
            }
            _ => AppointmentAction::Nothing,
        }
    }

    pub fn can_cancel(&self, appointment: &Appointment) -> bool {
        appointment.status == AppointmentStatus::Scheduled
    }

    /// The other side of the appointment, as shown on the card.
    pub fn counterpart_label(&self, appointment: &Appointment) -> String {
        let name = |party: &Option<Party>| {
            party
                .as_ref()
                .and_then(Party::full_name)
                .unwrap_or(UNKNOWN_PARTY)
                .to_string()
        };
        match self.user.role {
            Role::Doctor => name(&appointment.patient_id),
            _ => format!("Dr. {}", name(&appointment.doctor_id)),
        }
    }

    pub fn reason_label(appointment: &Appointment) -> &str {
        appointment
            .reason
            .as_deref()
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or(DEFAULT_REASON)
    }

    /// Doctor picker used before booking. Patients only.
    pub fn doctor_selector(
        &self,
        on_select: impl FnOnce(String) + Send + 'static,
        on_close: impl FnOnce() + Send + 'static,
    ) -> Result<Selector, PageError> {
        if !self.can_create() {
            return Err(PageError::Forbidden(self.user.role));
        }
        Ok(Selector::open(Role::Doctor, on_select, on_close))
    }

    /// Opens the booking form with the chosen doctor locked in.
    pub fn start_new(&mut self, doctor_id: &str) -> Result<&mut Form, PageError> {
        if !self.can_create() {
            return Err(PageError::Forbidden(self.user.role));
        }
        let defaults = FormValues::from_pairs([("doctorId", doctor_id)]);
        self.open_editor(EditorMode::New, defaults)
    }

    /// Opens the editor on a scheduled appointment.
    pub fn start_edit(&mut self, appointment_id: &str) -> Result<&mut Form, PageError> {
        let appointment = self
            .find(appointment_id)
            .filter(|appointment| self.action_for(appointment) == AppointmentAction::Edit)
            .ok_or_else(|| PageError::NotFound(appointment_id.to_string()))?;

        let mut defaults = FormValues::from_pairs([
            ("appointmentDate", appointment.date_part()),
            ("appointmentTime", appointment.appointment_time.as_str()),
        ]);
        if let Some(doctor) = &appointment.doctor_id {
            defaults.set("doctorId", doctor.id());
        }
        if let Some(reason) = &appointment.reason {
            defaults.set("reason", reason.as_str());
        }

        let mode = EditorMode::Update {
            appointment_id: appointment.id.clone(),
        };
        self.open_editor(mode, defaults)
    }

    /// The same form serves booking and editing: switching re-binds its
    /// defaults.
    fn open_editor(&mut self, mode: EditorMode, defaults: FormValues) -> Result<&mut Form, PageError> {
        let (slot_mode, form) = match self.editor.take() {
            Some((_, mut form)) => {
                form.reset(defaults);
                (mode, form)
            }
            None => (mode, Form::new(catalog::appointment_fields(), defaults)?),
        };
        let label = match slot_mode {
            EditorMode::New => "Make Appointment",
            EditorMode::Update { .. } => "Update Appointment",
        };
        let form = form.with_labels(label, "Submitting...");
        let (_, form) = self.editor.insert((slot_mode, form));
        Ok(form)
    }

    pub fn editor(&self) -> Option<(&EditorMode, &Form)> {
        self.editor.as_ref().map(|(mode, form)| (mode, form))
    }

    pub fn editor_form_mut(&mut self) -> Option<&mut Form> {
        self.editor.as_mut().map(|(_, form)| form)
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Books or updates, then closes the editor and refetches. A failed
    /// call keeps the editor open with its values.
    pub async fn submit_editor(&mut self) -> Result<(), PageError> {
        let Some((mode, form)) = self.editor.as_mut() else {
            return Err(PageError::NoEditor);
        };
        let api = self.services.appointments.clone();
        let mode = mode.clone();

        let outcome = form
            .submit_with(|payload| async move {
                let saved = match &mode {
                    EditorMode::New => api.create(&payload).await,
                    EditorMode::Update { appointment_id } => {
                        api.update(appointment_id, &payload).await
                    }
                };
                saved.map(|_| mode)
            })
            .await;

        match outcome {
            Ok(mode) => {
                let message = match mode {
                    EditorMode::New => APPOINTMENT_CREATED,
                    EditorMode::Update { .. } => APPOINTMENT_UPDATED,
                };
                info!("{message}");
                self.services.notifier.success(message);
                self.editor = None;
                self.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.services.report(e.into(), APPOINTMENT_SAVE_FAILED)),
        }
    }

    /// Doctor confirms a pending request. The list entry is only patched
    /// once the server agreed.
    pub async fn accept(&mut self, appointment_id: &str) -> Result<(), PageError> {
        let acceptable = self
            .find(appointment_id)
            .is_some_and(|appointment| self.action_for(appointment) == AppointmentAction::Accept);
        if !acceptable {
            return Err(if self.user.role == Role::Doctor {
                PageError::NotFound(appointment_id.to_string())
            } else {
                PageError::Forbidden(self.user.role)
            });
        }

        let body = json!({ "status": AppointmentStatus::Scheduled });
        match self.services.appointments.update(appointment_id, &body).await {
            Ok(_) => {
                if let Some(appointment) = self
                    .appointments
                    .iter_mut()
                    .find(|appointment| appointment.id == appointment_id)
                {
                    appointment.status = AppointmentStatus::Scheduled;
                }
                self.services.notifier.success(APPOINTMENT_ACCEPTED);
                Ok(())
            }
            Err(e) => Err(self.services.report(e.into(), APPOINTMENT_ACCEPT_FAILED)),
        }
    }

    /// Cancels a scheduled appointment and refetches.
    pub async fn cancel(&mut self, appointment_id: &str) -> Result<(), PageError> {
        let cancellable = self
            .find(appointment_id)
            .is_some_and(|appointment| self.can_cancel(appointment));
        if !cancellable {
            return Err(PageError::NotFound(appointment_id.to_string()));
        }

        match self.services.appointments.cancel(appointment_id).await {
            Ok(()) => {
                self.services.notifier.success(APPOINTMENT_CANCELLED);
                self.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.services.report(e.into(), APPOINTMENT_CANCEL_FAILED)),
        }
    }

    fn find(&self, appointment_id: &str) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|appointment| appointment.id == appointment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{respond, ScriptedTransport};
    use crate::forms::Control;
    use crate::notify::{Notification, RecordingNotifier};
    use crate::pages::fixtures::{services_as, user};
    use http::Method;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn appointment_json(id: &str, status: &str) -> Value {
        json!({
            "_id": id,
            "doctorId": {"_id": "d1", "fullName": "Ana Silva"},
            "patientId": {"_id": "p1", "fullName": "Paula Patient"},
            "appointmentDate": "2025-03-05T00:00:00.000Z",
            "appointmentTime": "10:30",
            "reason": "Cold",
            "status": status
        })
    }

    fn many(count: usize) -> Value {
        let appointments: Vec<Value> = (0..count)
            .map(|i| {
                let status = if i % 2 == 0 { "scheduled" } else { "pending" };
                appointment_json(&format!("a{i}"), status)
            })
            .collect();
        json!({ "appointments": appointments, "total": count })
    }

    async fn board_as(
        role: Role,
        list: Value,
        update_status: u16,
    ) -> (AppointmentsBoard, Arc<ScriptedTransport>, Arc<RecordingNotifier>) {
        let who = user(if role == Role::Doctor { "d1" } else { "p1" }, role, "Someone");
        let (services, transport, notifier) = services_as(&who, move |request| {
            if request.method == Method::GET {
                respond(200, list.clone())
            } else if request.method == Method::PUT {
                respond(update_status, json!({"message": "Slot taken"}))
            } else {
                respond(200, json!({}))
            }
        });
        let board = AppointmentsBoard::open(&services).await.unwrap();
        (board, transport, notifier)
    }

    #[tokio::test]
    async fn test_pagination_and_filter() {
        let (mut board, _, _) = board_as(Role::Patient, many(12), 200).await;

        assert_eq!(board.visible().len(), 5);
        assert!(board.has_more());
        board.show_more();
        board.show_more();
        assert_eq!(board.visible().len(), 12);
        assert!(!board.has_more());

        board.set_filter(Some(AppointmentStatus::Pending));
        assert!(board
            .filtered()
            .iter()
            .all(|appointment| appointment.status == AppointmentStatus::Pending));
        assert_eq!(board.filtered().len(), 6);

        board.set_filter(None);
        assert_eq!(board.filtered().len(), 12);
    }

    #[tokio::test]
    async fn test_actions_by_status_and_role() {
        let list = json!({"appointments": [
            appointment_json("a1", "scheduled"),
            appointment_json("a2", "pending"),
            appointment_json("a3", "completed")
        ]});
        let (patient_board, _, _) = board_as(Role::Patient, list.clone(), 200).await;
        let (doctor_board, _, _) = board_as(Role::Doctor, list, 200).await;
        let [scheduled, pending, completed] = [0, 1, 2].map(|i| patient_board.appointments()[i].clone());

        assert_eq!(patient_board.action_for(&scheduled), AppointmentAction::Edit);
        assert_eq!(patient_board.action_for(&pending), AppointmentAction::Nothing);
        assert_eq!(doctor_board.action_for(&pending), AppointmentAction::Accept);
        assert_eq!(doctor_board.action_for(&completed), AppointmentAction::Nothing);

        assert!(patient_board.can_cancel(&scheduled));
        assert!(!patient_board.can_cancel(&pending));
        assert!(patient_board.can_create());
        assert!(!doctor_board.can_create());
    }

    #[tokio::test]
    async fn test_card_labels() {
        let (patient_board, _, _) = board_as(Role::Patient, many(1), 200).await;
        let (doctor_board, _, _) = board_as(Role::Doctor, many(1), 200).await;
        let appointment = patient_board.appointments()[0].clone();

        assert_eq!(patient_board.counterpart_label(&appointment), "Dr. Ana Silva");
        assert_eq!(doctor_board.counterpart_label(&appointment), "Paula Patient");
        assert_eq!(appointment.display_date(), "Mar 05, 2025");

        let mut bare = appointment.clone();
        bare.doctor_id = Some(Party::Ref("d1".to_string()));
        bare.reason = None;
        assert_eq!(patient_board.counterpart_label(&bare), "Dr. Unknown");
        assert_eq!(AppointmentsBoard::reason_label(&bare), "Regular checkup");
    }

    #[tokio::test]
    async fn test_edit_defaults_then_new_rebinds_form() {
        let (mut board, _, _) = board_as(Role::Patient, many(1), 200).await;

        let form = board.start_edit("a0").unwrap();
        assert_eq!(form.value("appointmentDate"), Some("2025-03-05"));
        assert_eq!(form.value("reason"), Some("Cold"));

        let form = board.start_new("d9").unwrap();
        assert_eq!(form.value("reason"), None);
        assert_eq!(
            form.render()[0].control,
            Control::Locked {
                display: "Doctor already selected".to_string(),
                hidden_value: "d9".to_string(),
            }
        );
        assert_eq!(board.editor().unwrap().0, &EditorMode::New);
    }

    #[tokio::test]
    async fn test_doctor_cannot_book() {
        let (mut board, _, _) = board_as(Role::Doctor, many(1), 200).await;
        assert!(matches!(board.start_new("d1"), Err(PageError::Forbidden(Role::Doctor))));
        assert!(board.doctor_selector(|_| {}, || {}).is_err());
    }

    #[tokio::test]
    async fn test_submit_new_appointment() {
        let (mut board, transport, notifier) = board_as(Role::Patient, many(0), 200).await;

        let form = board.start_new("d1").unwrap();
        form.set("appointmentDate", "2025-04-01").unwrap();
        form.set("appointmentTime", "09:00").unwrap();
        form.set("reason", "Fever").unwrap();
        board.submit_editor().await.unwrap();

        let post = transport
            .requests()
            .into_iter()
            .find(|request| request.method == Method::POST)
            .unwrap();
        assert_eq!(
            post.body,
            Some(json!({
                "doctorId": "d1",
                "appointmentDate": "2025-04-01",
                "appointmentTime": "09:00",
                "reason": "Fever"
            }))
        );
        assert!(board.editor().is_none());
        assert_eq!(notifier.take(), vec![Notification::success(APPOINTMENT_CREATED)]);
    }

    #[tokio::test]
    async fn test_accept_patches_local_list() {
        let (mut board, transport, _) = board_as(Role::Doctor, many(2), 200).await;

        board.accept("a1").await.unwrap();

        assert_eq!(board.appointments()[1].status, AppointmentStatus::Scheduled);
        let put = transport.requests().pop().unwrap();
        assert_eq!(put.path, "/appointments/a1");
        assert_eq!(put.body, Some(json!({"status": "scheduled"})));
    }

    #[tokio::test]
    async fn test_failed_accept_leaves_list_untouched() {
        let (mut board, _, notifier) = board_as(Role::Doctor, many(2), 409).await;
        let before = board.appointments().to_vec();

        assert!(board.accept("a1").await.is_err());

        assert_eq!(board.appointments(), before.as_slice());
        assert_eq!(notifier.take(), vec![Notification::error("Slot taken")]);
    }

    #[tokio::test]
    async fn test_cancel_only_scheduled() {
        let (mut board, transport, _) = board_as(Role::Patient, many(2), 200).await;

        assert!(matches!(board.cancel("a1").await, Err(PageError::NotFound(_))));
        board.cancel("a0").await.unwrap();

        assert!(transport
            .requests()
            .iter()
            .any(|request| request.method == Method::DELETE && request.path == "/appointments/a0"));
    }
}
