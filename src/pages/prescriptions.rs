//! Prescriptions: written and maintained by doctors, exported by patients.

use log::error;

use super::{PageError, Services};
use crate::api::ListQuery;
use crate::forms::{catalog, Form, FormValues};
use crate::models::{display_date, Party, Prescription, Role, User};
use crate::selector::Selector;
use crate::utils::error_messages::{
    PRESCRIPTIONS_FETCH_FAILED, PRESCRIPTION_CREATED, PRESCRIPTION_DELETED,
    PRESCRIPTION_DELETE_FAILED, PRESCRIPTION_SAVE_FAILED, PRESCRIPTION_UPDATED,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrescriptionEditor {
    Create,
    Edit { prescription_id: String },
}

pub struct PrescriptionsPage {
    services: Services,
    user: User,
    prescriptions: Vec<Prescription>,
    editor: Option<(PrescriptionEditor, Form)>,
}

impl PrescriptionsPage {
    pub async fn open(services: &Services) -> Result<Self, PageError> {
        let mut page = Self {
            services: services.clone(),
            user: services.current_user()?,
            prescriptions: Vec::new(),
            editor: None,
        };
        page.refresh().await;
        Ok(page)
    }

    pub async fn refresh(&mut self) {
        match self.services.prescriptions.list(&ListQuery::default()).await {
            Ok(list) => self.prescriptions = list.prescriptions,
            Err(e) => {
                error!("Failed to fetch prescriptions: {e}");
                self.services.notifier.error(PRESCRIPTIONS_FETCH_FAILED);
            }
        }
    }

    pub fn prescriptions(&self) -> &[Prescription] {
        &self.prescriptions
    }

    pub fn can_manage(&self) -> bool {
        self.user.role == Role::Doctor
    }

    pub fn can_export(&self) -> bool {
        self.user.role == Role::Patient
    }

    fn require_doctor(&self) -> Result<(), PageError> {
        if self.can_manage() {
            Ok(())
        } else {
            Err(PageError::Forbidden(self.user.role))
        }
    }

    pub fn patient_selector(
        &self,
        on_select: impl FnOnce(String) + Send + 'static,
        on_close: impl FnOnce() + Send + 'static,
    ) -> Result<Selector, PageError> {
        self.require_doctor()?;
        Ok(Selector::open(Role::Patient, on_select, on_close))
    }

    pub fn start_create(&mut self, patient_id: &str) -> Result<&mut Form, PageError> {
        self.require_doctor()?;
        let defaults =
            FormValues::from_pairs([("patientId", patient_id), ("doctorId", self.user.id.as_str())]);
        self.open_editor(PrescriptionEditor::Create, defaults)
    }

    pub fn start_edit(&mut self, prescription_id: &str) -> Result<&mut Form, PageError> {
        self.require_doctor()?;
        let prescription = self
            .prescriptions
            .iter()
            .find(|prescription| prescription.id == prescription_id)
            .ok_or_else(|| PageError::NotFound(prescription_id.to_string()))?;

        let mut defaults = FormValues::from_pairs([
            ("medicationName", prescription.medication_name.as_str()),
            ("dosage", prescription.dosage.as_str()),
            ("frequency", prescription.frequency.as_str()),
            ("duration", prescription.duration.as_str()),
            ("instructions", prescription.instructions.as_deref().unwrap_or_default()),
        ]);
        if let Some(patient) = &prescription.patient_id {
            defaults.set("patientId", patient.id());
        }
        if let Some(doctor) = &prescription.doctor_id {
            defaults.set("doctorId", doctor.id());
        }

        let mode = PrescriptionEditor::Edit {
            prescription_id: prescription.id.clone(),
        };
        self.open_editor(mode, defaults)
    }

    fn open_editor(
        &mut self,
        mode: PrescriptionEditor,
        defaults: FormValues,
    ) -> Result<&mut Form, PageError> {
        let label = match mode {
            PrescriptionEditor::Create => "Create",
            PrescriptionEditor::Edit { .. } => "Update",
        };
        let form = match self.editor.take() {
            Some((_, mut form)) => {
                form.reset(defaults);
                form
            }
            None => Form::new(catalog::prescription_fields(), defaults)?,
        }
        .with_labels(label, "Submitting...");

        let (_, form) = self.editor.insert((mode, form));
        Ok(form)
    }

    pub fn editor(&self) -> Option<(&PrescriptionEditor, &Form)> {
        self.editor.as_ref().map(|(mode, form)| (mode, form))
    }

    pub fn editor_form_mut(&mut self) -> Option<&mut Form> {
        self.editor.as_mut().map(|(_, form)| form)
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    pub async fn submit_editor(&mut self) -> Result<(), PageError> {
        let Some((mode, form)) = self.editor.as_mut() else {
            return Err(PageError::NoEditor);
        };
        let api = self.services.prescriptions.clone();
        let mode = mode.clone();

        let outcome = form
            .submit_with(|payload| async move {
                let saved = match &mode {
                    PrescriptionEditor::Create => api.create(&payload).await,
                    PrescriptionEditor::Edit { prescription_id } => {
                        api.update(prescription_id, &payload).await
                    }
                };
                saved.map(|_| mode)
            })
            .await;

        match outcome {
            Ok(mode) => {
                self.services.notifier.success(match mode {
                    PrescriptionEditor::Create => PRESCRIPTION_CREATED,
                    PrescriptionEditor::Edit { .. } => PRESCRIPTION_UPDATED,
                });
                self.editor = None;
                self.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.services.report(e.into(), PRESCRIPTION_SAVE_FAILED)),
        }
    }

    pub async fn delete(&mut self, prescription_id: &str) -> Result<(), PageError> {
        self.require_doctor()?;
        match self.services.prescriptions.delete(prescription_id).await {
            Ok(()) => {
                self.services.notifier.success(PRESCRIPTION_DELETED);
                self.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.services.report(e.into(), PRESCRIPTION_DELETE_FAILED)),
        }
    }

    /// Printable summary of one prescription. Patients only.
    pub fn export(&self, prescription_id: &str) -> Result<String, PageError> {
        if !self.can_export() {
            return Err(PageError::Forbidden(self.user.role));
        }
        self.prescriptions
            .iter()
            .find(|prescription| prescription.id == prescription_id)
            .map(render_prescription)
            .ok_or_else(|| PageError::NotFound(prescription_id.to_string()))
    }
}

/// Plain-text prescription sheet: patient, medication, prescribing doctor.
pub fn render_prescription(prescription: &Prescription) -> String {
    let party = |party: &Option<Party>| party.as_ref().and_then(Party::summary).cloned();
    let or_na = |value: Option<&str>| value.unwrap_or("N/A").to_string();
    let patient = party(&prescription.patient_id);
    let doctor = party(&prescription.doctor_id);
    let rule = "-".repeat(40);

    let mut lines = vec![
        format!(
            "Patient: {}",
            or_na(patient.as_ref().and_then(|p| p.full_name.as_deref()))
        ),
        format!("E-mail: {}", or_na(patient.as_ref().and_then(|p| p.email.as_deref()))),
        format!(
            "Date of birth: {}",
            or_na(
                patient
                    .as_ref()
                    .and_then(|p| p.date_of_birth.as_deref())
                    .map(display_date)
                    .as_deref()
            )
        ),
        rule.clone(),
        "Medication Details".to_string(),
        format!(
            "Date: {}",
            or_na(prescription.date_prescribed.as_deref().map(display_date).as_deref())
        ),
        format!("Medication: {}", prescription.medication_name),
        format!("Dosage: {}", prescription.dosage),
        format!("Frequency: {}", prescription.frequency),
        format!("Duration: {}", prescription.duration),
        format!(
            "Instructions: {}",
            prescription.instructions.as_deref().unwrap_or("None")
        ),
        rule,
    ];

    let doctor_name = or_na(doctor.as_ref().and_then(|d| d.full_name.as_deref()));
    lines.push(format!("Doctor: Dr. {doctor_name}"));
    lines.push(format!(
        "E-mail: {}",
        or_na(doctor.as_ref().and_then(|d| d.email.as_deref()))
    ));
    lines.push(format!(
        "Specialization: {}",
        or_na(doctor.as_ref().and_then(|d| d.specialization.as_deref()))
    ));

    lines.join("\n")
}
