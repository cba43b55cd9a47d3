//! Medical history: a patient's own records, or the records a doctor wrote.

use log::error;

use super::{PageError, Services};
use crate::api::ListQuery;
use crate::forms::{catalog, Form, FormValues};
use crate::models::{MedicalRecord, Party, Role, User, VitalSigns};
use crate::selector::Selector;
use crate::utils::error_messages::{RECORDS_FETCH_FAILED, RECORD_ADDED, RECORD_ADD_FAILED};

pub const NO_RECORDS: &str = "No medical records found.";

pub struct MedicalHistory {
    services: Services,
    user: User,
    records: Vec<MedicalRecord>,
    editor: Option<Form>,
}

impl MedicalHistory {
    pub async fn open(services: &Services) -> Result<Self, PageError> {
        let mut page = Self {
            services: services.clone(),
            user: services.current_user()?,
            records: Vec::new(),
            editor: None,
        };
        page.refresh().await;
        Ok(page)
    }

    pub async fn refresh(&mut self) {
        match self.services.records.list(&ListQuery::default()).await {
            Ok(list) => {
                self.records = list
                    .records
                    .into_iter()
                    .filter(|record| self.concerns_user(record))
                    .collect();
            }
            Err(e) => {
                error!("Failed to fetch medical history: {e}");
                self.services.notifier.error(RECORDS_FETCH_FAILED);
            }
        }
    }

    fn concerns_user(&self, record: &MedicalRecord) -> bool {
        let party = match self.user.role {
            Role::Patient => &record.patient_id,
            Role::Doctor => &record.doctor_id,
            Role::Admin => return true,
        };
        party.as_ref().map(Party::id) == Some(self.user.id.as_str())
    }

    pub fn records(&self) -> &[MedicalRecord] {
        &self.records
    }

    pub fn can_add(&self) -> bool {
        self.user.role == Role::Doctor
    }

    /// Patient picker used before writing a record. Doctors only.
    pub fn patient_selector(
        &self,
        on_select: impl FnOnce(String) + Send + 'static,
        on_close: impl FnOnce() + Send + 'static,
    ) -> Result<Selector, PageError> {
        if !self.can_add() {
            return Err(PageError::Forbidden(self.user.role));
        }
        Ok(Selector::open(Role::Patient, on_select, on_close))
    }

    /// Opens the record form for `patient_id`, signed by the current doctor.
    pub fn start_add(&mut self, patient_id: &str) -> Result<&mut Form, PageError> {
        if !self.can_add() {
            return Err(PageError::Forbidden(self.user.role));
        }
        let defaults =
            FormValues::from_pairs([("patientId", patient_id), ("doctorId", self.user.id.as_str())]);
        let form = Form::new(catalog::medical_record_fields(), defaults)?
            .with_labels("Save Record", "Submitting...");
        Ok(self.editor.insert(form))
    }

    pub fn editor_mut(&mut self) -> Option<&mut Form> {
        self.editor.as_mut()
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    pub async fn submit_record(&mut self) -> Result<(), PageError> {
        let form = self.editor.as_mut().ok_or(PageError::NoEditor)?;
        let api = self.services.records.clone();

        let outcome = form
            .submit_with(|payload| async move { api.create(&payload).await })
            .await;

        match outcome {
            Ok(_) => {
                self.services.notifier.success(RECORD_ADDED);
                self.editor = None;
                self.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.services.report(e.into(), RECORD_ADD_FAILED)),
        }
    }
}

/// One-line vitals summary, `N/A` for whatever was not measured.
pub fn vitals_summary(vitals: Option<&VitalSigns>) -> String {
    let value = |field: fn(&VitalSigns) -> Option<&String>| {
        vitals
            .and_then(field)
            .map(String::as_str)
            .unwrap_or("N/A")
            .to_string()
    };
    format!(
        "BP {}, Temp {}°C, HR {} bpm, Weight {} kg",
        value(|v| v.blood_pressure.as_ref()),
        value(|v| v.temperature.as_ref()),
        value(|v| v.heart_rate.as_ref()),
        value(|v| v.weight.as_ref()),
    )
}
