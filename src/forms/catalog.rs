//! Descriptor lists of every form of the portal.

use super::{Condition, FieldDescriptor, SelectOption};
use crate::models::Role;
use crate::utils::error_messages::{INVALID_EMAIL, PASSWORDS_DO_NOT_MATCH};
use crate::utils::input_validation::EMAIL_REGEX;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn login_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::email("email", "Email Address")
            .placeholder("Enter your email")
            .required("Email is required")
            .pattern(EMAIL_REGEX.clone(), INVALID_EMAIL),
        FieldDescriptor::password("password", "Password")
            .placeholder("Enter your password")
            .required("Password is required"),
    ]
}

pub fn register_fields() -> Vec<FieldDescriptor> {
    let doctor_only = || Condition::equals("role", &Role::Doctor.to_string());
    let roles = [Role::Patient, Role::Doctor, Role::Admin]
        .into_iter()
        .map(|role| SelectOption::new(role.label(), role.to_string()))
        .collect();

    vec![
        FieldDescriptor::text("fullName", "Full Name")
            .placeholder("Enter your full name")
            .required("Full name is required"),
        FieldDescriptor::email("email", "Email Address")
            .placeholder("Enter your email")
            .required("Email is required")
            .pattern(EMAIL_REGEX.clone(), INVALID_EMAIL),
        FieldDescriptor::select("role", "Role", roles)
            .placeholder("Select your role")
            .required("Role is required"),
        FieldDescriptor::text("specialization", "Specialization")
            .placeholder("e.g., Cardiology, Pediatrics")
            .required("Specialization is required for doctors")
            .visible_when(doctor_only()),
        FieldDescriptor::text("licenseNumber", "License Number")
            .placeholder("Enter your medical license number")
            .required("License number is required for doctors")
            .visible_when(doctor_only()),
        FieldDescriptor::tel("phone", "Phone Number (Optional)")
            .placeholder("Enter your phone number"),
        FieldDescriptor::password("password", "Password")
            .placeholder("Create a password")
            .required("Password is required")
            .min_length(
                MIN_PASSWORD_LENGTH,
                "Password must be at least 6 characters",
            ),
        FieldDescriptor::password("confirmPassword", "Confirm Password")
            .placeholder("Confirm your password")
            .required("Please confirm your password")
            .matches("password", PASSWORDS_DO_NOT_MATCH),
    ]
}

pub fn appointment_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("doctorId", "Doctor ID")
            .placeholder("Enter Doctor ID")
            .required("Doctor ID is required"),
        FieldDescriptor::date("appointmentDate", "Appointment Date")
            .placeholder("Select a date")
            .required("Appointment date is required"),
        FieldDescriptor::time("appointmentTime", "Appointment Time")
            .placeholder("Select a time")
            .required("Appointment time is required"),
        FieldDescriptor::text("reason", "Reason for Visit")
            .placeholder("e.g., Cold, Fever")
            .required("Reason is required"),
    ]
}

pub fn medical_record_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::date("visitDate", "Visit Date").required("Visit date is required"),
        FieldDescriptor::text("diagnosis", "Diagnosis")
            .placeholder("e.g. Fever, Infection")
            .required("Diagnosis is required"),
        FieldDescriptor::text("treatment", "Treatment")
            .placeholder("e.g. Paracetamol 500mg")
            .required("Treatment is required"),
        FieldDescriptor::text("symptoms", "Symptoms").placeholder("e.g. Headache, sore throat"),
        FieldDescriptor::text("notes", "Doctor Notes").placeholder("Optional notes..."),
        FieldDescriptor::text("vitalSigns.bloodPressure", "Blood Pressure")
            .placeholder("e.g. 120/80"),
        FieldDescriptor::text("vitalSigns.temperature", "Temperature (°C)")
            .placeholder("e.g. 37.0"),
        FieldDescriptor::text("vitalSigns.heartRate", "Heart Rate (bpm)").placeholder("e.g. 72"),
        FieldDescriptor::text("vitalSigns.weight", "Weight (kg)").placeholder("e.g. 65"),
        FieldDescriptor::text("doctorId", "Doctor ID")
            .placeholder("Doctor ID")
            .required("Doctor ID is required"),
        FieldDescriptor::text("patientId", "Patient ID")
            .placeholder("Patient ID")
            .required("Patient ID is required"),
    ]
}

pub fn prescription_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("medicationName", "Medication Name")
            .placeholder("e.g. Paracetamol")
            .required("Medication name is required"),
        FieldDescriptor::text("dosage", "Dosage")
            .placeholder("e.g. 500mg")
            .required("Dosage is required"),
        FieldDescriptor::text("frequency", "Frequency")
            .placeholder("e.g. Twice a day")
            .required("Frequency is required"),
        FieldDescriptor::text("duration", "Duration")
            .placeholder("e.g. 5 days")
            .required("Duration is required"),
        FieldDescriptor::text("instructions", "Instructions")
            .placeholder("Optional instructions..."),
        FieldDescriptor::text("patientId", "Patient Name")
            .placeholder("Patient ID")
            .required("Patient ID is required"),
        FieldDescriptor::text("doctorId", "Doctor Name")
            .placeholder("Doctor ID")
            .required("Doctor ID is required"),
    ]
}

/// Profile editor: shared fields plus the ones of `role`.
pub fn profile_fields(role: Role) -> Vec<FieldDescriptor> {
    let mut fields = vec![
        FieldDescriptor::text("fullName", "Full Name")
            .placeholder("Enter full name")
            .required("Full name is required"),
        FieldDescriptor::email("email", "Email")
            .placeholder("Email")
            .required("Email is required")
            .pattern(EMAIL_REGEX.clone(), INVALID_EMAIL),
        FieldDescriptor::tel("phone", "Phone").placeholder("Phone number"),
        FieldDescriptor::text("address", "Address").placeholder("Address"),
    ];

    match role {
        Role::Doctor => fields.extend([
            FieldDescriptor::text("specialization", "Specialization")
                .placeholder("e.g. Cardiologist")
                .required("Specialization is required"),
            FieldDescriptor::text("licenseNumber", "License Number")
                .placeholder("License #")
                .required("License number is required"),
            FieldDescriptor::text("yearsOfExperience", "Years of Experience")
                .placeholder("e.g. 5")
                .custom(|value, _| {
                    if value.is_empty() || value.trim().parse::<u32>().is_ok() {
                        Ok(())
                    } else {
                        Err("Years of experience must be a whole number".to_string())
                    }
                }),
            FieldDescriptor::text("bio", "Bio").placeholder("A few words about your practice"),
        ]),
        Role::Patient => fields.extend([
            FieldDescriptor::date("dateOfBirth", "Date of Birth"),
            FieldDescriptor::select(
                "gender",
                "Gender",
                vec![
                    SelectOption::new("Male", "male"),
                    SelectOption::new("Female", "female"),
                    SelectOption::new("Other", "other"),
                ],
            )
            .placeholder("Select Gender"),
            FieldDescriptor::tel("emergencyContact", "Emergency Contact")
                .placeholder("Emergency number"),
        ]),
        Role::Admin => {}
    }

    fields
}
