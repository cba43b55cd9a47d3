//! Fixed user-facing messages

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const LOGIN_FAILED: &str = "Login failed";
pub const LOGOUT_SUCCESS: &str = "Logged out successfully";
pub const LOGOUT_FAILED: &str = "Logout failed";
pub const REGISTRATION_SUCCESS: &str = "Registration successful! Please login to continue.";
pub const REGISTRATION_FAILED: &str = "Registration failed";

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
pub const INVALID_EMAIL: &str = "Invalid email address";

pub const APPOINTMENTS_FETCH_FAILED: &str = "Failed to fetch appointments";
pub const APPOINTMENT_CREATED: &str = "Appointment requested";
pub const APPOINTMENT_UPDATED: &str = "Appointment updated";
pub const APPOINTMENT_SAVE_FAILED: &str = "Failed to save appointment";
pub const APPOINTMENT_CANCELLED: &str = "Appointment cancelled";
pub const APPOINTMENT_CANCEL_FAILED: &str = "Cancellation failed";
pub const APPOINTMENT_ACCEPTED: &str = "Appointment accepted";
pub const APPOINTMENT_ACCEPT_FAILED: &str = "Failed to accept appointment";

pub const RECORDS_FETCH_FAILED: &str = "Failed to fetch medical history";
pub const RECORD_ADDED: &str = "Record added";
pub const RECORD_ADD_FAILED: &str = "Error adding record";

pub const PRESCRIPTIONS_FETCH_FAILED: &str = "Failed to fetch prescriptions";
pub const PRESCRIPTION_CREATED: &str = "Prescription created";
pub const PRESCRIPTION_UPDATED: &str = "Prescription updated";
pub const PRESCRIPTION_SAVE_FAILED: &str = "Failed to save prescription";
pub const PRESCRIPTION_DELETED: &str = "Deleted successfully";
pub const PRESCRIPTION_DELETE_FAILED: &str = "Delete failed";

pub const PROFILE_UPDATED: &str = "Profile updated!";
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";

pub const USERS_FETCH_FAILED: &str = "Failed to load users";
pub const USER_DELETED: &str = "User deleted successfully";
pub const USER_DELETE_FAILED: &str = "Error deleting user";

pub const STATS_PARTIAL: &str = "Some statistics could not be loaded";
