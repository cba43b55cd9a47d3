//! Global constants for the portal client.

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api"; // Default REST endpoint.
pub const DEFAULT_SESSION_FILE: &str = "./healthcard-session.json"; // Durable session storage.
pub const DEFAULT_LOG_FILE: &str = "./healthcard.log"; // Log output of the terminal client.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30; // HTTP transport timeout.

pub const TOKEN_KEY: &str = "token"; // Storage key of the bearer token.
pub const USER_KEY: &str = "user"; // Storage key of the serialized identity.

pub const APPOINTMENTS_PAGE_SIZE: usize = 5; // Appointments shown per "show more" step.
pub const RECENT_APPOINTMENTS_LIMIT: u32 = 5; // Appointments fetched by the dashboards.
