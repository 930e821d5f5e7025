pub mod admin_api;

pub use admin_api::{error_status, AdminApiClient, AdminApiError, ApiEnvelope};
