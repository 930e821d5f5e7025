use std::sync::Arc;

use serde_json::{json, Value};

use shared_config::AppConfig;

pub const TEST_OPERATOR_TOKEN: &str = "test-operator-token";

pub struct TestConfig {
    pub admin_api_url: String,
    pub hospital_id: i64,
    pub store_timeout_secs: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            admin_api_url: "http://localhost:8080".to_string(),
            hospital_id: 1,
            store_timeout_secs: 2,
        }
    }
}

impl TestConfig {
    pub fn with_admin_url(url: &str) -> Self {
        Self {
            admin_api_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            admin_api_url: self.admin_api_url.clone(),
            hospital_id: self.hospital_id,
            store_timeout_secs: self.store_timeout_secs,
            board_idle_secs: 1800,
            server_port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// JSON bodies shaped like the hospital admin API's responses.
pub struct MockAdminResponses;

impl MockAdminResponses {
    pub fn envelope(code: &str, data: Value) -> Value {
        json!({
            "code": code,
            "message": "success",
            "data": data
        })
    }

    pub fn exception(exception_id: i64, time: &str) -> Value {
        json!({
            "exceptionId": exception_id,
            "exceptionTime": format!("{}:00", time),
        })
    }

    pub fn created_exception(exception_id: i64, department_id: i64, date: &str, time: &str) -> Value {
        json!({
            "exceptionId": exception_id,
            "departmentId": department_id,
            "exceptionDate": date,
            "exceptionTime": format!("{}:00", time),
        })
    }

    pub fn reservation_by_id(appointment_id: i64, department_id: i64, time: &str) -> Value {
        json!({
            "appointmentId": appointment_id,
            "departmentId": department_id,
            "appointmentTime": format!("{}:00", time),
            "memberName": "Test Patient",
            "status": "BOOKED"
        })
    }

    pub fn reservation_by_name(appointment_id: i64, department: &str, time: &str) -> Value {
        json!({
            "appointmentId": appointment_id,
            "department": department,
            "appointmentTime": format!("{}:00", time),
            "memberName": "Test Patient",
            "status": "BOOKED"
        })
    }

    pub fn departments() -> Value {
        Self::envelope(
            "HOSPITAL_3002",
            json!([
                { "departmentId": 10, "name": "Cardiology" },
                { "departmentId": 11, "name": "Dermatology" }
            ]),
        )
    }
}
