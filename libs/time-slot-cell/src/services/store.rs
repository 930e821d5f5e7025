use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::admin_api::{error_status, AdminApiClient};
use shared_models::identity::CallerIdentity;

use crate::error::TimeSlotError;
use crate::models::{
    AppointmentId, Department, DepartmentId, Exception, ExceptionId, Reservation, TimePoint,
};

/// Response code the admin API attaches to a successful department listing.
pub const DEPARTMENT_LIST_CODE: &str = "HOSPITAL_3002";

/// Source of truth for blocking exceptions and reservations.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn list_exceptions(
        &self,
        identity: &CallerIdentity,
        department_id: DepartmentId,
        date: NaiveDate,
    ) -> Result<Vec<Exception>, TimeSlotError>;

    /// All reservations on `date`, across departments.
    async fn list_reservations(
        &self,
        identity: &CallerIdentity,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, TimeSlotError>;

    async fn create_exception(
        &self,
        identity: &CallerIdentity,
        department_id: DepartmentId,
        date: NaiveDate,
        time: TimePoint,
    ) -> Result<Exception, TimeSlotError>;

    async fn delete_exception(
        &self,
        identity: &CallerIdentity,
        exception_id: ExceptionId,
    ) -> Result<(), TimeSlotError>;

    async fn list_departments(
        &self,
        identity: &CallerIdentity,
        hospital_id: i64,
    ) -> Result<Vec<Department>, TimeSlotError>;
}

/// Runs a store call under `timeout`; an expired call counts as unavailable.
pub async fn with_deadline<T, F>(timeout: Duration, call: F) -> Result<T, TimeSlotError>
where
    F: Future<Output = Result<T, TimeSlotError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Store call timed out after {:?}", timeout);
            Err(TimeSlotError::Unavailable(format!(
                "store call timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}

// ==============================================================================
// WIRE RECORDS
// ==============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExceptionRecord {
    exception_id: ExceptionId,
    #[serde(default, alias = "blockTime")]
    exception_time: Option<String>,
    #[serde(default)]
    department_id: Option<DepartmentId>,
    #[serde(default, alias = "blockDate")]
    exception_date: Option<NaiveDate>,
}

impl ExceptionRecord {
    fn into_exception(
        self,
        department_id: DepartmentId,
        date: NaiveDate,
        fallback_time: Option<TimePoint>,
    ) -> Option<Exception> {
        let time = match self.exception_time.as_deref().map(str::parse::<TimePoint>) {
            Some(Ok(time)) => time,
            Some(Err(e)) => {
                warn!("Skipping exception {}: {}", self.exception_id, e);
                return None;
            }
            None => match fallback_time {
                Some(time) => time,
                None => {
                    warn!("Skipping exception {}: no exception time", self.exception_id);
                    return None;
                }
            },
        };

        Some(Exception {
            exception_id: self.exception_id,
            department_id: self.department_id.unwrap_or(department_id),
            date: self.exception_date.unwrap_or(date),
            time,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReservationRecord {
    appointment_id: AppointmentId,
    appointment_time: String,
    #[serde(default)]
    department_id: Option<DepartmentId>,
    #[serde(default)]
    department: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepartmentRecord {
    department_id: DepartmentId,
    name: String,
}

// ==============================================================================
// HTTP STORE
// ==============================================================================

pub struct HttpAvailabilityStore {
    api: AdminApiClient,
}

impl HttpAvailabilityStore {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            api: AdminApiClient::new(config)?,
        })
    }

    pub fn from_client(api: AdminApiClient) -> Self {
        Self { api }
    }
}

fn unavailable(context: &str, err: anyhow::Error) -> TimeSlotError {
    if matches!(
        error_status(&err),
        Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
    ) {
        warn!("{} rejected the caller's credentials", context);
        return TimeSlotError::Unauthenticated;
    }
    warn!("{} failed: {}", context, err);
    TimeSlotError::Unavailable(format!("{}: {}", context, err))
}

#[async_trait]
impl AvailabilityStore for HttpAvailabilityStore {
    async fn list_exceptions(
        &self,
        identity: &CallerIdentity,
        department_id: DepartmentId,
        date: NaiveDate,
    ) -> Result<Vec<Exception>, TimeSlotError> {
        debug!("Fetching exceptions for department {} on {}", department_id, date);

        let path = format!(
            "/admin/time-slots/blocked/date?departmentId={}&date={}",
            department_id, date
        );
        let envelope = self
            .api
            .request::<Vec<ExceptionRecord>>(Method::GET, &path, identity.token(), None)
            .await
            .map_err(|e| unavailable("list exceptions", e))?;

        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|record| record.into_exception(department_id, date, None))
            .collect())
    }

    async fn list_reservations(
        &self,
        identity: &CallerIdentity,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, TimeSlotError> {
        debug!("Fetching reservations on {}", date);

        let path = format!("/appointments/date?date={}", date);
        let envelope = self
            .api
            .request::<Vec<ReservationRecord>>(Method::GET, &path, identity.token(), None)
            .await
            .map_err(|e| unavailable("list reservations", e))?;

        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|record| match record.appointment_time.parse::<TimePoint>() {
                Ok(time) => Some(Reservation {
                    appointment_id: record.appointment_id,
                    department_id: record.department_id,
                    department_name: record.department,
                    date,
                    time,
                }),
                Err(e) => {
                    warn!("Skipping appointment {}: {}", record.appointment_id, e);
                    None
                }
            })
            .collect())
    }

    async fn create_exception(
        &self,
        identity: &CallerIdentity,
        department_id: DepartmentId,
        date: NaiveDate,
        time: TimePoint,
    ) -> Result<Exception, TimeSlotError> {
        debug!("Blocking {} on {} for department {}", time, date, department_id);

        let body = json!({
            "departmentId": department_id,
            "blockDate": date.to_string(),
            "blockTime": time.to_string(),
        });

        let record = self
            .api
            .request_data::<ExceptionRecord>(
                Method::POST,
                "/admin/time-slots/block",
                identity.token(),
                Some(body),
            )
            .await
            .map_err(|e| unavailable("create exception", e))?;

        let exception_id = record.exception_id;
        record
            .into_exception(department_id, date, Some(time))
            .ok_or_else(|| {
                TimeSlotError::Unavailable(format!(
                    "create exception returned unreadable record {}",
                    exception_id
                ))
            })
    }

    async fn delete_exception(
        &self,
        identity: &CallerIdentity,
        exception_id: ExceptionId,
    ) -> Result<(), TimeSlotError> {
        debug!("Deleting exception {}", exception_id);

        let path = format!("/admin/time-slots/{}", exception_id);
        match self
            .api
            .execute(Method::DELETE, &path, identity.token(), None)
            .await
        {
            Ok(_) => Ok(()),
            // Already gone; a retried delete is still a success.
            Err(e) if error_status(&e) == Some(StatusCode::NOT_FOUND) => {
                debug!("Exception {} already deleted", exception_id);
                Ok(())
            }
            Err(e) => Err(unavailable("delete exception", e)),
        }
    }

    async fn list_departments(
        &self,
        identity: &CallerIdentity,
        hospital_id: i64,
    ) -> Result<Vec<Department>, TimeSlotError> {
        debug!("Fetching departments for hospital {}", hospital_id);

        let path = format!("/admin/hospitals/{}/departments", hospital_id);
        let envelope = self
            .api
            .request::<Vec<DepartmentRecord>>(Method::GET, &path, identity.token(), None)
            .await
            .map_err(|e| unavailable("list departments", e))?;

        match (envelope.code.as_deref(), envelope.data) {
            (Some(DEPARTMENT_LIST_CODE), Some(records)) => Ok(records
                .into_iter()
                .map(|record| Department::new(record.department_id, record.name))
                .collect()),
            (code, _) => Err(TimeSlotError::Unavailable(format!(
                "unexpected department list response code {:?}",
                code
            ))),
        }
    }
}
