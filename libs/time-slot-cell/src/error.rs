use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::TimePoint;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeSlotError {
    #[error("No caller identity token available")]
    Unauthenticated,

    #[error("Availability store unavailable: {0}")]
    Unavailable(String),

    #[error("Select a department before editing time slots")]
    NoDepartmentSelected,

    #[error("Slot {0} is reserved by a patient and cannot be changed")]
    SlotLocked(TimePoint),

    #[error("Slot {0} is not part of the daily grid")]
    UnknownTimePoint(TimePoint),

    #[error("Invalid time point: {0}")]
    InvalidTimePoint(String),

    #[error("Date {date} cannot be edited; choose {earliest} or later")]
    InvalidDate { date: NaiveDate, earliest: NaiveDate },

    #[error("Board {0} not found")]
    BoardNotFound(Uuid),
}

impl From<TimeSlotError> for AppError {
    fn from(err: TimeSlotError) -> Self {
        let message = err.to_string();
        match err {
            TimeSlotError::Unauthenticated => AppError::Auth(message),
            TimeSlotError::Unavailable(_) => AppError::ExternalService(message),
            TimeSlotError::NoDepartmentSelected
            | TimeSlotError::UnknownTimePoint(_)
            | TimeSlotError::InvalidTimePoint(_)
            | TimeSlotError::InvalidDate { .. } => AppError::BadRequest(message),
            TimeSlotError::SlotLocked(_) => AppError::Conflict(message),
            TimeSlotError::BoardNotFound(_) => AppError::NotFound(message),
        }
    }
}
