use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use shared_models::identity::CallerIdentity;

use crate::error::TimeSlotError;

pub type DepartmentId = i64;
pub type ExceptionId = i64;
pub type AppointmentId = i64;

// ==============================================================================
// TIME POINTS
// ==============================================================================

/// One bookable hour:minute mark on the daily grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimePoint(NaiveTime);

impl TimePoint {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn session(&self) -> DaySession {
        if self.hour() < 12 {
            DaySession::Morning
        } else {
            DaySession::Afternoon
        }
    }
}

impl FromStr for TimePoint {
    type Err = TimeSlotError;

    /// Accepts `HH:MM` followed by anything (seconds, fractions, offsets);
    /// only hour and minute are kept.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeSlotError::InvalidTimePoint(raw.to_string());
        let trimmed = raw.trim();

        let (hour, rest) = trimmed.split_once(':').ok_or_else(invalid)?;
        let minute = rest.get(..2).ok_or_else(invalid)?;

        if hour.is_empty()
            || hour.len() > 2
            || !hour.chars().all(|c| c.is_ascii_digit())
            || !minute.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;

        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimePoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySession {
    Morning,
    Afternoon,
}

// ==============================================================================
// SLOTS & STAGING
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Open,
    Blocked,
    Reserved,
    PendingBlock,
    PendingUnblock,
}

impl SlotStatus {
    /// Status after an operator toggle, or `None` for reserved slots.
    ///
    /// Open and PendingUnblock both move to PendingBlock; Blocked and
    /// PendingBlock both move to PendingUnblock. Toggling twice therefore
    /// does not return to a persisted status.
    pub fn toggled(self) -> Option<SlotStatus> {
        match self {
            SlotStatus::Open | SlotStatus::PendingUnblock => Some(SlotStatus::PendingBlock),
            SlotStatus::Blocked | SlotStatus::PendingBlock => Some(SlotStatus::PendingUnblock),
            SlotStatus::Reserved => None,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, SlotStatus::PendingBlock | SlotStatus::PendingUnblock)
    }

    pub fn staging_intent(self) -> Option<StagingIntent> {
        match self {
            SlotStatus::PendingBlock => Some(StagingIntent::Block),
            SlotStatus::PendingUnblock => Some(StagingIntent::Unblock),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub time: TimePoint,
    pub status: SlotStatus,
    pub exception_id: Option<ExceptionId>,
}

impl Slot {
    pub fn open(time: TimePoint) -> Self {
        Self {
            time,
            status: SlotStatus::Open,
            exception_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingIntent {
    Block,
    Unblock,
}

impl StagingIntent {
    pub fn pending_status(self) -> SlotStatus {
        match self {
            StagingIntent::Block => SlotStatus::PendingBlock,
            StagingIntent::Unblock => SlotStatus::PendingUnblock,
        }
    }

    /// Status the slot has once this intent is persisted.
    pub fn target_status(self) -> SlotStatus {
        match self {
            StagingIntent::Block => SlotStatus::Blocked,
            StagingIntent::Unblock => SlotStatus::Open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingEntry {
    pub time: TimePoint,
    pub intent: StagingIntent,
}

// ==============================================================================
// STORE RECORDS
// ==============================================================================

/// Administrative block of one time point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exception {
    pub exception_id: ExceptionId,
    pub department_id: DepartmentId,
    pub date: NaiveDate,
    pub time: TimePoint,
}

/// Confirmed patient booking. Upstream records name their department either
/// by id or by display name, so both are optional here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub appointment_id: AppointmentId,
    pub department_id: Option<DepartmentId>,
    pub department_name: Option<String>,
    pub date: NaiveDate,
    pub time: TimePoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub department_id: DepartmentId,
    pub name: String,
}

impl Department {
    pub fn new(department_id: DepartmentId, name: impl Into<String>) -> Self {
        Self {
            department_id,
            name: name.into(),
        }
    }
}

// ==============================================================================
// SESSION CONTEXT
// ==============================================================================

/// Everything a core operation needs to know about who is editing what.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub department_id: Option<DepartmentId>,
    pub date: NaiveDate,
    pub identity: Option<CallerIdentity>,
}

impl SessionContext {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            department_id: None,
            date,
            identity: None,
        }
    }

    pub fn with_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn with_identity(mut self, identity: Option<CallerIdentity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn require_department(&self) -> Result<DepartmentId, TimeSlotError> {
        self.department_id.ok_or(TimeSlotError::NoDepartmentSelected)
    }

    pub fn require_identity(&self) -> Result<&CallerIdentity, TimeSlotError> {
        self.identity.as_ref().ok_or(TimeSlotError::Unauthenticated)
    }
}

// ==============================================================================
// OUTCOMES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommitResult {
    NoChanges,
    Committed {
        succeeded: Vec<TimePoint>,
    },
    PartialFailure {
        succeeded: Vec<TimePoint>,
        failed: Vec<TimePoint>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RefreshStatus {
    Synced,
    /// The store could not be read; the grid shows every slot open.
    Degraded { reason: String },
    AwaitingDepartment,
}

// ==============================================================================
// HTTP REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub date: NaiveDate,
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDepartmentRequest {
    pub department_id: DepartmentId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDateRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotGroup {
    pub session: DaySession,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub board_id: Uuid,
    pub department_id: Option<DepartmentId>,
    pub date: NaiveDate,
    pub sessions: Vec<SlotGroup>,
    pub staging: Vec<StagingEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub board: BoardView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<RefreshStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub slot: Slot,
    pub staging: Vec<StagingEntry>,
}
