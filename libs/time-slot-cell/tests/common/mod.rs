#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};

use shared_models::identity::CallerIdentity;
use time_slot_cell::{
    AvailabilityStore, Department, DepartmentDirectory, DepartmentId, Exception, ExceptionId,
    Reservation, SessionContext, SlotBoard, TimePoint, TimeSlotError,
};

pub const DEPT: DepartmentId = 2;
pub const OTHER_DEPT: DepartmentId = 3;

/// A week out, so the date is always editable.
pub fn date() -> NaiveDate {
    Local::now().date_naive() + Days::new(7)
}

pub fn tp(raw: &str) -> TimePoint {
    raw.parse().unwrap()
}

pub fn identity() -> CallerIdentity {
    CallerIdentity::new("test-operator-token").unwrap()
}

pub fn context() -> SessionContext {
    SessionContext::new(date())
        .with_department(DEPT)
        .with_identity(Some(identity()))
}

pub fn exception(exception_id: ExceptionId, department_id: DepartmentId, time: &str) -> Exception {
    Exception {
        exception_id,
        department_id,
        date: date(),
        time: tp(time),
    }
}

pub fn reservation(appointment_id: i64, department_id: DepartmentId, time: &str) -> Reservation {
    Reservation {
        appointment_id,
        department_id: Some(department_id),
        department_name: None,
        date: date(),
        time: tp(time),
    }
}

pub fn named_reservation(appointment_id: i64, department: &str, time: &str) -> Reservation {
    Reservation {
        appointment_id,
        department_id: None,
        department_name: Some(department.to_string()),
        date: date(),
        time: tp(time),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ListExceptions(DepartmentId, NaiveDate),
    ListReservations(NaiveDate),
    CreateException(DepartmentId, NaiveDate, TimePoint),
    DeleteException(ExceptionId),
    ListDepartments(i64),
}

impl StoreCall {
    pub fn is_write(&self) -> bool {
        matches!(self, StoreCall::CreateException(..) | StoreCall::DeleteException(_))
    }
}

#[derive(Default)]
struct Inner {
    exceptions: Vec<Exception>,
    reservations: Vec<Reservation>,
    next_id: ExceptionId,
    failing_creates: HashSet<TimePoint>,
    failing_deletes: HashSet<ExceptionId>,
    offline: bool,
    delay: Option<Duration>,
    calls: Vec<StoreCall>,
}

/// In-memory availability store that records every call it receives.
pub struct RecordingStore {
    inner: Mutex<Inner>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 100,
                ..Inner::default()
            }),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn add_exception(&self, exception: Exception) {
        self.inner.lock().unwrap().exceptions.push(exception);
    }

    pub fn add_reservation(&self, reservation: Reservation) {
        self.inner.lock().unwrap().reservations.push(reservation);
    }

    pub fn fail_create_at(&self, time: TimePoint) {
        self.inner.lock().unwrap().failing_creates.insert(time);
    }

    pub fn fail_delete_of(&self, exception_id: ExceptionId) {
        self.inner.lock().unwrap().failing_deletes.insert(exception_id);
    }

    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.failing_creates.clear();
        inner.failing_deletes.clear();
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<StoreCall> {
        self.calls().into_iter().filter(StoreCall::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn exceptions(&self) -> Vec<Exception> {
        self.inner.lock().unwrap().exceptions.clone()
    }

    fn record(&self, call: StoreCall) -> (bool, Option<Duration>) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        (inner.offline, inner.delay)
    }

    async fn pause(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn offline() -> TimeSlotError {
    TimeSlotError::Unavailable("store offline".to_string())
}

#[async_trait]
impl AvailabilityStore for RecordingStore {
    async fn list_exceptions(
        &self,
        _identity: &CallerIdentity,
        department_id: DepartmentId,
        date: NaiveDate,
    ) -> Result<Vec<Exception>, TimeSlotError> {
        let (is_offline, delay) = self.record(StoreCall::ListExceptions(department_id, date));
        Self::pause(delay).await;
        if is_offline {
            return Err(offline());
        }

        Ok(self
            .inner
            .lock()
            .unwrap()
            .exceptions
            .iter()
            .filter(|e| e.department_id == department_id && e.date == date)
            .cloned()
            .collect())
    }

    async fn list_reservations(
        &self,
        _identity: &CallerIdentity,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, TimeSlotError> {
        let (is_offline, delay) = self.record(StoreCall::ListReservations(date));
        Self::pause(delay).await;
        if is_offline {
            return Err(offline());
        }

        Ok(self
            .inner
            .lock()
            .unwrap()
            .reservations
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    async fn create_exception(
        &self,
        _identity: &CallerIdentity,
        department_id: DepartmentId,
        date: NaiveDate,
        time: TimePoint,
    ) -> Result<Exception, TimeSlotError> {
        let (is_offline, delay) =
            self.record(StoreCall::CreateException(department_id, date, time));
        Self::pause(delay).await;

        let mut inner = self.inner.lock().unwrap();
        if is_offline || inner.failing_creates.contains(&time) {
            return Err(offline());
        }

        let exception = Exception {
            exception_id: inner.next_id,
            department_id,
            date,
            time,
        };
        inner.next_id += 1;
        inner.exceptions.push(exception.clone());
        Ok(exception)
    }

    async fn delete_exception(
        &self,
        _identity: &CallerIdentity,
        exception_id: ExceptionId,
    ) -> Result<(), TimeSlotError> {
        let (is_offline, delay) = self.record(StoreCall::DeleteException(exception_id));
        Self::pause(delay).await;

        let mut inner = self.inner.lock().unwrap();
        if is_offline || inner.failing_deletes.contains(&exception_id) {
            return Err(offline());
        }

        inner.exceptions.retain(|e| e.exception_id != exception_id);
        Ok(())
    }

    async fn list_departments(
        &self,
        _identity: &CallerIdentity,
        hospital_id: i64,
    ) -> Result<Vec<Department>, TimeSlotError> {
        let (is_offline, _) = self.record(StoreCall::ListDepartments(hospital_id));
        if is_offline {
            return Err(offline());
        }
        Ok(DepartmentDirectory::fallback().departments().to_vec())
    }
}

pub fn board(store: Arc<RecordingStore>) -> SlotBoard {
    let mut board = SlotBoard::new(
        store,
        DepartmentDirectory::fallback(),
        date(),
        Duration::from_secs(2),
    );
    board.set_identity(Some(identity()));
    board
}

pub async fn loaded_board(store: Arc<RecordingStore>) -> SlotBoard {
    let mut board = board(store);
    board.select_department(DEPT).await.unwrap();
    board
}
