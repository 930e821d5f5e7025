use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::identity::CallerIdentity;

use crate::error::TimeSlotError;
use crate::models::{
    BoardView, CommitResult, DepartmentId, Exception, RefreshStatus, Reservation,
    SessionContext, Slot, TimePoint,
};
use crate::services::commit;
use crate::services::departments::DepartmentDirectory;
use crate::services::grid::{default_time_points, SlotGrid};
use crate::services::reconcile::reconcile;
use crate::services::staging;
use crate::services::store::{with_deadline, AvailabilityStore};

/// First date an operator may edit: tomorrow, by the server's local clock.
pub fn earliest_editable_date() -> NaiveDate {
    Local::now().date_naive() + Days::new(1)
}

pub fn ensure_editable(date: NaiveDate) -> Result<(), TimeSlotError> {
    let earliest = earliest_editable_date();
    if date < earliest {
        debug!("Rejecting date {} (earliest editable is {})", date, earliest);
        return Err(TimeSlotError::InvalidDate { date, earliest });
    }
    Ok(())
}

/// One operator's editing view: a grid and the context it was loaded for.
///
/// Changing department or date rebuilds the grid, which discards any staged
/// changes.
pub struct SlotBoard {
    grid: SlotGrid,
    ctx: SessionContext,
    time_points: Vec<TimePoint>,
    store: Arc<dyn AvailabilityStore>,
    directory: DepartmentDirectory,
    timeout: Duration,
}

impl fmt::Debug for SlotBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotBoard")
            .field("ctx", &self.ctx)
            .field("grid", &self.grid)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SlotBoard {
    pub fn new(
        store: Arc<dyn AvailabilityStore>,
        directory: DepartmentDirectory,
        date: NaiveDate,
        timeout: Duration,
    ) -> Self {
        Self::with_time_points(store, directory, date, timeout, default_time_points())
    }

    pub fn with_time_points(
        store: Arc<dyn AvailabilityStore>,
        directory: DepartmentDirectory,
        date: NaiveDate,
        timeout: Duration,
        time_points: Vec<TimePoint>,
    ) -> Self {
        Self {
            grid: SlotGrid::init(&time_points),
            ctx: SessionContext::new(date),
            time_points,
            store,
            directory,
            timeout,
        }
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn directory(&self) -> &DepartmentDirectory {
        &self.directory
    }

    pub fn set_directory(&mut self, directory: DepartmentDirectory) {
        self.directory = directory;
    }

    pub fn set_identity(&mut self, identity: Option<CallerIdentity>) {
        self.ctx.identity = identity;
    }

    pub async fn select_department(
        &mut self,
        department_id: DepartmentId,
    ) -> Result<RefreshStatus, TimeSlotError> {
        debug!("Selecting department {}", department_id);
        self.ctx.department_id = Some(department_id);
        self.grid = SlotGrid::init(&self.time_points);
        self.refresh().await
    }

    pub async fn select_date(&mut self, date: NaiveDate) -> Result<RefreshStatus, TimeSlotError> {
        ensure_editable(date)?;
        debug!("Selecting date {}", date);
        self.ctx.date = date;
        self.grid = SlotGrid::init(&self.time_points);
        self.refresh().await
    }

    /// Reloads the grid from the store, dropping any pending intent.
    ///
    /// If the store cannot be read the grid falls back to all-open and the
    /// returned status says so.
    pub async fn refresh(&mut self) -> Result<RefreshStatus, TimeSlotError> {
        let Some(department_id) = self.ctx.department_id else {
            return Ok(RefreshStatus::AwaitingDepartment);
        };

        match self.fetch_records(department_id).await {
            Ok((exceptions, reservations)) => {
                self.grid = reconcile(
                    &self.grid,
                    &exceptions,
                    &reservations,
                    department_id,
                    &self.directory,
                );
                Ok(RefreshStatus::Synced)
            }
            Err(TimeSlotError::Unavailable(reason)) => {
                warn!("Showing all slots open for department {}: {}", department_id, reason);
                self.grid = SlotGrid::init(&self.time_points);
                Ok(RefreshStatus::Degraded { reason })
            }
            Err(e) => Err(e),
        }
    }

    pub fn toggle(&mut self, time: TimePoint) -> Result<Slot, TimeSlotError> {
        staging::toggle(&mut self.grid, &self.ctx, time)
    }

    /// Commits staged changes, then re-reads the store.
    ///
    /// Entries that failed are staged again on the refreshed grid so they can
    /// be retried.
    pub async fn commit(&mut self) -> Result<CommitResult, TimeSlotError> {
        let report =
            commit::commit(&mut self.grid, &self.ctx, self.store.as_ref(), self.timeout).await?;

        let department_id = match (&report.result, self.ctx.department_id) {
            (CommitResult::NoChanges, _) | (_, None) => return Ok(report.result),
            (_, Some(department_id)) => department_id,
        };

        match self.fetch_records(department_id).await {
            Ok((exceptions, reservations)) => {
                self.grid = reconcile(
                    &self.grid,
                    &exceptions,
                    &reservations,
                    department_id,
                    &self.directory,
                );
                staging::restage(&mut self.grid, &report.failed_entries);
            }
            Err(e) => warn!("Post-commit refresh failed, keeping local state: {}", e),
        }

        info!("Commit finished: {:?}", report.result);
        Ok(report.result)
    }

    pub fn view(&self, board_id: Uuid) -> BoardView {
        BoardView {
            board_id,
            department_id: self.ctx.department_id,
            date: self.ctx.date,
            sessions: self.grid.grouped_by_session(),
            staging: self.grid.staging_entries(),
        }
    }

    async fn fetch_records(
        &self,
        department_id: DepartmentId,
    ) -> Result<(Vec<Exception>, Vec<Reservation>), TimeSlotError> {
        let identity = self.ctx.require_identity()?;
        let date = self.ctx.date;
        let store = self.store.as_ref();

        let (exceptions, reservations) = tokio::join!(
            with_deadline(self.timeout, store.list_exceptions(identity, department_id, date)),
            with_deadline(self.timeout, store.list_reservations(identity, date)),
        );

        Ok((exceptions?, reservations?))
    }
}
