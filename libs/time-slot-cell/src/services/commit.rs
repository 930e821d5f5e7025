use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use crate::error::TimeSlotError;
use crate::models::{
    CommitResult, Exception, ExceptionId, SessionContext, SlotStatus, StagingEntry,
    StagingIntent, TimePoint,
};
use crate::services::grid::SlotGrid;
use crate::services::store::{with_deadline, AvailabilityStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOperation {
    CreateException {
        time: TimePoint,
    },
    /// `exception_id` is `None` when the slot was never persisted as blocked.
    DeleteException {
        time: TimePoint,
        exception_id: Option<ExceptionId>,
    },
}

impl SlotOperation {
    pub fn time(&self) -> TimePoint {
        match self {
            SlotOperation::CreateException { time } => *time,
            SlotOperation::DeleteException { time, .. } => *time,
        }
    }

    fn staging_entry(&self) -> StagingEntry {
        let intent = match self {
            SlotOperation::CreateException { .. } => StagingIntent::Block,
            SlotOperation::DeleteException { .. } => StagingIntent::Unblock,
        };
        StagingEntry {
            time: self.time(),
            intent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Applied {
    Blocked(Exception),
    Unblocked,
}

/// What a commit did, plus the staging entries that still need flushing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub result: CommitResult,
    pub failed_entries: Vec<StagingEntry>,
}

impl CommitReport {
    fn no_changes() -> Self {
        Self {
            result: CommitResult::NoChanges,
            failed_entries: Vec::new(),
        }
    }
}

/// One store operation per pending slot, in grid order.
pub fn plan(grid: &SlotGrid) -> Vec<SlotOperation> {
    grid.slots()
        .iter()
        .filter_map(|slot| match slot.status {
            SlotStatus::PendingBlock => Some(SlotOperation::CreateException { time: slot.time }),
            SlotStatus::PendingUnblock => Some(SlotOperation::DeleteException {
                time: slot.time,
                exception_id: slot.exception_id,
            }),
            _ => None,
        })
        .collect()
}

/// Flushes the grid's staging buffer to the store.
///
/// Operations run concurrently and are not rolled back on partial failure.
/// Succeeded slots take their persisted status; failed slots stay pending.
/// When every operation fails the grid is left untouched.
pub async fn commit(
    grid: &mut SlotGrid,
    ctx: &SessionContext,
    store: &dyn AvailabilityStore,
    timeout: Duration,
) -> Result<CommitReport, TimeSlotError> {
    let operations = plan(grid);
    if operations.is_empty() {
        return Ok(CommitReport::no_changes());
    }

    let identity = ctx.require_identity()?;
    let department_id = ctx.require_department()?;
    let date = ctx.date;

    info!(
        "Committing {} slot changes for department {} on {}",
        operations.len(),
        department_id,
        date
    );

    let outcomes = join_all(operations.iter().map(|operation| async move {
        match *operation {
            SlotOperation::CreateException { time } => with_deadline(
                timeout,
                store.create_exception(identity, department_id, date, time),
            )
            .await
            .map(Applied::Blocked),
            SlotOperation::DeleteException {
                exception_id: Some(exception_id),
                ..
            } => with_deadline(timeout, store.delete_exception(identity, exception_id))
                .await
                .map(|_| Applied::Unblocked),
            SlotOperation::DeleteException {
                exception_id: None,
                ..
            } => Ok(Applied::Unblocked),
        }
    }))
    .await;

    if outcomes.iter().all(Result::is_err) {
        let reason = outcomes
            .into_iter()
            .find_map(Result::err)
            .map(|e| e.to_string())
            .unwrap_or_default();
        warn!("Commit failed for every slot: {}", reason);
        return Err(TimeSlotError::Unavailable(reason));
    }

    let mut succeeded = Vec::new();
    let mut failed_entries = Vec::new();

    for (operation, outcome) in operations.iter().zip(outcomes) {
        let time = operation.time();
        match outcome {
            Ok(applied) => {
                if let Some(slot) = grid.slot_mut(time) {
                    match applied {
                        Applied::Blocked(exception) => {
                            slot.status = SlotStatus::Blocked;
                            slot.exception_id = Some(exception.exception_id);
                        }
                        Applied::Unblocked => {
                            slot.status = SlotStatus::Open;
                            slot.exception_id = None;
                        }
                    }
                }
                succeeded.push(time);
            }
            Err(e) => {
                warn!("Slot {} change failed: {}", time, e);
                failed_entries.push(operation.staging_entry());
            }
        }
    }

    let result = if failed_entries.is_empty() {
        CommitResult::Committed { succeeded }
    } else {
        CommitResult::PartialFailure {
            succeeded,
            failed: failed_entries.iter().map(|entry| entry.time).collect(),
        }
    };

    Ok(CommitReport {
        result,
        failed_entries,
    })
}
