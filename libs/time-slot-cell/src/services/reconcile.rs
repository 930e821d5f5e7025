use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::{DepartmentId, Exception, ExceptionId, Reservation, SlotStatus, TimePoint};
use crate::services::departments::DepartmentDirectory;
use crate::services::grid::SlotGrid;

/// Derives every slot's status from the store's records.
///
/// An exception wins over a reservation at the same time. Pending statuses
/// on the input grid are discarded. The result does not depend on record order.
pub fn reconcile(
    grid: &SlotGrid,
    exceptions: &[Exception],
    reservations: &[Reservation],
    department_id: DepartmentId,
    directory: &DepartmentDirectory,
) -> SlotGrid {
    let mut blocked: HashMap<TimePoint, ExceptionId> = HashMap::new();
    for exception in exceptions
        .iter()
        .filter(|e| e.department_id == department_id)
    {
        blocked
            .entry(exception.time)
            .and_modify(|id| *id = (*id).min(exception.exception_id))
            .or_insert(exception.exception_id);
    }

    let reserved: HashSet<TimePoint> = reservations
        .iter()
        .filter(|r| directory.matches(r, department_id))
        .map(|r| r.time)
        .collect();

    let mut next = grid.clone();
    for slot in next.slots_mut() {
        if let Some(exception_id) = blocked.get(&slot.time) {
            slot.status = SlotStatus::Blocked;
            slot.exception_id = Some(*exception_id);
        } else if reserved.contains(&slot.time) {
            slot.status = SlotStatus::Reserved;
            slot.exception_id = None;
        } else {
            slot.status = SlotStatus::Open;
            slot.exception_id = None;
        }
    }

    debug!(
        "Reconciled department {}: {} blocked, {} reserved",
        department_id,
        blocked.len(),
        reserved.len()
    );

    next
}
