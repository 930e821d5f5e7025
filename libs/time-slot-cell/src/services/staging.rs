use tracing::{debug, warn};

use crate::error::TimeSlotError;
use crate::models::{SessionContext, Slot, SlotStatus, StagingEntry, TimePoint};
use crate::services::grid::SlotGrid;

/// Flips the operator's intent for one slot. Leaves the grid untouched on error.
pub fn toggle(
    grid: &mut SlotGrid,
    ctx: &SessionContext,
    time: TimePoint,
) -> Result<Slot, TimeSlotError> {
    ctx.require_department()?;

    let slot = grid
        .slot_mut(time)
        .ok_or(TimeSlotError::UnknownTimePoint(time))?;

    let next = slot
        .status
        .toggled()
        .ok_or(TimeSlotError::SlotLocked(time))?;

    debug!("Toggled {}: {:?} -> {:?}", time, slot.status, next);
    slot.status = next;

    Ok(slot.clone())
}

/// Puts staging entries back onto a freshly reconciled grid.
///
/// Entries are dropped and returned when their slot is now reserved, is no
/// longer on the grid, or already has the status the entry was aiming for
/// (a slot holds at most one exception).
pub fn restage(grid: &mut SlotGrid, entries: &[StagingEntry]) -> Vec<StagingEntry> {
    let mut dropped = Vec::new();

    for entry in entries {
        match grid.slot_mut(entry.time) {
            Some(slot) if slot.status == entry.intent.target_status() => {
                warn!(
                    "Dropping staged {:?} for {}: store already shows {:?}",
                    entry.intent, entry.time, slot.status
                );
                dropped.push(*entry);
            }
            Some(slot) if slot.status != SlotStatus::Reserved => {
                slot.status = entry.intent.pending_status();
            }
            _ => {
                warn!("Dropping staged {:?} for {}: slot no longer editable", entry.intent, entry.time);
                dropped.push(*entry);
            }
        }
    }

    dropped
}
