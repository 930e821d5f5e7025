use std::collections::HashSet;

use crate::models::{DaySession, Slot, SlotGroup, StagingEntry, TimePoint};

/// Morning session of the default daily grid.
pub const MORNING_TIMES: [(u32, u32); 4] = [(10, 0), (10, 30), (11, 0), (11, 30)];

/// Afternoon session of the default daily grid.
pub const AFTERNOON_TIMES: [(u32, u32); 10] = [
    (12, 0), (12, 30), (13, 0), (13, 30), (14, 0),
    (14, 30), (15, 0), (15, 30), (16, 0), (16, 30),
];

pub fn default_time_points() -> Vec<TimePoint> {
    MORNING_TIMES
        .iter()
        .chain(AFTERNOON_TIMES.iter())
        .filter_map(|&(hour, minute)| TimePoint::new(hour, minute))
        .collect()
}

/// Slots for one department and day, in grid order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid {
    slots: Vec<Slot>,
}

impl SlotGrid {
    /// One open slot per time point. Repeated time points keep their first position.
    pub fn init(time_points: &[TimePoint]) -> Self {
        let mut seen = HashSet::new();
        let slots = time_points
            .iter()
            .filter(|time| seen.insert(**time))
            .map(|time| Slot::open(*time))
            .collect();

        Self { slots }
    }

    pub fn with_default_times() -> Self {
        Self::init(&default_time_points())
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn time_points(&self) -> Vec<TimePoint> {
        self.slots.iter().map(|slot| slot.time).collect()
    }

    pub fn slot(&self, time: TimePoint) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.time == time)
    }

    pub(crate) fn slot_mut(&mut self, time: TimePoint) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.time == time)
    }

    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.slots.iter_mut()
    }

    /// Staging buffer derived from the pending slots.
    pub fn staging_entries(&self) -> Vec<StagingEntry> {
        self.slots
            .iter()
            .filter_map(|slot| {
                slot.status.staging_intent().map(|intent| StagingEntry {
                    time: slot.time,
                    intent,
                })
            })
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        self.slots.iter().any(|slot| slot.status.is_pending())
    }

    pub fn grouped_by_session(&self) -> Vec<SlotGroup> {
        [DaySession::Morning, DaySession::Afternoon]
            .into_iter()
            .map(|session| SlotGroup {
                session,
                slots: self
                    .slots
                    .iter()
                    .filter(|slot| slot.time.session() == session)
                    .cloned()
                    .collect(),
            })
            .filter(|group| !group.slots.is_empty())
            .collect()
    }
}
