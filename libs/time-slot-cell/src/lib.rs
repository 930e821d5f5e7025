pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::TimeSlotError;
pub use models::*;
pub use router::time_slot_routes;
pub use services::{
    AvailabilityStore, BoardRegistry, DepartmentDirectory, HttpAvailabilityStore, SlotBoard,
    SlotGrid, TimeSlotState,
};
