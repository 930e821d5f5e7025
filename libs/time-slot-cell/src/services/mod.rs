pub mod grid;
pub mod store;
pub mod departments;
pub mod reconcile;
pub mod staging;
pub mod commit;
pub mod board;
pub mod registry;

pub use board::SlotBoard;
pub use departments::DepartmentDirectory;
pub use grid::SlotGrid;
pub use registry::{BoardRegistry, TimeSlotState};
pub use store::{AvailabilityStore, HttpAvailabilityStore};
