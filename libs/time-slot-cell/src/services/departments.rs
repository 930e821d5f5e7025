use crate::models::{Department, DepartmentId, Reservation};

/// Known departments of one hospital, used to resolve reservation records
/// that carry a department name instead of an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentDirectory {
    departments: Vec<Department>,
}

impl DepartmentDirectory {
    pub fn new(departments: Vec<Department>) -> Self {
        Self { departments }
    }

    /// Department list used when the admin API cannot provide one.
    pub fn fallback() -> Self {
        Self::new(vec![
            Department::new(1, "정형외과"),
            Department::new(2, "내과"),
            Department::new(3, "치과"),
            Department::new(4, "산부인과"),
            Department::new(5, "이비인후과"),
            Department::new(6, "안과"),
        ])
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn name_of(&self, department_id: DepartmentId) -> Option<&str> {
        self.departments
            .iter()
            .find(|d| d.department_id == department_id)
            .map(|d| d.name.as_str())
    }

    pub fn id_of(&self, name: &str) -> Option<DepartmentId> {
        self.departments
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.department_id)
    }

    /// Department a reservation belongs to: its id when present, otherwise
    /// the id whose display name it carries.
    pub fn resolve(&self, reservation: &Reservation) -> Option<DepartmentId> {
        reservation.department_id.or_else(|| {
            reservation
                .department_name
                .as_deref()
                .and_then(|name| self.id_of(name))
        })
    }

    /// Whether a reservation belongs to `department_id`, by id or by display name.
    pub fn matches(&self, reservation: &Reservation, department_id: DepartmentId) -> bool {
        if reservation.department_id == Some(department_id) {
            return true;
        }

        match (reservation.department_name.as_deref(), self.name_of(department_id)) {
            (Some(record_name), Some(known_name)) => record_name == known_name,
            _ => false,
        }
    }
}

impl Default for DepartmentDirectory {
    fn default() -> Self {
        Self::fallback()
    }
}
