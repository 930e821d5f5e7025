use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use time_slot_cell::{time_slot_routes, TimeSlotState};

pub fn create_router(state: Arc<TimeSlotState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Time slot admin API is running!" }))
        .nest("/time-slots", time_slot_routes(state))
}
