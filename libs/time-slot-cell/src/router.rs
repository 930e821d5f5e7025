use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers;
use crate::services::registry::TimeSlotState;

pub fn time_slot_routes(state: Arc<TimeSlotState>) -> Router {
    Router::new()
        .route("/departments", get(handlers::list_departments))
        .route("/boards", post(handlers::create_board))
        .route(
            "/boards/{board_id}",
            get(handlers::get_board).delete(handlers::close_board),
        )
        .route("/boards/{board_id}/department", put(handlers::select_department))
        .route("/boards/{board_id}/date", put(handlers::select_date))
        .route("/boards/{board_id}/refresh", post(handlers::refresh_board))
        .route("/boards/{board_id}/slots/{time}/toggle", post(handlers::toggle_slot))
        .route("/boards/{board_id}/commit", post(handlers::commit_board))
        .with_state(state)
}
