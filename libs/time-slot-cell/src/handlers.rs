use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::extractor::caller_identity;

use crate::models::{
    BoardResponse, CreateBoardRequest, SelectDateRequest, SelectDepartmentRequest, TimePoint,
    ToggleResponse,
};
use crate::services::registry::TimeSlotState;

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

#[axum::debug_handler]
pub async fn list_departments(
    State(state): State<Arc<TimeSlotState>>,
    auth: BearerHeader,
) -> Result<Json<Value>, AppError> {
    let identity = caller_identity(auth);
    let directory = state.registry.departments(identity.as_ref()).await;

    Ok(Json(json!({
        "departments": directory.departments(),
        "total": directory.departments().len()
    })))
}

#[axum::debug_handler]
pub async fn create_board(
    State(state): State<Arc<TimeSlotState>>,
    auth: BearerHeader,
    Json(request): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<BoardResponse>), AppError> {
    let (board_id, board, refresh) = state
        .registry
        .create(caller_identity(auth), request)
        .await?;

    let board = board.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(BoardResponse {
            board: board.view(board_id),
            refresh: Some(refresh),
            commit: None,
        }),
    ))
}

#[axum::debug_handler]
pub async fn get_board(
    State(state): State<Arc<TimeSlotState>>,
    Path(board_id): Path<Uuid>,
) -> Result<Json<BoardResponse>, AppError> {
    let board = state.registry.get(board_id).await?;
    let board = board.lock().await;

    Ok(Json(BoardResponse {
        board: board.view(board_id),
        refresh: None,
        commit: None,
    }))
}

#[axum::debug_handler]
pub async fn select_department(
    State(state): State<Arc<TimeSlotState>>,
    Path(board_id): Path<Uuid>,
    auth: BearerHeader,
    Json(request): Json<SelectDepartmentRequest>,
) -> Result<Json<BoardResponse>, AppError> {
    let board = state.registry.get(board_id).await?;
    let mut board = board.lock().await;
    board.set_identity(caller_identity(auth));
    state.registry.refresh_directory(&mut board).await;

    let refresh = board.select_department(request.department_id).await?;

    Ok(Json(BoardResponse {
        board: board.view(board_id),
        refresh: Some(refresh),
        commit: None,
    }))
}

#[axum::debug_handler]
pub async fn select_date(
    State(state): State<Arc<TimeSlotState>>,
    Path(board_id): Path<Uuid>,
    auth: BearerHeader,
    Json(request): Json<SelectDateRequest>,
) -> Result<Json<BoardResponse>, AppError> {
    let board = state.registry.get(board_id).await?;
    let mut board = board.lock().await;
    board.set_identity(caller_identity(auth));

    let refresh = board.select_date(request.date).await?;

    Ok(Json(BoardResponse {
        board: board.view(board_id),
        refresh: Some(refresh),
        commit: None,
    }))
}

#[axum::debug_handler]
pub async fn refresh_board(
    State(state): State<Arc<TimeSlotState>>,
    Path(board_id): Path<Uuid>,
    auth: BearerHeader,
) -> Result<Json<BoardResponse>, AppError> {
    let board = state.registry.get(board_id).await?;
    let mut board = board.lock().await;
    board.set_identity(caller_identity(auth));

    let refresh = board.refresh().await?;

    Ok(Json(BoardResponse {
        board: board.view(board_id),
        refresh: Some(refresh),
        commit: None,
    }))
}

#[axum::debug_handler]
pub async fn toggle_slot(
    State(state): State<Arc<TimeSlotState>>,
    Path((board_id, time)): Path<(Uuid, String)>,
) -> Result<Json<ToggleResponse>, AppError> {
    let time: TimePoint = time.parse()?;

    let board = state.registry.get(board_id).await?;
    let mut board = board.lock().await;
    let slot = board.toggle(time)?;

    Ok(Json(ToggleResponse {
        slot,
        staging: board.grid().staging_entries(),
    }))
}

#[axum::debug_handler]
pub async fn commit_board(
    State(state): State<Arc<TimeSlotState>>,
    Path(board_id): Path<Uuid>,
    auth: BearerHeader,
) -> Result<Json<BoardResponse>, AppError> {
    let board = state.registry.get(board_id).await?;
    let mut board = board.lock().await;
    board.set_identity(caller_identity(auth));

    let commit = board.commit().await?;

    Ok(Json(BoardResponse {
        board: board.view(board_id),
        refresh: None,
        commit: Some(commit),
    }))
}

#[axum::debug_handler]
pub async fn close_board(
    State(state): State<Arc<TimeSlotState>>,
    Path(board_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.registry.remove(board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
