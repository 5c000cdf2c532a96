//! HTTP API: request payloads, validation, the router, and handlers.
//!
//! Every response uses the same envelope: `{"success": true, "data": ...}`
//! with an optional `message` on mutations, or the error shape produced by
//! [`DomainError`]'s `IntoResponse`. Handlers stay thin; all domain rules
//! live in [`crate::db::Store`].

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use crate::auth::AuthUser;
use crate::db::{DbHandle, NewTask, TaskPatch};
use crate::error::DomainError;
use crate::models::{BoardRole, Priority, WorkspaceRole};

pub struct AppState {
    pub db: DbHandle,
}

pub type SharedState = Arc<AppState>;

// ── Request extraction ────────────────────────────────────────────────

/// JSON body extractor that reports malformed input through the standard
/// error envelope instead of axum's plain-text rejection.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = DomainError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| DomainError::Validation(e.body_text()))?;
        Ok(ValidJson(value))
    }
}

/// Distinguishes an absent field from an explicit `null`: absent maps to
/// `None`, `null` to `Some(None)`, a value to `Some(Some(v))`. Used for the
/// tri-state `wipLimit` and `description` updates.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn default_true() -> bool {
    true
}

// ── Payloads ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
}

impl CreateUserRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if self.email.trim().is_empty() {
            return Err(DomainError::Validation("Email is required".into()));
        }
        if !self.email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".into()));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Name is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CreateWorkspaceRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Workspace name is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl UpdateWorkspaceRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::Validation(
                    "Workspace name cannot be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWorkspaceMemberRequest {
    pub user_id: i64,
    pub role: Option<WorkspaceRole>,
}

impl AddWorkspaceMemberRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if self.role == Some(WorkspaceRole::Owner) {
            return Err(DomainError::Validation(
                "Role must be ADMIN or MEMBER".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRoleRequest {
    pub role: WorkspaceRole,
}

impl UpdateMemberRoleRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if self.role == WorkspaceRole::Owner {
            return Err(DomainError::Validation(
                "Role must be ADMIN or MEMBER".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub workspace_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub create_default_lanes: bool,
}

impl CreateBoardRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Board name is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl UpdateBoardRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::Validation("Board name cannot be empty".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBoardMemberRequest {
    pub user_id: i64,
    pub role: Option<BoardRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabelRequest {
    pub name: String,
    pub color: String,
}

impl CreateLabelRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Label name is required".into()));
        }
        if self.color.trim().is_empty() {
            return Err(DomainError::Validation("Label color is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignUserRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLabelRequest {
    pub label_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLaneRequest {
    pub name: String,
    pub position: Option<i64>,
    pub wip_limit: Option<i64>,
}

impl CreateLaneRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("Lane name is required".into()));
        }
        validate_position(self.position)?;
        validate_wip_limit(self.wip_limit)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLaneRequest {
    pub name: Option<String>,
    pub position: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub wip_limit: Option<Option<i64>>,
}

impl UpdateLaneRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::Validation("Lane name cannot be empty".into()));
            }
        }
        validate_position(self.position)?;
        if let Some(limit) = self.wip_limit {
            validate_wip_limit(limit)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanePositionEntry {
    pub id: i64,
    pub position: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderLanesRequest {
    pub lanes: Vec<LanePositionEntry>,
}

impl ReorderLanesRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if self.lanes.is_empty() {
            return Err(DomainError::Validation("Lanes array is required".into()));
        }
        for entry in &self.lanes {
            validate_position(Some(entry.position))?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub board_id: i64,
    pub lane_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub position: Option<i64>,
}

impl CreateTaskRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Task title is required".into()));
        }
        validate_position(self.position)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub position: Option<i64>,
}

impl UpdateTaskRequest {
    fn validate(&self) -> Result<(), DomainError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(DomainError::Validation("Task title cannot be empty".into()));
            }
        }
        validate_position(self.position)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    pub lane_id: i64,
    pub position: i64,
}

impl MoveTaskRequest {
    fn validate(&self) -> Result<(), DomainError> {
        validate_position(Some(self.position))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardsQuery {
    pub workspace_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksQuery {
    pub board_id: Option<i64>,
    pub lane_id: Option<i64>,
}

fn validate_position(position: Option<i64>) -> Result<(), DomainError> {
    match position {
        Some(p) if p < 0 => Err(DomainError::Validation(
            "Position must be non-negative".into(),
        )),
        _ => Ok(()),
    }
}

fn validate_wip_limit(limit: Option<i64>) -> Result<(), DomainError> {
    match limit {
        Some(l) if l < 1 => Err(DomainError::Validation(
            "WIP limit must be at least 1".into(),
        )),
        _ => Ok(()),
    }
}

// ── Response envelope ─────────────────────────────────────────────────

fn ok<T: Serialize>(data: T) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn ok_with_message<T: Serialize>(data: T, message: &str) -> Response {
    Json(json!({ "success": true, "data": data, "message": message })).into_response()
}

fn created<T: Serialize>(data: T, message: &str) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": data, "message": message })),
    )
        .into_response()
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/users", post(create_user))
        .route(
            "/api/workspaces",
            get(list_workspaces).post(create_workspace),
        )
        .route(
            "/api/workspaces/{id}",
            get(get_workspace)
                .put(update_workspace)
                .delete(delete_workspace),
        )
        .route(
            "/api/workspaces/{id}/members",
            get(list_workspace_members).post(add_workspace_member),
        )
        .route(
            "/api/workspaces/{id}/members/{user_id}",
            axum::routing::delete(remove_workspace_member),
        )
        .route(
            "/api/workspaces/{id}/members/{user_id}/role",
            put(update_workspace_member_role),
        )
        .route(
            "/api/workspaces/{id}/labels",
            get(list_labels).post(create_label),
        )
        .route(
            "/api/workspaces/{id}/labels/{label_id}",
            axum::routing::delete(delete_label),
        )
        .route("/api/boards", get(list_boards).post(create_board))
        .route(
            "/api/boards/{id}",
            get(get_board).put(update_board).delete(delete_board),
        )
        .route(
            "/api/boards/{id}/members",
            get(list_board_members).post(add_board_member),
        )
        .route(
            "/api/boards/{id}/members/{user_id}",
            axum::routing::delete(remove_board_member),
        )
        .route("/api/boards/{id}/lanes", post(create_lane))
        .route("/api/boards/{id}/lanes/reorder", post(reorder_lanes))
        .route(
            "/api/boards/{id}/lanes/{lane_id}",
            put(update_lane).delete(delete_lane),
        )
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/move", post(move_task))
        .route("/api/tasks/{id}/assignees", post(assign_user))
        .route(
            "/api/tasks/{id}/assignees/{user_id}",
            axum::routing::delete(unassign_user),
        )
        .route("/api/tasks/{id}/labels", post(add_label))
        .route(
            "/api/tasks/{id}/labels/{label_id}",
            axum::routing::delete(remove_label),
        )
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health() -> Response {
    Json(json!({
        "success": true,
        "message": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}

async fn create_user(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let user = state
        .db
        .call(move |db| db.create_user(payload.email.trim(), payload.name.trim()))
        .await?;
    Ok(created(user, "User created successfully"))
}

async fn list_workspaces(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    let workspaces = state.db.call(move |db| db.list_workspaces(user.id)).await?;
    Ok(ok(workspaces))
}

async fn create_workspace(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateWorkspaceRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let detail = state
        .db
        .call(move |db| {
            db.create_workspace(
                user.id,
                payload.name.trim(),
                payload.description.as_deref(),
            )
        })
        .await?;
    Ok(created(detail, "Workspace created successfully"))
}

async fn get_workspace(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    let detail = state
        .db
        .call(move |db| db.get_workspace(id, user.id))
        .await?;
    Ok(ok(detail))
}

async fn update_workspace(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<UpdateWorkspaceRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let detail = state
        .db
        .call(move |db| {
            db.update_workspace(
                id,
                user.id,
                payload.name.as_deref().map(str::trim),
                payload.description.as_ref().map(|d| d.as_deref()),
            )
        })
        .await?;
    Ok(ok_with_message(detail, "Workspace updated successfully"))
}

async fn delete_workspace(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    state
        .db
        .call(move |db| db.delete_workspace(id, user.id))
        .await?;
    Ok(ok_with_message(
        serde_json::Value::Null,
        "Workspace deleted successfully",
    ))
}

async fn list_workspace_members(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    let members = state
        .db
        .call(move |db| db.workspace_members(id, user.id))
        .await?;
    Ok(ok(members))
}

async fn add_workspace_member(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<AddWorkspaceMemberRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let role = payload.role.unwrap_or(WorkspaceRole::Member);
    let member = state
        .db
        .call(move |db| db.add_workspace_member(id, user.id, payload.user_id, role))
        .await?;
    Ok(created(member, "Member added successfully"))
}

async fn remove_workspace_member(
    State(state): State<SharedState>,
    Path((id, member_id)): Path<(i64, i64)>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    state
        .db
        .call(move |db| db.remove_workspace_member(id, user.id, member_id))
        .await?;
    Ok(ok_with_message(
        serde_json::Value::Null,
        "Member removed successfully",
    ))
}

async fn update_workspace_member_role(
    State(state): State<SharedState>,
    Path((id, member_id)): Path<(i64, i64)>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<UpdateMemberRoleRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let member = state
        .db
        .call(move |db| db.update_workspace_member_role(id, user.id, member_id, payload.role))
        .await?;
    Ok(ok_with_message(member, "Member role updated successfully"))
}

async fn list_boards(
    State(state): State<SharedState>,
    Query(query): Query<BoardsQuery>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    let boards = state
        .db
        .call(move |db| db.list_boards(user.id, query.workspace_id))
        .await?;
    Ok(ok(boards))
}

async fn create_board(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateBoardRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let detail = state
        .db
        .call(move |db| {
            db.create_board(
                user.id,
                payload.workspace_id,
                payload.name.trim(),
                payload.description.as_deref(),
                payload.create_default_lanes,
            )
        })
        .await?;
    Ok(created(detail, "Board created successfully"))
}

async fn get_board(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    let detail = state.db.call(move |db| db.get_board(id, user.id)).await?;
    Ok(ok(detail))
}

async fn update_board(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<UpdateBoardRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let detail = state
        .db
        .call(move |db| {
            db.update_board(
                id,
                user.id,
                payload.name.as_deref().map(str::trim),
                payload.description.as_ref().map(|d| d.as_deref()),
            )
        })
        .await?;
    Ok(ok_with_message(detail, "Board updated successfully"))
}

async fn delete_board(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    state.db.call(move |db| db.delete_board(id, user.id)).await?;
    Ok(ok_with_message(
        serde_json::Value::Null,
        "Board deleted successfully",
    ))
}

async fn list_board_members(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    let members = state
        .db
        .call(move |db| db.board_members(id, user.id))
        .await?;
    Ok(ok(members))
}

async fn add_board_member(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<AddBoardMemberRequest>,
) -> Result<Response, DomainError> {
    let role = payload.role.unwrap_or(BoardRole::Member);
    let member = state
        .db
        .call(move |db| db.add_board_member(id, user.id, payload.user_id, role))
        .await?;
    Ok(created(member, "Member added successfully"))
}

async fn remove_board_member(
    State(state): State<SharedState>,
    Path((id, member_id)): Path<(i64, i64)>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    state
        .db
        .call(move |db| db.remove_board_member(id, user.id, member_id))
        .await?;
    Ok(ok_with_message(
        serde_json::Value::Null,
        "Member removed successfully",
    ))
}

async fn create_lane(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateLaneRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let lane = state
        .db
        .call(move |db| {
            db.create_lane(
                id,
                user.id,
                payload.name.trim(),
                payload.position,
                payload.wip_limit,
            )
        })
        .await?;
    Ok(created(lane, "Lane created successfully"))
}

async fn update_lane(
    State(state): State<SharedState>,
    Path((id, lane_id)): Path<(i64, i64)>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<UpdateLaneRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let lane = state
        .db
        .call(move |db| {
            db.update_lane(
                id,
                lane_id,
                user.id,
                payload.name.as_deref().map(str::trim),
                payload.position,
                payload.wip_limit,
            )
        })
        .await?;
    Ok(ok_with_message(lane, "Lane updated successfully"))
}

async fn delete_lane(
    State(state): State<SharedState>,
    Path((id, lane_id)): Path<(i64, i64)>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    state
        .db
        .call(move |db| db.delete_lane(id, lane_id, user.id))
        .await?;
    Ok(ok_with_message(
        serde_json::Value::Null,
        "Lane deleted successfully",
    ))
}

async fn reorder_lanes(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<ReorderLanesRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let assignments: Vec<(i64, i64)> = payload
        .lanes
        .iter()
        .map(|entry| (entry.id, entry.position))
        .collect();
    let lanes = state
        .db
        .call(move |db| db.reorder_lanes(id, user.id, &assignments))
        .await?;
    Ok(ok_with_message(lanes, "Lanes reordered successfully"))
}

async fn list_tasks(
    State(state): State<SharedState>,
    Query(query): Query<TasksQuery>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    let tasks = state
        .db
        .call(move |db| db.list_tasks(user.id, query.board_id, query.lane_id))
        .await?;
    Ok(ok(tasks))
}

async fn create_task(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateTaskRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let new = NewTask {
        board_id: payload.board_id,
        lane_id: payload.lane_id,
        title: payload.title.trim().to_string(),
        description: payload.description,
        priority: payload.priority.unwrap_or(Priority::Medium),
        position: payload.position,
    };
    let task = state.db.call(move |db| db.create_task(user.id, new)).await?;
    Ok(created(task, "Task created successfully"))
}

async fn get_task(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    let detail = state
        .db
        .call(move |db| db.get_task_detail(id, user.id))
        .await?;
    Ok(ok(detail))
}

async fn update_task(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<UpdateTaskRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let patch = TaskPatch {
        title: payload.title.map(|t| t.trim().to_string()),
        description: payload.description,
        priority: payload.priority,
        position: payload.position,
    };
    let task = state
        .db
        .call(move |db| db.update_task(id, user.id, patch))
        .await?;
    Ok(ok_with_message(task, "Task updated successfully"))
}

async fn delete_task(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    state.db.call(move |db| db.delete_task(id, user.id)).await?;
    Ok(ok_with_message(
        serde_json::Value::Null,
        "Task deleted successfully",
    ))
}

async fn move_task(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<MoveTaskRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let task = state
        .db
        .call(move |db| db.move_task(id, user.id, payload.lane_id, payload.position))
        .await?;
    Ok(ok_with_message(task, "Task moved successfully"))
}

async fn list_labels(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    let labels = state.db.call(move |db| db.list_labels(id, user.id)).await?;
    Ok(ok(labels))
}

async fn create_label(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateLabelRequest>,
) -> Result<Response, DomainError> {
    payload.validate()?;
    let label = state
        .db
        .call(move |db| db.create_label(id, user.id, payload.name.trim(), payload.color.trim()))
        .await?;
    Ok(created(label, "Label created successfully"))
}

async fn delete_label(
    State(state): State<SharedState>,
    Path((id, label_id)): Path<(i64, i64)>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    state
        .db
        .call(move |db| db.delete_label(id, label_id, user.id))
        .await?;
    Ok(ok_with_message(
        serde_json::Value::Null,
        "Label deleted successfully",
    ))
}

async fn assign_user(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<AssignUserRequest>,
) -> Result<Response, DomainError> {
    let assignees = state
        .db
        .call(move |db| db.assign_user(id, user.id, payload.user_id))
        .await?;
    Ok(created(assignees, "User assigned successfully"))
}

async fn unassign_user(
    State(state): State<SharedState>,
    Path((id, assignee_id)): Path<(i64, i64)>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    state
        .db
        .call(move |db| db.unassign_user(id, user.id, assignee_id))
        .await?;
    Ok(ok_with_message(
        serde_json::Value::Null,
        "User unassigned successfully",
    ))
}

async fn add_label(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<AddLabelRequest>,
) -> Result<Response, DomainError> {
    let labels = state
        .db
        .call(move |db| db.add_label(id, user.id, payload.label_id))
        .await?;
    Ok(created(labels, "Label added successfully"))
}

async fn remove_label(
    State(state): State<SharedState>,
    Path((id, label_id)): Path<(i64, i64)>,
    AuthUser(user): AuthUser,
) -> Result<Response, DomainError> {
    state
        .db
        .call(move |db| db.remove_label(id, user.id, label_id))
        .await?;
    Ok(ok_with_message(
        serde_json::Value::Null,
        "Label removed successfully",
    ))
}
