use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Bearer token the mock accepts unless `app_with_token` says otherwise.
pub const DEFAULT_TOKEN: &str = "mock-token";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    projects: Arc<RwLock<HashMap<Uuid, Project>>>,
}

/// Error response in the API's `{"detail": ...}` shape.
pub struct Failure {
    status: StatusCode,
    body: serde_json::Value,
}

impl Failure {
    fn detail(status: StatusCode, detail: &str) -> Self {
        Self {
            status,
            body: json!({ "detail": detail }),
        }
    }

    fn bare(status: StatusCode) -> Self {
        Self {
            status,
            body: json!({}),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn app() -> Router {
    app_with_token(DEFAULT_TOKEN)
}

pub fn app_with_token(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        projects: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/api/health", get(health))
        .route("/api/admin", get(admin))
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Missing header gets a detail; a wrong token gets an empty body so
/// clients fall back to their own text.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Failure> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Failure::detail(StatusCode::UNAUTHORIZED, "Not authenticated"))?;
    match value.strip_prefix("Bearer ") {
        Some(token) if token == &*state.token => Ok(()),
        _ => Err(Failure::bare(StatusCode::UNAUTHORIZED)),
    }
}

fn not_found() -> Failure {
    Failure::detail(StatusCode::NOT_FOUND, "Project not found")
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn admin(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, Failure> {
    authorize(&state, &headers)?;
    Err(Failure::detail(StatusCode::FORBIDDEN, "Admin privileges required"))
}

async fn list_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Project>>, Failure> {
    authorize(&state, &headers)?;
    let projects = state.projects.read().await;
    Ok(Json(projects.values().cloned().collect()))
}

async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateProject>,
) -> Result<(StatusCode, Json<Project>), Failure> {
    authorize(&state, &headers)?;
    if input.name.trim().is_empty() {
        return Err(Failure {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: json!({
                "detail": [{ "loc": ["body", "name"], "msg": "name must not be empty" }]
            }),
        });
    }
    let project = Project {
        id: Uuid::new_v4(),
        name: input.name,
        description: input.description,
    };
    tracing::debug!(id = %project.id, "project created");
    state.projects.write().await.insert(project.id, project.clone());
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, Failure> {
    authorize(&state, &headers)?;
    let projects = state.projects.read().await;
    projects.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProject>,
) -> Result<Json<Project>, Failure> {
    authorize(&state, &headers)?;
    let mut projects = state.projects.write().await;
    let project = projects.get_mut(&id).ok_or_else(not_found)?;
    if let Some(name) = input.name {
        project.name = name;
    }
    if let Some(description) = input.description {
        project.description = Some(description);
    }
    Ok(Json(project.clone()))
}

async fn delete_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Failure> {
    authorize(&state, &headers)?;
    let mut projects = state.projects.write().await;
    projects
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}
