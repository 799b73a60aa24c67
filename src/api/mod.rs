// REST API endpoints guarded by bearer tokens

use axum::{
    Extension, Router,
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use http::{StatusCode, header::AUTHORIZATION};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::auth::{AuthError, BearerAuthenticator, Principal, PseudoRoleCatalog};
use crate::metadata::ResourceDescriptor;

/// Shared state for the API routers.
#[derive(Clone)]
pub struct AppState {
    authenticator: Arc<BearerAuthenticator<PseudoRoleCatalog>>,
    resources: Arc<Vec<ResourceDescriptor>>,
}

impl AppState {
    /// `resources` must already have passed through the group deriver.
    pub fn new(
        authenticator: BearerAuthenticator<PseudoRoleCatalog>,
        resources: Vec<ResourceDescriptor>,
    ) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            resources: Arc::new(resources),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/me", get(current_principal))
        .route("/resources", get(list_resources))
        .route("/resources/{name}", get(get_resource))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Reject requests without a valid bearer token; store the principal otherwise.
async fn require_bearer(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match state
        .authenticator
        .authenticate_header(authorization.as_deref())
        .await
    {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => auth_failure(err),
    }
}

fn auth_failure(err: AuthError) -> Response {
    let (status, error) = match &err {
        AuthError::Database(msg) => {
            error!("Authentication failed: database error - {}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
        other => {
            warn!("Authentication failed: {}", other);
            (StatusCode::UNAUTHORIZED, "unauthorized")
        }
    };

    let body = json!({
        "status": status.as_u16(),
        "error": error,
        "message": err.to_string(),
    });

    (status, Json(body)).into_response()
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

async fn current_principal(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}

async fn list_resources(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "resources": state.resources.as_ref(),
        "count": state.resources.len(),
    }))
}

/// Resource names match case-insensitively, like the group element segment.
async fn get_resource(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ResourceDescriptor>, StatusCode> {
    state
        .resources
        .iter()
        .find(|resource| resource.name.as_str().eq_ignore_ascii_case(&name))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
