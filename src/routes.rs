use axum::{
    Json, Router,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use std::sync::Arc;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::{
    catalog::{catalog, Catalog},
    gemini::InlineImage,
    generator::ConceptGenerator,
    models::{Concept, DesignInputs, FieldErrors, LeadRequest, LoadingState},
    session::{DesignSession, SessionError, SessionStore, ViewState},
};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<SessionStore>>,
    pub generator: Arc<ConceptGenerator>,
    pub public_url: Arc<str>,
}

impl AppState {
    pub fn new(generator: ConceptGenerator, public_url: &str, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(SessionStore::new(max_sessions))),
            generator: Arc::new(generator),
            public_url: public_url.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/options", get(get_options))
        .route("/api/embed", get(embed_code))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/concepts", post(generate_concepts))
        .route("/api/sessions/:id/concepts/:concept_id/refine", post(refine_concept))
        .route("/api/sessions/:id/concepts/:concept_id/image", get(download_image))
        .route("/api/sessions/:id/leads", post(capture_lead))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ConceptView {
    #[serde(flatten)]
    pub concept: Concept,
    pub estimated_cost: f64,
    pub cost_label: String,
}

impl From<&Concept> for ConceptView {
    fn from(concept: &Concept) -> Self {
        Self { concept: concept.clone(), estimated_cost: concept.estimated_cost(), cost_label: concept.cost_label() }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub state: LoadingState,
    pub current: Vec<ConceptView>,
    pub history: Vec<ConceptView>,
    pub form_initial_values: Option<DesignInputs>,
    pub notice: Option<&'static str>,
    pub view: ViewState,
}

impl SessionSnapshot {
    fn of(id: Uuid, session: &DesignSession) -> Self {
        Self {
            id,
            state: session.state(),
            current: session.current().iter().map(ConceptView::from).collect(),
            history: session.history().map(ConceptView::from).collect(),
            form_initial_values: session.form_initial_values().cloned(),
            notice: session.notice(),
            view: session.view(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session not found")] SessionNotFound,
    #[error("concept not found")] ConceptNotFound,
    #[error("some required fields are missing")] Validation(FieldErrors),
    #[error(transparent)] Session(#[from] SessionError),
    #[error("concept generation failed")] Generation(Box<SessionSnapshot>),
    #[error("stored image could not be decoded")] BadImage,
    #[error("internal error")] Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::SessionNotFound | ApiError::ConceptNotFound | ApiError::Session(SessionError::UnknownConcept(_)) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Validation(fields) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": message, "fields": fields }))).into_response()
            }
            ApiError::Session(SessionError::InvalidLead(reason)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": reason }))).into_response()
            }
            ApiError::Session(SessionError::Busy | SessionError::NothingToRefine) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Generation(snapshot) => {
                (StatusCode::BAD_GATEWAY, Json(json!({ "error": snapshot.notice, "session": snapshot }))).into_response()
            }
            ApiError::BadImage | ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

pub async fn get_options() -> Json<Catalog> {
    Json(catalog())
}

pub async fn embed_code(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snippet = format!(
        r#"<iframe src="{}" width="100%" height="800" style="border:0; width:100%; min-height:100vh;"></iframe>"#,
        state.public_url
    );
    Json(json!({ "embed_code": snippet }))
}

pub async fn create_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let id = Uuid::new_v4();
    let session = DesignSession::default();
    let snapshot = SessionSnapshot::of(id, &session);
    let live = {
        let mut guard = state.sessions.write();
        guard.insert(id, session);
        guard.len()
    };
    tracing::info!("🆕 Created design session {} ({} live)", id, live);
    Json(snapshot)
}

pub async fn get_session(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let guard = state.sessions.read();
    let session = guard.get(&id).ok_or(ApiError::SessionNotFound)?;
    Ok(Json(SessionSnapshot::of(id, session)))
}

pub async fn generate_concepts(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(inputs): Json<DesignInputs>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    inputs.validate().map_err(ApiError::Validation)?;

    {
        let mut guard = state.sessions.write();
        let session = guard.get_mut(&id).ok_or(ApiError::SessionNotFound)?;
        session.begin()?;
    }

    tracing::info!("🚀 Session {} generating concepts", id);
    // The batch settles in a detached task, so the session leaves Generating
    // even if this request is dropped or the generation itself panics.
    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let generator = task_state.generator.clone();
        let outcome = tokio::spawn(async move { generator.generate(&inputs).await }).await;
        let mut guard = task_state.sessions.write();
        let session = guard.get_mut(&id)?;
        let failed = match outcome {
            Ok(result) => {
                let failed = result.is_err();
                session.finish(result);
                failed
            }
            Err(join_error) => {
                tracing::error!("❌ Generation task for session {} died: {}", id, join_error);
                session.fail(&join_error);
                true
            }
        };
        Some((failed, SessionSnapshot::of(id, session)))
    });

    match task.await {
        Ok(Some((false, snapshot))) => Ok(Json(snapshot)),
        Ok(Some((true, snapshot))) => Err(ApiError::Generation(Box::new(snapshot))),
        Ok(None) => Err(ApiError::SessionNotFound),
        Err(join_error) => {
            tracing::error!("❌ Session {} could not be settled: {}", id, join_error);
            Err(ApiError::Internal)
        }
    }
}

pub async fn refine_concept(
    Path((id, concept_id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let mut guard = state.sessions.write();
    let session = guard.get_mut(&id).ok_or(ApiError::SessionNotFound)?;
    session.refine(concept_id)?;
    Ok(Json(SessionSnapshot::of(id, session)))
}

pub async fn download_image(
    Path((id, concept_id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let concept = {
        let guard = state.sessions.read();
        let session = guard.get(&id).ok_or(ApiError::SessionNotFound)?;
        session.find_concept(concept_id).cloned().ok_or(ApiError::ConceptNotFound)?
    };

    let image = InlineImage::from_data_uri(&concept.image_url).ok_or(ApiError::BadImage)?;
    let data = image.bytes().map_err(|_| ApiError::BadImage)?;
    let extension = image::ImageFormat::from_mime_type(&image.mime_type)
        .or_else(|| image::guess_format(&data).ok())
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("png");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&image.mime_type).map_err(|_| ApiError::BadImage)?,
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", concept.download_name(extension)))
            .map_err(|_| ApiError::BadImage)?,
    );
    Ok((StatusCode::OK, headers, Bytes::from(data)).into_response())
}

pub async fn capture_lead(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<LeadRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut guard = state.sessions.write();
    let session = guard.get_mut(&id).ok_or(ApiError::SessionNotFound)?;
    let message = session.capture_lead(&body.name, &body.email)?;
    Ok(Json(json!({ "submitted": true, "message": message })))
}
