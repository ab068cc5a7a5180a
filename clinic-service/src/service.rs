use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use report_builder::{PptxSerializer, ReportError, require_text};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    config::ClinicConfig,
    consultation::{ConsultationError, Submission, consult},
    model::{GeminiClient, ModelClient},
    models::{ConsultRequest, ConsultResponse, ReportRequest, SessionResponse},
    prompt::EMERGENCY_LINK,
    report::{ReportFile, ReportGenerator},
    session::{InMemorySessionStore, Session, SessionLocks, SessionStore},
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn bad_gateway_error(message: &str, id: &str, details: &str) -> ApiError {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({
            "error": message,
            "session_id": id,
            "details": details
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn report_error(err: ReportError) -> ApiError {
    match err {
        ReportError::InvalidInput(message) => bad_request_error(&message),
        other => {
            error!("Failed to generate report: {}", other);
            internal_error("Failed to generate report", &other.to_string())
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub session_store: Arc<dyn SessionStore>,
    pub model: Arc<dyn ModelClient>,
    pub reports: ReportGenerator,
    pub session_locks: SessionLocks,
}

impl AppState {
    pub fn new(
        session_store: Arc<dyn SessionStore>,
        model: Arc<dyn ModelClient>,
        reports: ReportGenerator,
    ) -> Self {
        Self {
            session_store,
            model,
            reports,
            session_locks: SessionLocks::new(),
        }
    }
}

pub fn create_app(config: &ClinicConfig) -> Router {
    build_router(create_app_state(config))
}

fn create_app_state(config: &ClinicConfig) -> AppState {
    let serializer = match &config.report_creator {
        Some(creator) => PptxSerializer::new().with_creator(creator),
        None => PptxSerializer::new(),
    };
    let reports = ReportGenerator::new(
        config.report.clone(),
        config.report_style,
        Arc::new(serializer),
    );

    AppState::new(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(GeminiClient::from_config(config)),
        reports,
    )
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/clinic/consult", post(start_consultation))
        .route("/clinic/report", post(report_from_text))
        .route(
            "/clinic/{session_id}",
            get(get_session_history).delete(clear_session),
        )
        .route("/clinic/{session_id}/report", get(report_from_session))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Dr. AI Smart Clinic",
        "version": "1.0.0",
        "description": "Medical-only consultations from text, voice or images, with PPTX reports",
        "emergency": EMERGENCY_LINK,
        "endpoints": {
            "POST /clinic/consult": "Submit symptoms as text, audio and/or an image",
            "GET /clinic/{session_id}": "Get the chat history",
            "DELETE /clinic/{session_id}": "Clear the chat history",
            "GET /clinic/{session_id}/report": "Download the latest reply as a PPTX report",
            "POST /clinic/report": "Build a PPTX report from arbitrary diagnosis text",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn start_consultation(
    State(state): State<AppState>,
    Json(request): Json<ConsultRequest>,
) -> ApiResult<ConsultResponse> {
    info!(
        session_id = ?request.session_id,
        has_text = request.text.is_some(),
        has_audio = request.audio.is_some(),
        has_image = request.image.is_some(),
        "Processing consultation request"
    );

    let submission =
        Submission::from_request(&request).map_err(|e| bad_request_error(&e.to_string()))?;
    let (mut session, turn) = lock_session(&state, request.session_id.as_deref()).await?;

    let result = consult(state.model.as_ref(), &mut session, submission).await;
    let session_id = session.id.clone();
    state.session_store.save(session).await;
    drop(turn);

    match result {
        Ok(reply) => Ok(Json(ConsultResponse {
            report_url: format!("/clinic/{}/report", session_id),
            session_id,
            reply,
        })),
        Err(ConsultationError::InvalidSubmission(message)) => Err(bad_request_error(&message)),
        Err(ConsultationError::Model(e)) => {
            Err(bad_gateway_error("Medical analysis failed", &session_id, &e.to_string()))
        }
    }
}

fn validate_session_id(session_id: &str) -> Result<(), ApiError> {
    if Uuid::parse_str(session_id).is_err() {
        error!(session_id = %session_id, "Invalid session ID format");
        return Err(bad_request_error("Invalid session ID format"));
    }
    Ok(())
}

/// Loads the named session, or starts a new one when no id is given.
///
/// The session is read only after its lock is taken, and the guard must be
/// held until the updated session is saved.
async fn lock_session(
    state: &AppState,
    session_id: Option<&str>,
) -> Result<(Session, OwnedMutexGuard<()>), ApiError> {
    let Some(session_id) = session_id else {
        let session = Session::new(Uuid::new_v4().to_string());
        info!(session_id = %session.id, "Creating new session");
        let guard = state.session_locks.acquire(&session.id).await;
        return Ok((session, guard));
    };

    validate_session_id(session_id)?;
    let guard = state.session_locks.acquire(session_id).await;

    let session = state
        .session_store
        .get(session_id)
        .await
        .ok_or_else(|| not_found_error("Session not found", session_id))?;
    Ok((session, guard))
}

async fn get_session_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    info!("Getting history for session: {}", session_id);
    validate_session_id(&session_id)?;

    match state.session_store.get(&session_id).await {
        Some(session) => Ok(Json(SessionResponse {
            session_id: session.id,
            messages: session.log.messages().to_vec(),
        })),
        None => Err(not_found_error("Session not found", &session_id)),
    }
}

async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    info!("Clearing session: {}", session_id);
    validate_session_id(&session_id)?;

    // waits for a turn in flight, so its save cannot bring the session back
    let guard = state.session_locks.acquire(&session_id).await;
    let removed = state.session_store.delete(&session_id).await;
    state.session_locks.forget(&session_id);
    drop(guard);

    if removed {
        Ok(Json(json!({
            "session_id": session_id,
            "status": "cleared"
        })))
    } else {
        Err(not_found_error("Session not found", &session_id))
    }
}

async fn report_from_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    info!("Generating report for session: {}", session_id);
    validate_session_id(&session_id)?;

    let session = state
        .session_store
        .get(&session_id)
        .await
        .ok_or_else(|| not_found_error("Session not found", &session_id))?;

    let reply = session
        .log
        .last_reply()
        .ok_or_else(|| not_found_error("No diagnosis available for this session yet", &session_id))?;

    let file = state.reports.generate(&reply.content).map_err(report_error)?;
    Ok(download(file))
}

async fn report_from_text(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Response, ApiError> {
    let text = match &request.text {
        None => None,
        Some(Value::String(text)) => Some(text.as_str()),
        Some(_) => {
            return Err(report_error(ReportError::InvalidInput(
                "diagnosis text must be a string".to_string(),
            )));
        }
    };
    let text = require_text(text).map_err(report_error)?;
    info!("Generating report from {} characters of text", text.chars().count());

    let file = state.reports.generate(text).map_err(report_error)?;
    Ok(download(file))
}

fn download(file: ReportFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consultation::tests::ScriptedModel;
    use crate::model::ModelError;
    use crate::session::Role;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use report_builder::{PPTX_CONTENT_TYPE, ReportConfig, ReportStyle};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state(model: ScriptedModel) -> AppState {
        AppState::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(model),
            ReportGenerator::new(
                ReportConfig::default(),
                ReportStyle::default(),
                Arc::new(PptxSerializer::new()),
            ),
        )
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn consultation_then_history_then_report() {
        let state = test_state(ScriptedModel::replying(vec![Ok(
            "Likely seasonal allergy.\nTry an antihistamine.".to_string(),
        )]));
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/clinic/consult",
                json!({ "text": "sneezing and itchy eyes" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let session_id = body["session_id"].as_str().unwrap().to_string();
        assert_eq!(body["reply"], "Likely seasonal allergy.\nTry an antihistamine.");
        assert_eq!(body["report_url"], format!("/clinic/{}/report", session_id));

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/clinic/{}", session_id)))
            .await
            .unwrap();
        let history = body_json(response).await;
        assert_eq!(history["messages"].as_array().unwrap().len(), 2);
        assert_eq!(history["messages"][0]["role"], "user");
        assert_eq!(history["messages"][0]["content"], "sneezing and itchy eyes");

        let response = app
            .oneshot(empty_request("GET", &format!("/clinic/{}/report", session_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            PPTX_CONTENT_TYPE
        );
        assert!(
            response.headers()[header::CONTENT_DISPOSITION]
                .to_str()
                .unwrap()
                .contains("Medical_Report.pptx")
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn empty_submission_is_bad_request() {
        let app = build_router(test_state(ScriptedModel::replying(vec![])));
        let response = app
            .oneshot(json_request("POST", "/clinic/consult", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let app = build_router(test_state(ScriptedModel::replying(vec![])));
        let response = app
            .oneshot(json_request(
                "POST",
                "/clinic/consult",
                json!({ "session_id": Uuid::new_v4().to_string(), "text": "cough" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_session_id_is_bad_request() {
        let app = build_router(test_state(ScriptedModel::replying(vec![])));
        let response = app
            .oneshot(json_request(
                "POST",
                "/clinic/consult",
                json!({ "session_id": "not-a-uuid", "text": "cough" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn model_failure_is_bad_gateway_and_keeps_user_turn() {
        let state = test_state(ScriptedModel::replying(vec![Err(ModelError::EmptyResponse)]));
        let store = state.session_store.clone();
        let app = build_router(state);

        let response = app
            .oneshot(json_request("POST", "/clinic/consult", json!({ "text": "fever" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert!(body["details"].as_str().unwrap().contains("no text"));

        let session_id = body["session_id"].as_str().unwrap();
        let session = store.get(session_id).await.unwrap();
        assert_eq!(session.log.len(), 1);
        assert_eq!(session.log.messages()[0].content, "fever");
    }

    #[tokio::test]
    async fn report_before_any_reply_is_not_found() {
        let state = test_state(ScriptedModel::replying(vec![]));
        let session_id = Uuid::new_v4().to_string();
        state.session_store.save(Session::new(session_id.clone())).await;
        let app = build_router(state);

        let response = app
            .oneshot(empty_request("GET", &format!("/clinic/{}/report", session_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn clearing_removes_history() {
        let state = test_state(ScriptedModel::replying(vec![]));
        let session_id = Uuid::new_v4().to_string();
        state.session_store.save(Session::new(session_id.clone())).await;
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/clinic/{}", session_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(empty_request("GET", &format!("/clinic/{}", session_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn report_from_text_requires_text() {
        let app = build_router(test_state(ScriptedModel::replying(vec![])));

        let response = app
            .clone()
            .oneshot(json_request("POST", "/clinic/report", json!({ "text": null })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request("POST", "/clinic/report", json!({ "text": "" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn concurrent_turns_on_one_session_keep_every_message() {
        let model = ScriptedModel::replying(vec![
            Ok("Rest your voice.".to_string()),
            Ok("Try warm salt water.".to_string()),
        ])
        .with_delay(Duration::from_millis(100));
        let state = test_state(model);
        let store = state.session_store.clone();
        let session_id = Uuid::new_v4().to_string();
        store.save(Session::new(session_id.clone())).await;
        let app = build_router(state);

        let (first, second) = tokio::join!(
            app.clone().oneshot(json_request(
                "POST",
                "/clinic/consult",
                json!({ "session_id": session_id, "text": "hoarse voice" }),
            )),
            app.clone().oneshot(json_request(
                "POST",
                "/clinic/consult",
                json!({ "session_id": session_id, "text": "sore throat" }),
            )),
        );
        assert_eq!(first.unwrap().status(), StatusCode::OK);
        assert_eq!(second.unwrap().status(), StatusCode::OK);

        let session = store.get(&session_id).await.unwrap();
        let roles: Vec<Role> = session.log.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
    }

    #[tokio::test]
    async fn clear_during_a_turn_stays_cleared() {
        let model = ScriptedModel::replying(vec![Ok("Apply a cold compress.".to_string())])
            .with_delay(Duration::from_millis(100));
        let state = test_state(model);
        let store = state.session_store.clone();
        let session_id = Uuid::new_v4().to_string();
        store.save(Session::new(session_id.clone())).await;
        let app = build_router(state);

        let (consulted, cleared) = tokio::join!(
            app.clone().oneshot(json_request(
                "POST",
                "/clinic/consult",
                json!({ "session_id": session_id, "text": "swollen ankle" }),
            )),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                app.clone()
                    .oneshot(empty_request("DELETE", &format!("/clinic/{}", session_id)))
                    .await
            },
        );
        assert_eq!(consulted.unwrap().status(), StatusCode::OK);
        assert_eq!(cleared.unwrap().status(), StatusCode::OK);
        assert!(store.get(&session_id).await.is_none());
    }

    #[tokio::test]
    async fn non_string_report_text_is_bad_request() {
        let app = build_router(test_state(ScriptedModel::replying(vec![])));
        let response = app
            .oneshot(json_request("POST", "/clinic/report", json!({ "text": 42 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "diagnosis text must be a string");
    }

    #[tokio::test]
    async fn malformed_session_id_is_bad_request_on_every_route() {
        let app = build_router(test_state(ScriptedModel::replying(vec![])));
        for (method, uri) in [
            ("GET", "/clinic/not-a-uuid"),
            ("DELETE", "/clinic/not-a-uuid"),
            ("GET", "/clinic/not-a-uuid/report"),
        ] {
            let response = app.clone().oneshot(empty_request(method, uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn root_lists_emergency_link() {
        let app = build_router(test_state(ScriptedModel::replying(vec![])));
        let response = app.oneshot(empty_request("GET", "/")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["emergency"], EMERGENCY_LINK);
    }
}
