//! HTTP boundary: the action endpoint, read-only lookups and the live feed.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::protocol::{ActionRequest, GameInfo};
use crate::store::SessionStore;
use crate::sync;
use crate::types::{GameType, Session};

/// Run one action against the store. Returns the updated session snapshot,
/// or None when the action deleted the session (the last player leaving).
pub async fn dispatch(
    store: &SessionStore,
    request: ActionRequest,
) -> EngineResult<Option<Session>> {
    match request {
        ActionRequest::Create { host_name } => store.create(&host_name).await.map(Some),
        ActionRequest::Join { code, player_name } => {
            store.join(&code, &player_name).await.map(Some)
        }
        ActionRequest::Rejoin {
            session_id,
            player_id,
        } => store.rejoin(&session_id, &player_id).await.map(Some),
        ActionRequest::Leave {
            session_id,
            player_id,
        } => store.leave(&session_id, &player_id).await,
        ActionRequest::SelectGame {
            session_id,
            game_type,
        } => store.select_game(&session_id, game_type).await.map(Some),
        ActionRequest::StartRound { session_id } => {
            store.start_round(&session_id).await.map(Some)
        }
        ActionRequest::Submit {
            session_id,
            player_id,
            submission,
        } => store
            .submit(&session_id, &player_id, submission)
            .await
            .map(Some),
        ActionRequest::Vote {
            session_id,
            player_id,
            target_id,
        } => store
            .vote(&session_id, &player_id, &target_id)
            .await
            .map(Some),
        ActionRequest::ChangePhase { session_id, phase } => {
            store.change_phase(&session_id, phase).await.map(Some)
        }
        ActionRequest::EndRound { session_id } => store.end_round(&session_id).await.map(Some),
        ActionRequest::NextGame { session_id } => store.next_game(&session_id).await.map(Some),
        ActionRequest::UpdateSettings {
            session_id,
            settings,
        } => store
            .update_settings(&session_id, &settings)
            .await
            .map(Some),
    }
}

/// POST /api/session
///
/// Body is an [`ActionRequest`]; the response is the updated session (null
/// when the action deleted it) or a structured error.
pub async fn session_action(
    State(store): State<Arc<SessionStore>>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<Option<Session>>, EngineError> {
    let Json(request) = payload.map_err(|e| EngineError::InvalidRequest(e.body_text()))?;
    dispatch(&store, request).await.map(Json)
}

/// GET /api/session/{id}
pub async fn get_session(
    State(store): State<Arc<SessionStore>>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, EngineError> {
    store
        .snapshot(&session_id)
        .await
        .map(Json)
        .ok_or_else(|| EngineError::NotFound(format!("unknown session {session_id}")))
}

/// GET /api/session/by-code/{code}
pub async fn get_session_by_code(
    State(store): State<Arc<SessionStore>>,
    Path(code): Path<String>,
) -> Result<Json<Session>, EngineError> {
    store
        .snapshot_by_code(&code)
        .await
        .map(Json)
        .ok_or_else(|| EngineError::NotFound(format!("unknown join code {code}")))
}

/// GET /api/session/{id}/events
///
/// Long-lived NDJSON feed of [`crate::protocol::SyncEvent`] records.
pub async fn session_events(
    State(store): State<Arc<SessionStore>>,
    Path(session_id): Path<String>,
) -> Result<Response, EngineError> {
    let updates = store
        .subscribe(&session_id)
        .await
        .ok_or_else(|| EngineError::NotFound(format!("unknown session {session_id}")))?;

    let stream = sync::session_stream(store.clone(), session_id, updates);
    Ok((
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(stream),
    )
        .into_response())
}

/// GET /api/games
pub async fn list_games() -> Json<Vec<GameInfo>> {
    Json(GameType::ALL.into_iter().map(GameInfo::from).collect())
}
