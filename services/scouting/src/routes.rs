//! Scouting service routes

use auth::{carrier::CarrierUpdate, credentials::LoginCredentials, session::LoginError};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use common::{
    demo::DEMO_NOTICE,
    records::PlayerRecord,
    store::{RecordStore, SaveOutcome},
};
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{CurrentSession, require_login, session_middleware, set_carrier_header},
    models::{
        IndexedPlayer, LoginResponse, NavigationRequest, PlayerListResponse, PlayerQuery,
        PlayerUpdate, SessionResponse, WriteResponse,
    },
    players::{DashboardStats, PlayerFilter, apply_update},
    state::AppState,
    validation::validate_player,
};

/// Number of tabs in the main view: dashboard, add, edit, search
pub const TAB_COUNT: usize = 4;

/// Create the router for the scouting service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/players", get(list_players).post(create_player))
        .route("/players/stats", get(player_stats))
        .route("/players/:index", put(update_player).delete(delete_player))
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/session", get(current_session))
        .route("/session/navigation", put(navigate))
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "scouting-service",
        "demo_mode": state.store.is_demo(),
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Json(payload): Json<LoginCredentials>,
) -> ApiResult<Response> {
    info!("Login attempt for user: {}", payload.username);

    let grant = state
        .reconstructor
        .authorize(&payload)
        .map_err(|e| match e {
            LoginError::InvalidCredentials => ApiError::InvalidCredentials,
            LoginError::Token(e) => {
                error!("Failed to mint token: {}", e);
                ApiError::InternalServerError
            }
        })?;

    let (session, token) = state
        .sessions
        .update(&session, |live| state.reconstructor.admit(live, grant))
        .await
        .ok_or(ApiError::Unauthorized)?;

    let body = LoginResponse {
        session_id: session.session_id(),
        username: payload.username,
        auth: token.clone(),
        message: "Login successful".to_string(),
    };

    let mut response = (StatusCode::OK, Json(body)).into_response();
    set_carrier_header(response.headers_mut(), CarrierUpdate::Set(token));
    Ok(response)
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Response {
    let update = state
        .sessions
        .update(&session, |live| state.reconstructor.logout(live))
        .await
        .map_or(CarrierUpdate::Remove, |(_, update)| update);

    let mut response = (
        StatusCode::OK,
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response();
    set_carrier_header(response.headers_mut(), update);
    response
}

/// Current session endpoint
pub async fn current_session(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> impl IntoResponse {
    Json(SessionResponse {
        session,
        demo_mode: state.store.is_demo(),
    })
}

/// Tab and record selection endpoint
pub async fn navigate(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Json(payload): Json<NavigationRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(tab) = payload.active_tab {
        if tab >= TAB_COUNT {
            return Err(ApiError::BadRequest(format!(
                "Tab index must be below {}",
                TAB_COUNT
            )));
        }
    }

    // Index 0 is the default selection, also for an empty sheet.
    if let Some(index) = payload.selected_record_index.filter(|&index| index > 0) {
        let total = state.store.load_all().await?.len();
        if index >= total {
            return Err(ApiError::BadRequest(format!(
                "No player at index {}",
                index
            )));
        }
    }

    let (session, ()) = state
        .sessions
        .update(&session, |live| {
            if let Some(tab) = payload.active_tab {
                live.set_active_tab(tab);
            }
            if let Some(index) = payload.selected_record_index {
                live.select_record(index);
            }
        })
        .await
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(SessionResponse {
        session,
        demo_mode: state.store.is_demo(),
    }))
}

/// Player listing and search endpoint
pub async fn list_players(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = PlayerFilter::from_query(&query).map_err(ApiError::BadRequest)?;
    let players = state.store.load_all().await?;

    let matches: Vec<IndexedPlayer> = filter
        .apply(&players)
        .into_iter()
        .map(|(index, player)| IndexedPlayer {
            index,
            player: player.clone(),
        })
        .collect();

    Ok(Json(PlayerListResponse {
        total: matches.len(),
        players: matches,
        demo_mode: state.store.is_demo(),
        notice: demo_notice(&state),
    }))
}

/// Dashboard statistics endpoint
pub async fn player_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let players = state.store.load_all().await?;
    Ok(Json(DashboardStats::from_players(&players)))
}

/// Add player endpoint
pub async fn create_player(
    State(state): State<AppState>,
    Json(payload): Json<PlayerRecord>,
) -> ApiResult<impl IntoResponse> {
    validate_player(&payload).map_err(ApiError::BadRequest)?;

    let mut players = state.store.load_all().await?;
    let index = players.len();
    let name = payload.name.clone();
    players.push(payload);

    let outcome = state.store.save_all(&players).await?;
    info!("Added player {} at index {}", name, index);

    Ok((
        StatusCode::CREATED,
        Json(write_response(&state, outcome, "Player added", Some(index))),
    ))
}

/// Edit player endpoint
pub async fn update_player(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(payload): Json<PlayerUpdate>,
) -> ApiResult<impl IntoResponse> {
    let mut players = state.store.load_all().await?;
    let player = players
        .get_mut(index)
        .ok_or_else(|| ApiError::NotFound(format!("No player at index {}", index)))?;

    apply_update(player, payload);
    validate_player(player).map_err(ApiError::BadRequest)?;

    let outcome = state.store.save_all(&players).await?;
    info!("Updated player at index {}", index);

    Ok(Json(write_response(
        &state,
        outcome,
        "Player updated",
        Some(index),
    )))
}

/// Delete player endpoint
pub async fn delete_player(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(index): Path<usize>,
) -> ApiResult<impl IntoResponse> {
    let mut players = state.store.load_all().await?;
    if index >= players.len() {
        return Err(ApiError::NotFound(format!("No player at index {}", index)));
    }

    let removed = players.remove(index);
    let outcome = state.store.save_all(&players).await?;
    info!("Deleted player {} at index {}", removed.name, index);

    if outcome == SaveOutcome::Persisted {
        let remaining = players.len();
        state
            .sessions
            .update(&session, |live| {
                if live
                    .selected_record_index()
                    .is_some_and(|selected| selected >= remaining)
                {
                    live.select_record(0);
                }
            })
            .await;
    }

    Ok(Json(write_response(&state, outcome, "Player deleted", None)))
}

fn demo_notice(state: &AppState) -> Option<&'static str> {
    state.store.is_demo().then_some(DEMO_NOTICE)
}

fn write_response(
    state: &AppState,
    outcome: SaveOutcome,
    message: &str,
    index: Option<usize>,
) -> WriteResponse {
    WriteResponse {
        message: match outcome {
            SaveOutcome::Persisted => message.to_string(),
            SaveOutcome::Discarded => format!("{} (not persisted)", message),
        },
        index,
        demo_mode: state.store.is_demo(),
        notice: demo_notice(state),
    }
}
