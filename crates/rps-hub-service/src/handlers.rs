//! HTTP API handlers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use rps_engine::{
    AccountId, Commitment, EngineId, EventRecord, GameResult, GameSession, Hub, HubError, Move,
    Player, RevealOutcome, Salt, Secret, SessionId, SessionPhase,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Header carrying the caller's account id
pub const ACCOUNT_HEADER: &str = "X-Account-Id";

// ============ Errors ============

/// Error returned by every handler
#[derive(Debug)]
pub enum AppError {
    /// No usable `X-Account-Id` header
    MissingCaller,
    Hub(HubError),
}

impl From<HubError> for AppError {
    fn from(err: HubError) -> Self {
        AppError::Hub(err)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCaller => StatusCode::UNAUTHORIZED,
            AppError::Hub(err) => match err {
                HubError::Unauthorized(_) => StatusCode::FORBIDDEN,
                HubError::NoSuchSession(_) | HubError::NoSuchEngine(_) => StatusCode::NOT_FOUND,
                HubError::SessionAlreadyExists(_)
                | HubError::NotInitiated(_)
                | HubError::SessionExpired(_)
                | HubError::NotExpired(_)
                | HubError::AlreadyRevealed(_) => StatusCode::CONFLICT,
                HubError::TransferFailed(_) => StatusCode::BAD_GATEWAY,
                HubError::InsufficientFunds { .. }
                | HubError::CommitmentMismatch
                | HubError::Overflow
                | HubError::InvalidParticipants
                | HubError::InvalidExpirationPeriod
                | HubError::InvalidTimeStep => StatusCode::BAD_REQUEST,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::MissingCaller => "missing_caller",
            AppError::Hub(err) => err.code(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::MissingCaller => format!("Missing or invalid {} header", ACCOUNT_HEADER),
            AppError::Hub(err) => err.to_string(),
        };
        if let AppError::Hub(HubError::TransferFailed(_)) = &self {
            tracing::warn!("Request failed: {}", message);
        }
        (
            self.status(),
            Json(serde_json::json!({"error": message, "code": self.code()})),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, AppError>;

// ============ Request/Response types ============

#[derive(Serialize)]
pub struct ConfigResponse {
    pub owner: AccountId,
    pub session_expiration_secs: i64,
    pub engines: Vec<EngineId>,
    pub now: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ChangeExpirationRequest {
    pub seconds: u64,
}

#[derive(Serialize)]
pub struct EngineResponse {
    pub engine: EngineId,
}

#[derive(Deserialize)]
pub struct AmountRequest {
    pub amount: u64,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub account: AccountId,
    pub balance: u64,
    /// Funds already withdrawn to the account's external wallet
    pub wallet_balance: u64,
}

#[derive(Deserialize)]
pub struct SessionIdRequest {
    pub initiator: AccountId,
    pub challenged: AccountId,
    pub salt: Salt,
}

#[derive(Serialize)]
pub struct SessionIdResponse {
    pub session_id: SessionId,
}

#[derive(Deserialize)]
pub struct MoveHashRequest {
    pub session_id: SessionId,
    pub secret: Secret,
    #[serde(rename = "move")]
    pub mv: Move,
}

#[derive(Serialize)]
pub struct MoveHashResponse {
    pub commitment: Commitment,
}

#[derive(Deserialize)]
pub struct InitSessionRequest {
    pub challenged: AccountId,
    pub stake: u64,
    pub salt: Salt,
    pub commitment: Commitment,
}

#[derive(Deserialize)]
pub struct AcceptSessionRequest {
    pub commitment: Commitment,
}

#[derive(Deserialize)]
pub struct RevealRequest {
    pub secret: Secret,
    #[serde(rename = "move")]
    pub mv: Move,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub engine: EngineId,
    pub session_id: SessionId,
    pub phase: SessionPhase,
    pub expired: bool,
    #[serde(flatten)]
    pub session: GameSession,
}

impl SessionResponse {
    fn new(
        engine: EngineId,
        session_id: SessionId,
        session: GameSession,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            engine,
            session_id,
            phase: session.phase(),
            expired: session.is_expired(now),
            session,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RevealResponse {
    WaitingForOpponent {
        player: Player,
    },
    Settled {
        player: Player,
        result: GameResult,
        initiator_balance: u64,
        challenged_balance: u64,
    },
}

#[derive(Serialize)]
pub struct PayoutResponse {
    pub account: AccountId,
    pub amount: u64,
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub session_id: SessionId,
    pub payouts: Vec<PayoutResponse>,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<EventRecord>,
}

#[derive(Deserialize)]
pub struct TickRequest {
    pub seconds: i64,
}

#[derive(Serialize)]
pub struct TickResponse {
    pub now: DateTime<Utc>,
}

// ============ Helper to get caller from header ============

fn caller_from_header(headers: &HeaderMap) -> Result<AccountId, AppError> {
    headers
        .get(ACCOUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .ok_or(AppError::MissingCaller)
}

// ============ Admin handlers ============

pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let hub = state.hub();
    Json(ConfigResponse {
        owner: hub.owner(),
        session_expiration_secs: hub.session_expiration_period().num_seconds(),
        engines: hub.engine_ids().to_vec(),
        now: hub.now(),
    })
}

pub async fn change_expiration_period(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChangeExpirationRequest>,
) -> ApiResult<ConfigResponse> {
    let caller = caller_from_header(&headers)?;
    let mut hub = state.hub();
    hub.change_session_expiration_period(caller, req.seconds)?;

    Ok(Json(ConfigResponse {
        owner: hub.owner(),
        session_expiration_secs: hub.session_expiration_period().num_seconds(),
        engines: hub.engine_ids().to_vec(),
        now: hub.now(),
    }))
}

pub async fn create_engine(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<EngineResponse>), AppError> {
    let caller = caller_from_header(&headers)?;
    let engine = state.hub().create_rock_paper_scissors(caller)?;
    Ok((StatusCode::CREATED, Json(EngineResponse { engine })))
}

// ============ Ledger handlers ============

pub async fn deposit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AmountRequest>,
) -> ApiResult<BalanceResponse> {
    let caller = caller_from_header(&headers)?;
    let balance = state.hub().deposit(caller, req.amount)?;

    Ok(Json(BalanceResponse {
        account: caller,
        balance,
        wallet_balance: state.wallets().wallet_balance(&caller),
    }))
}

pub async fn withdraw(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AmountRequest>,
) -> ApiResult<BalanceResponse> {
    let caller = caller_from_header(&headers)?;
    let balance = state.hub().withdraw(caller, req.amount)?;

    Ok(Json(BalanceResponse {
        account: caller,
        balance,
        wallet_balance: state.wallets().wallet_balance(&caller),
    }))
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(account): Path<AccountId>,
) -> Json<BalanceResponse> {
    let balance = state.hub().balance_of(&account);
    Json(BalanceResponse {
        account,
        balance,
        wallet_balance: state.wallets().wallet_balance(&account),
    })
}

// ============ Commitment helpers ============

pub async fn compute_session_id(Json(req): Json<SessionIdRequest>) -> Json<SessionIdResponse> {
    Json(SessionIdResponse {
        session_id: Hub::session_id(&req.initiator, &req.challenged, &req.salt),
    })
}

pub async fn compute_move_hash(Json(req): Json<MoveHashRequest>) -> Json<MoveHashResponse> {
    Json(MoveHashResponse {
        commitment: Hub::move_hash(&req.session_id, &req.secret, req.mv),
    })
}

// ============ Session handlers ============

pub async fn init_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(engine): Path<EngineId>,
    Json(req): Json<InitSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let caller = caller_from_header(&headers)?;
    let mut hub = state.hub();
    let session_id = hub.init_session(
        &engine,
        caller,
        req.challenged,
        req.stake,
        &req.salt,
        req.commitment,
    )?;

    let response = session_response(&hub, engine, session_id)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path((engine, session_id)): Path<(EngineId, SessionId)>,
) -> ApiResult<SessionResponse> {
    let hub = state.hub();
    Ok(Json(session_response(&hub, engine, session_id)?))
}

pub async fn accept_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((engine, session_id)): Path<(EngineId, SessionId)>,
    Json(req): Json<AcceptSessionRequest>,
) -> ApiResult<SessionResponse> {
    let caller = caller_from_header(&headers)?;
    let mut hub = state.hub();
    hub.accept_session(&engine, caller, &session_id, req.commitment)?;
    Ok(Json(session_response(&hub, engine, session_id)?))
}

pub async fn reveal_session_move(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((engine, session_id)): Path<(EngineId, SessionId)>,
    Json(req): Json<RevealRequest>,
) -> ApiResult<RevealResponse> {
    let caller = caller_from_header(&headers)?;
    let mut hub = state.hub();
    let outcome = hub.reveal_session_move(&engine, caller, &session_id, &req.secret, req.mv)?;

    let response = match outcome {
        RevealOutcome::Pending { player } => RevealResponse::WaitingForOpponent { player },
        RevealOutcome::Settled {
            player,
            session,
            result,
        } => RevealResponse::Settled {
            player,
            result,
            initiator_balance: hub.balance_of(&session.initiator),
            challenged_balance: hub.balance_of(&session.challenged),
        },
    };
    Ok(Json(response))
}

pub async fn cancel_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((engine, session_id)): Path<(EngineId, SessionId)>,
) -> ApiResult<CancelResponse> {
    let caller = caller_from_header(&headers)?;
    let cancellation = state.hub().cancel_session(&engine, caller, &session_id)?;

    Ok(Json(CancelResponse {
        session_id,
        payouts: cancellation
            .payouts
            .into_iter()
            .map(|(account, amount)| PayoutResponse { account, amount })
            .collect(),
    }))
}

fn session_response(
    hub: &Hub,
    engine: EngineId,
    session_id: SessionId,
) -> Result<SessionResponse, AppError> {
    let session = hub
        .game_session(&engine, &session_id)?
        .cloned()
        .ok_or(HubError::NoSuchSession(session_id))?;
    Ok(SessionResponse::new(engine, session_id, session, hub.now()))
}

// ============ Audit handlers ============

pub async fn list_events(State(state): State<AppState>) -> Json<EventsResponse> {
    Json(EventsResponse {
        events: state.hub().events().to_vec(),
    })
}

// ============ System handlers ============

/// Advance simulated time (for testing expiry)
pub async fn tick(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TickRequest>,
) -> ApiResult<TickResponse> {
    let caller = caller_from_header(&headers)?;
    let now = state.hub().advance_time(caller, req.seconds)?;
    tracing::info!("Simulated time advanced by {}s to {}", req.seconds, now);
    Ok(Json(TickResponse { now }))
}

pub async fn health() -> &'static str {
    "ok"
}
