use crate::api::error::ApiError;
use crate::api::AppState;
use crate::auth;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Duration as ChronoDuration;
use cosmogenesis_core::anomaly::{self, ResolutionOutcome};
use cosmogenesis_core::end_conditions::{self, EndCheckOptions};
use cosmogenesis_core::orchestrator::{self, DifficultyOptions};
use cosmogenesis_core::physics;
use cosmogenesis_core::predictor::{self, PredictorOptions};
use cosmogenesis_data::{Difficulty, InitialConditions, PhysicalConstants, Universe};
use cosmogenesis_io::StoreError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

type ApiResult = Result<Response, ApiError>;

/// Liveness probe; the only unauthenticated route.
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "status": "healthy" }))
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .ok_or_else(ApiError::unauthorized)?;
    auth::verify(&state.auth_secret, token).ok_or_else(ApiError::unauthorized)
}

fn parse_universe_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation(format!("invalid universe id {raw:?}")))
}

/// 500-class store failures log the cause and expose detail only in
/// development mode.
fn store_err(state: &AppState, context: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(_) | StoreError::Conflict(_) => err.into(),
        other => {
            tracing::error!(error = %other, "{context}");
            if state.verbose_errors {
                ApiError::internal(format!("{context}: {other}"))
            } else {
                ApiError::internal("internal storage error")
            }
        }
    }
}

/// Loads a universe and enforces ownership. Foreign universes are
/// indistinguishable from absent ones.
fn load_owned(state: &AppState, raw_id: &str, user: &str) -> Result<(Universe, i64), ApiError> {
    let id = parse_universe_id(raw_id)?;
    let (universe, version) = state
        .store
        .load(id)
        .map_err(|err| store_err(state, "loading universe", err))?;
    if universe.owner_id != user {
        return Err(ApiError::not_found(format!("universe {id}")));
    }
    Ok((universe, version))
}

/// Runs `op` against a freshly loaded universe and persists the result
/// under its version stamp; a lost write race is retried exactly once.
fn mutate_and_persist<T>(
    state: &AppState,
    raw_id: &str,
    user: &str,
    mut op: impl FnMut(&mut Universe) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    for attempt in 0..2 {
        let (mut universe, version) = load_owned(state, raw_id, user)?;
        let outcome = op(&mut universe)?;
        match state.store.update(&universe, version) {
            Ok(_) => return Ok(outcome),
            Err(StoreError::Conflict(_)) if attempt == 0 => {
                tracing::warn!(universe = %raw_id, "write conflict, reloading and retrying once");
            }
            Err(err) => return Err(store_err(state, "persisting universe", err)),
        }
    }
    Err(ApiError::internal("storage conflict, please retry"))
}

/// Wraps a serializable payload as `{"ok": true, ...payload}`.
fn ok_json<T: serde::Serialize>(payload: &T) -> Result<Json<Value>, ApiError> {
    let mut value = serde_json::to_value(payload)
        .map_err(|_| ApiError::internal("response serialization failure"))?;
    match value.as_object_mut() {
        Some(map) => {
            map.insert("ok".into(), json!(true));
        }
        None => return Err(ApiError::internal("response payload must be an object")),
    }
    Ok(Json(value))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CreateUniverseRequest {
    name: Option<String>,
    seed: Option<String>,
    difficulty: Option<String>,
    constants: Option<PhysicalConstants>,
    initial_conditions: Option<InitialConditions>,
}

pub async fn create_universe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let body = body.map(|Json(value)| value).unwrap_or_else(|| json!({}));
    let request: CreateUniverseRequest = serde_json::from_value(body)
        .map_err(|err| ApiError::validation(format!("invalid request body: {err}")))?;

    let name = request.name.unwrap_or_else(|| "New Universe".to_string());
    if name.is_empty() || name.len() > 100 {
        return Err(ApiError::validation(
            "name must be between 1 and 100 characters",
        ));
    }
    let difficulty = match request.difficulty {
        Some(label) => Difficulty::parse(&label).ok_or_else(|| {
            ApiError::validation(format!(
                "difficulty must be one of beginner, intermediate, advanced; got {label:?}"
            ))
        })?,
        None => Difficulty::default(),
    };
    let seed = request.seed.unwrap_or_else(|| Uuid::new_v4().to_string());

    let universe = Universe::new(
        user,
        name,
        seed,
        difficulty,
        request.constants.unwrap_or_default(),
        request.initial_conditions.unwrap_or_default(),
    );
    state
        .store
        .insert(&universe)
        .map_err(|err| store_err(&state, "creating universe", err))?;

    tracing::info!(universe = %universe.id, owner = %universe.owner_id, "universe created");
    let body = ok_json(&json!({ "universe": universe }))?;
    Ok((StatusCode::CREATED, body).into_response())
}

pub async fn list_universes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let universes = state
        .store
        .list_by_owner(&user)
        .map_err(|err| store_err(&state, "listing universes", err))?;
    Ok(ok_json(&json!({ "universes": universes }))?.into_response())
}

pub async fn get_universe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let (universe, _) = load_owned(&state, &raw_id, &user)?;
    Ok(ok_json(&json!({ "universe": universe }))?.into_response())
}

pub async fn delete_universe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let (universe, _) = load_owned(&state, &raw_id, &user)?;
    state
        .store
        .delete(universe.id)
        .map_err(|err| store_err(&state, "deleting universe", err))?;
    tracing::info!(universe = %universe.id, owner = %user, "universe deleted");
    Ok(ok_json(&json!({ "deleted": universe.id }))?.into_response())
}

fn parse_steps(body: &Option<Json<Value>>) -> Result<u64, ApiError> {
    let Some(Json(value)) = body else {
        return Ok(1);
    };
    match value.get("steps") {
        None | Some(Value::Null) => Ok(1),
        Some(Value::Number(n)) => {
            if let Some(steps) = n.as_u64() {
                Ok(steps)
            } else {
                Err(ApiError::validation(
                    "steps must be a non-negative whole number",
                ))
            }
        }
        Some(other) => Err(ApiError::validation(format!(
            "steps must be a number, got {other}"
        ))),
    }
}

pub async fn simulate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let steps = parse_steps(&body)?;
    let deadline = Instant::now() + state.simulate_timeout;

    let report = mutate_and_persist(&state, &raw_id, &user, |universe| {
        orchestrator::run(universe, steps, Some(deadline)).map_err(ApiError::from)
    })?;
    Ok(ok_json(&report)?.into_response())
}

pub async fn resolve_anomaly(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let anomaly_id = body
        .as_ref()
        .and_then(|Json(value)| value.get("anomalyId"))
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::validation("anomalyId is required"))?;
    let anomaly_id = Uuid::parse_str(anomaly_id)
        .map_err(|_| ApiError::validation(format!("invalid anomalyId {anomaly_id:?}")))?;

    let outcome: ResolutionOutcome = mutate_and_persist(&state, &raw_id, &user, |universe| {
        if universe.is_ended() {
            return Err(ApiError::validation(
                "cannot resolve anomalies in an ended universe",
            ));
        }
        anomaly::resolve(universe, anomaly_id).map_err(ApiError::from)
    })?;

    tracing::info!(universe = %raw_id, anomaly = %anomaly_id, "anomaly resolved");
    Ok(ok_json(&json!({ "resolution": outcome }))?.into_response())
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let (universe, _) = load_owned(&state, &raw_id, &user)?;
    Ok(ok_json(&json!({ "stats": physics::statistics(&universe) }))?.into_response())
}

pub async fn anomalies(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let (universe, _) = load_owned(&state, &raw_id, &user)?;
    let (resolved, active): (Vec<_>, Vec<_>) =
        universe.anomalies.iter().partition(|a| a.resolved);
    Ok(ok_json(&json!({ "active": active, "resolved": resolved }))?.into_response())
}

pub async fn predictions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let (universe, _) = load_owned(&state, &raw_id, &user)?;
    let options = DifficultyOptions::for_difficulty(universe.difficulty);
    let report = predictor::predict(
        &universe,
        &PredictorOptions {
            difficulty_modifier: options.difficulty_modifier,
            time_step_years: options.time_step_years,
        },
    );
    Ok(ok_json(&json!({ "predictions": report }))?.into_response())
}

pub async fn end_conditions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let (universe, _) = load_owned(&state, &raw_id, &user)?;
    let options = EndCheckOptions {
        difficulty_modifier: DifficultyOptions::for_difficulty(universe.difficulty)
            .difficulty_modifier,
    };
    let warnings = end_conditions::warnings(&universe.current_state, &options);
    Ok(ok_json(&json!({
        "status": {
            "ended": universe.is_ended(),
            "condition": universe.end_condition,
            "reason": universe.end_reason,
            "finalAge": universe.final_age,
        },
        "warnings": warnings,
    }))?
    .into_response())
}

pub async fn cleanup_anomalies(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult {
    let user = authenticate(&state, &headers)?;
    let keep_minutes = match body.as_ref().and_then(|Json(value)| value.get("keepRecentMinutes")) {
        None | Some(Value::Null) => 5,
        Some(Value::Number(n)) => n.as_i64().filter(|m| *m >= 0).ok_or_else(|| {
            ApiError::validation("keepRecentMinutes must be a non-negative whole number")
        })?,
        Some(other) => {
            return Err(ApiError::validation(format!(
                "keepRecentMinutes must be a number, got {other}"
            )))
        }
    };

    let (removed, remaining) = mutate_and_persist(&state, &raw_id, &user, |universe| {
        let removed = anomaly::cleanup_resolved(universe, ChronoDuration::minutes(keep_minutes));
        Ok((removed, universe.anomalies.len()))
    })?;
    Ok(ok_json(&json!({ "removed": removed, "remaining": remaining }))?.into_response())
}
