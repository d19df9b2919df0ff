//! HTTP request handlers for the shift engine API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler tags its log lines with a fresh correlation id and maps engine
//! errors onto [`ApiError`] bodies.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::LeaveStatus;
use crate::rates::RateSession;
use crate::roster::{NewLeave, NewShift, NewSwap, ShiftPatch, SwapOutcome};
use crate::scheduling::expand_all;

use super::request::{
    ClaimRequest, EscalateRequest, EscalationRunRequest, EscalationRunResponse,
    LeaveDecisionRequest, RateResolveRequest, RateResolveResponse, SwapAction, SwapUpdateRequest,
    UserQuery,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

type HandlerResult = Result<Response, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/shifts", post(create_shift_handler))
        .route(
            "/shifts/:id",
            get(get_shift_handler)
                .patch(edit_shift_handler)
                .delete(delete_shift_handler),
        )
        .route("/shifts/:id/escalate", post(escalate_shift_handler))
        .route("/open-shifts", get(list_open_shifts_handler))
        .route("/open-shifts/claim", post(claim_handler))
        .route("/assignments", get(list_assignments_handler))
        .route("/leave-requests", post(create_leave_handler))
        .route(
            "/leave-requests/:id",
            patch(decide_leave_handler).delete(cancel_leave_handler),
        )
        .route("/swap-requests", post(create_swap_handler))
        .route(
            "/swap-requests/:id",
            patch(update_swap_handler).delete(cancel_swap_handler),
        )
        .route("/rates/resolve", post(resolve_rates_handler))
        .route("/escalations/run", post(run_escalations_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Logs a failed operation and converts the error into a response.
fn reject(correlation_id: Uuid, operation: &'static str, err: EngineError) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        operation,
        retryable = err.is_retryable(),
        error = %err,
        "Operation rejected"
    );
    err.into()
}

/// Unwraps a JSON body, turning serde failures into API errors.
fn json_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            // Missing fields and bad enum values are validation failures
            if body_text.contains("missing field") || body_text.contains("unknown variant") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

fn path_id(
    correlation_id: Uuid,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Uuid, ApiErrorResponse> {
    path.map(|Path(id)| id).map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid path id");
        ApiErrorResponse::bad_request(ApiError::validation_error(format!(
            "invalid id: {}",
            rejection.body_text()
        )))
    })
}

fn user_query(
    correlation_id: Uuid,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<String, ApiErrorResponse> {
    query.map(|Query(q)| q.user_id).map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    })
}

// Shifts

/// Handler for POST /shifts.
async fn create_shift_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewShift>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing create shift request");

    let input = json_body(correlation_id, payload)?;
    let start_time = Instant::now();
    let view = state
        .service()
        .create_shift(input)
        .map_err(|e| reject(correlation_id, "create_shift", e))?;

    info!(
        correlation_id = %correlation_id,
        shift_id = %view.shift.id,
        occurrences = view.occurrences.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Shift created"
    );
    Ok(json_response(StatusCode::CREATED, view))
}

/// Handler for GET /shifts/:id.
async fn get_shift_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = path_id(correlation_id, path)?;
    let view = state
        .service()
        .get_shift(id)
        .map_err(|e| reject(correlation_id, "get_shift", e))?;
    Ok(json_response(StatusCode::OK, view))
}

/// Handler for PATCH /shifts/:id.
async fn edit_shift_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ShiftPatch>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = path_id(correlation_id, path)?;
    info!(correlation_id = %correlation_id, shift_id = %id, "Processing edit shift request");

    let patch = json_body(correlation_id, payload)?;
    let view = state
        .service()
        .edit_shift(id, patch)
        .map_err(|e| reject(correlation_id, "edit_shift", e))?;
    Ok(json_response(StatusCode::OK, view))
}

/// Handler for DELETE /shifts/:id.
async fn delete_shift_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = path_id(correlation_id, path)?;
    state
        .service()
        .delete_shift(id)
        .map_err(|e| reject(correlation_id, "delete_shift", e))?;
    info!(correlation_id = %correlation_id, shift_id = %id, "Shift deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Handler for POST /shifts/:id/escalate.
///
/// With `unassign_assignment_id` the named assignment is released as an open
/// shift at the new tier in the same step.
async fn escalate_shift_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<EscalateRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = path_id(correlation_id, path)?;
    let request = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        shift_id = %id,
        target = %request.target_visibility,
        "Processing escalation request"
    );

    let applied = state
        .service()
        .escalate_shift(id, request.target_visibility, request.unassign_assignment_id)
        .map_err(|e| reject(correlation_id, "escalate_shift", e))?;
    Ok(json_response(StatusCode::OK, applied))
}

// Open shifts and assignments

/// Handler for GET /open-shifts?user_id=.
async fn list_open_shifts_handler(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let user_id = user_query(correlation_id, query)?;
    let open = state.service().list_open_shifts(&user_id);
    info!(
        correlation_id = %correlation_id,
        user_id = %user_id,
        visible = open.len(),
        "Listed open shifts"
    );
    Ok(json_response(StatusCode::OK, open))
}

/// Handler for POST /open-shifts/claim.
///
/// Exactly one of any number of concurrent claims for the same open shift
/// succeeds; the others receive 409.
async fn claim_handler(
    State(state): State<AppState>,
    payload: Result<Json<ClaimRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        open_shift_id = %request.occurrence_id,
        user_id = %request.user_id,
        "Processing claim request"
    );

    let service = state.service();
    let open = service
        .open_shift(request.occurrence_id)
        .map_err(|e| reject(correlation_id, "claim_open_shift", e))?;
    if open.shift_id != request.shift_id {
        return Err(reject(
            correlation_id,
            "claim_open_shift",
            EngineError::not_found("OpenShift", request.occurrence_id),
        ));
    }

    let assignment = service
        .claim_open_shift(request.occurrence_id, &request.user_id)
        .map_err(|e| reject(correlation_id, "claim_open_shift", e))?;
    Ok(json_response(StatusCode::CREATED, assignment))
}

/// Handler for GET /assignments?user_id=.
async fn list_assignments_handler(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let user_id = user_query(correlation_id, query)?;
    Ok(json_response(
        StatusCode::OK,
        state.service().user_assignments(&user_id),
    ))
}

// Leave

/// Handler for POST /leave-requests.
async fn create_leave_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewLeave>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let input = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        assignment_id = %input.assignment_id,
        user_id = %input.user_id,
        "Processing leave request"
    );
    let leave = state
        .service()
        .request_leave(input)
        .map_err(|e| reject(correlation_id, "request_leave", e))?;
    Ok(json_response(StatusCode::CREATED, leave))
}

/// Handler for PATCH /leave-requests/:id.
async fn decide_leave_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LeaveDecisionRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = path_id(correlation_id, path)?;
    let decision = json_body(correlation_id, payload)?;

    let service = state.service();
    let result = match decision.status {
        LeaveStatus::Approved => service.approve_leave(id, &decision.operator_id),
        LeaveStatus::Rejected => service.reject_leave(id, &decision.operator_id),
        LeaveStatus::Pending => {
            return Err(ApiErrorResponse::bad_request(ApiError::validation_error(
                "status must be APPROVED or REJECTED",
            )));
        }
    };
    let leave = result.map_err(|e| reject(correlation_id, "decide_leave", e))?;
    Ok(json_response(StatusCode::OK, leave))
}

/// Handler for DELETE /leave-requests/:id?user_id=.
async fn cancel_leave_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = path_id(correlation_id, path)?;
    let user_id = user_query(correlation_id, query)?;
    state
        .service()
        .cancel_leave(id, &user_id)
        .map_err(|e| reject(correlation_id, "cancel_leave", e))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// Swaps

/// Handler for POST /swap-requests.
async fn create_swap_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewSwap>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let input = json_body(correlation_id, payload)?;
    info!(
        correlation_id = %correlation_id,
        pharmacy_id = %input.pharmacy_id,
        occurrence = %input.occurrence,
        "Processing swap request"
    );
    let swap = state
        .service()
        .request_swap(input)
        .map_err(|e| reject(correlation_id, "request_swap", e))?;
    Ok(json_response(StatusCode::CREATED, swap))
}

/// Handler for PATCH /swap-requests/:id.
///
/// Edits the request or records a decision, depending on whether the body
/// carries a `status`.
async fn update_swap_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SwapUpdateRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = path_id(correlation_id, path)?;
    let action = json_body(correlation_id, payload)?
        .into_action()
        .map_err(ApiErrorResponse::bad_request)?;

    let service = state.service();
    let outcome = match action {
        SwapAction::Edit { user_id, patch } => {
            let swap = service
                .update_swap(id, &user_id, patch)
                .map_err(|e| reject(correlation_id, "update_swap", e))?;
            return Ok(json_response(StatusCode::OK, swap));
        }
        SwapAction::Approve {
            operator_id,
            replacement,
        } => service.approve_swap(id, &operator_id, replacement),
        SwapAction::Reject { operator_id } => {
            service.reject_swap(id, &operator_id).map(|swap| SwapOutcome {
                swap,
                assignment: None,
                released: None,
            })
        }
        SwapAction::AutoPublish => service.auto_publish_swap(id),
    }
    .map_err(|e| reject(correlation_id, "decide_swap", e))?;

    info!(
        correlation_id = %correlation_id,
        swap_id = %id,
        status = ?outcome.swap.status,
        "Swap decision recorded"
    );
    Ok(json_response(StatusCode::OK, outcome))
}

/// Handler for DELETE /swap-requests/:id?user_id=.
async fn cancel_swap_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let id = path_id(correlation_id, path)?;
    let user_id = user_query(correlation_id, query)?;
    state
        .service()
        .cancel_swap(id, &user_id)
        .map_err(|e| reject(correlation_id, "cancel_swap", e))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

// Rates and escalation sweeps

/// Handler for POST /rates/resolve.
///
/// Runs one lookup through a [`RateSession`], so a slow or failing resolver
/// yields per-row errors instead of failing the request.
async fn resolve_rates_handler(
    State(state): State<AppState>,
    payload: Result<Json<RateResolveRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = json_body(correlation_id, payload)?;

    let max_days = state.settings().max_recurrence_days;
    for (i, slot) in request.slots.iter().enumerate() {
        slot.validate(i, max_days)
            .map_err(|e| reject(correlation_id, "resolve_rates", e))?;
    }
    let occurrences = expand_all(&request.slots);
    if occurrences.is_empty() {
        return Err(reject(
            correlation_id,
            "resolve_rates",
            EngineError::validation("slots", "slots produce no occurrences"),
        ));
    }

    let session = RateSession::new(request.pharmacy_id, request.role, request.employment_type);
    session.set_inputs(
        occurrences,
        request.role,
        request.employment_type,
        request.rate_config,
    );

    let start_time = Instant::now();
    session
        .resolve(state.rates(), state.settings().rate_timeout())
        .await;
    let response = RateResolveResponse {
        rows: session.rows(),
        rates: session.submission_rates(),
    };

    info!(
        correlation_id = %correlation_id,
        rows = response.rows.len(),
        unresolved = response.rates.iter().filter(|r| r.is_none()).count(),
        duration_us = start_time.elapsed().as_micros(),
        "Rates resolved"
    );
    Ok(json_response(StatusCode::OK, response))
}

/// Handler for POST /escalations/run.
///
/// The body is optional; without one the sweep runs as of now.
async fn run_escalations_handler(
    State(state): State<AppState>,
    payload: Result<Json<EscalationRunRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Err(JsonRejection::MissingJsonContentType(_)) => EscalationRunRequest::default(),
        other => json_body(correlation_id, other)?,
    };

    let now = request.now.unwrap_or_else(Utc::now);
    let applied = state.service().run_due_escalations(now);
    info!(
        correlation_id = %correlation_id,
        applied = applied.len(),
        "Escalation sweep triggered"
    );
    Ok(json_response(StatusCode::OK, EscalationRunResponse { applied }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLoader, EngineSettings, PharmacyEntry, RatesConfig};
    use crate::models::{Pharmacy, Role, RosterMember, VisibilityTier};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let entry = PharmacyEntry {
            pharmacy: Pharmacy {
                id: "ph-1".to_string(),
                name: "Test Pharmacy".to_string(),
                has_chain: false,
                claimed: false,
                allowed_escalation_levels: None,
                default_rate_config: None,
            },
            members: vec![RosterMember {
                user_id: "u-staff".to_string(),
                roles: vec![Role::Pharmacist],
                audience_tier: VisibilityTier::FullPartTime,
            }],
            operators: vec!["op-1".to_string()],
        };
        let loader =
            ConfigLoader::from_parts(EngineSettings::default(), vec![entry], RatesConfig::default())
                .unwrap();
        AppState::from_config(&loader)
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    const SHIFT_BODY: &str = r#"{
        "pharmacy_id": "ph-1",
        "role_needed": "PHARMACIST",
        "employment_type": "LOCUM",
        "slots": [{"date": "2024-06-04", "start_time": "09:00:00", "end_time": "17:00:00"}]
    }"#;

    #[tokio::test]
    async fn test_create_shift_returns_created() {
        let app = create_router(create_test_state());
        let response = app
            .oneshot(json_request("POST", "/shifts", SHIFT_BODY))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["occurrences"].as_array().unwrap().len(), 1);
        assert_eq!(json["open_shifts"].as_array().unwrap().len(), 1);
        assert_eq!(json["shift"]["current_visibility"], "FULL_PART_TIME");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let app = create_router(create_test_state());
        let response = app
            .oneshot(json_request("POST", "/shifts", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let app = create_router(create_test_state());
        let response = app
            .oneshot(json_request("POST", "/shifts", r#"{"pharmacy_id": "ph-1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_shift_returns_404() {
        let app = create_router(create_test_state());
        let uri = format!("/shifts/{}", Uuid::new_v4());
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_path_id_returns_400() {
        let app = create_router(create_test_state());
        let response = app
            .oneshot(Request::builder().uri("/shifts/not-a-uuid").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_claim_then_second_claim_conflicts() {
        let state = create_test_state();
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(json_request("POST", "/shifts", SHIFT_BODY))
            .await
            .unwrap();
        let json = body_json(response).await;
        let shift_id = json["shift"]["id"].as_str().unwrap().to_string();
        let open_id = json["open_shifts"][0]["id"].as_str().unwrap().to_string();

        let claim = format!(
            r#"{{"shift_id": "{}", "occurrence_id": "{}", "user_id": "u-staff"}}"#,
            shift_id, open_id
        );
        let first = app
            .clone()
            .oneshot(json_request("POST", "/open-shifts/claim", &claim))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .oneshot(json_request("POST", "/open-shifts/claim", &claim))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let json = body_json(second).await;
        assert_eq!(json["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_claim_with_wrong_shift_id_returns_404() {
        let app = create_router(create_test_state());
        let response = app
            .clone()
            .oneshot(json_request("POST", "/shifts", SHIFT_BODY))
            .await
            .unwrap();
        let json = body_json(response).await;
        let open_id = json["open_shifts"][0]["id"].as_str().unwrap().to_string();

        let claim = format!(
            r#"{{"shift_id": "{}", "occurrence_id": "{}", "user_id": "u-staff"}}"#,
            Uuid::new_v4(),
            open_id
        );
        let response = app
            .oneshot(json_request("POST", "/open-shifts/claim", &claim))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_escalations_run_without_body() {
        let app = create_router(create_test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/escalations/run")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["applied"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_leave_decision_pending_is_rejected() {
        let app = create_router(create_test_state());
        let uri = format!("/leave-requests/{}", Uuid::new_v4());
        let response = app
            .oneshot(json_request(
                "PATCH",
                &uri,
                r#"{"status": "PENDING", "operator_id": "op-1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cancel_leave_requires_user_id() {
        let app = create_router(create_test_state());
        let uri = format!("/leave-requests/{}", Uuid::new_v4());
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
