//! End-to-end tests for the shift engine HTTP API.
//!
//! These run against the sample configuration in `config/default` and cover:
//! - Recurring slot expansion through shift creation
//! - Tier-gated visibility of open shifts
//! - Escalation, both interactive and scheduled
//! - Concurrent claims of one open shift
//! - Leave and swap lifecycles
//! - Rate resolution
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use shift_engine::api::{AppState, create_router};
use shift_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    shift_engine::logging::init_test();
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    AppState::from_config(&config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

fn slot(date: &str, start: &str, end: &str) -> Value {
    json!({"date": date, "start_time": start, "end_time": end})
}

fn shift_body(pharmacy_id: &str, role: &str, slots: Vec<Value>) -> Value {
    json!({
        "pharmacy_id": pharmacy_id,
        "role_needed": role,
        "employment_type": "LOCUM",
        "slots": slots
    })
}

async fn create_shift(router: &Router, body: Value) -> Value {
    let (status, json) = send(router, "POST", "/shifts", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
    json
}

/// Creates a one-day harbour shift held by u-alice and returns its assignment.
async fn assigned_to_alice(router: &Router, date: &str) -> Value {
    let mut body = shift_body("ph-harbour", "PHARMACIST", vec![slot(date, "09:00:00", "17:00:00")]);
    body["assign_users"] = json!(["u-alice"]);
    let view = create_shift(router, body).await;
    assert!(view["open_shifts"].as_array().unwrap().is_empty());
    view["assignments"][0].clone()
}

fn claim_body(view: &Value, index: usize, user_id: &str) -> Value {
    json!({
        "shift_id": view["shift"]["id"],
        "occurrence_id": view["open_shifts"][index]["id"],
        "user_id": user_id
    })
}

// =============================================================================
// Shift creation and expansion
// =============================================================================

#[tokio::test]
async fn test_recurring_mon_wed_slot_expands_in_order() {
    let router = create_router_for_test();
    let view = create_shift(
        &router,
        shift_body(
            "ph-corner",
            "PHARMACIST",
            vec![json!({
                "date": "2024-06-03",
                "start_time": "09:00:00",
                "end_time": "17:00:00",
                "is_recurring": true,
                "recurring_days": ["Mon", "Wed"],
                "recurring_end_date": "2024-06-10"
            })],
        ),
    )
    .await;

    let dates: Vec<&str> = view["occurrences"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-06-03", "2024-06-05", "2024-06-10"]);
    assert_eq!(view["open_shifts"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_create_shift_unknown_pharmacy_returns_404() {
    let router = create_router_for_test();
    let (status, json) = send(
        &router,
        "POST",
        "/shifts",
        Some(shift_body("ph-nowhere", "PHARMACIST", vec![slot("2024-06-04", "09:00:00", "17:00:00")])),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_overnight_slot_rejected() {
    let router = create_router_for_test();
    let (status, json) = send(
        &router,
        "POST",
        "/shifts",
        Some(shift_body("ph-corner", "PHARMACIST", vec![slot("2024-06-04", "22:00:00", "06:00:00")])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_recurring_end_before_start_rejected() {
    let router = create_router_for_test();
    let (status, json) = send(
        &router,
        "POST",
        "/shifts",
        Some(shift_body(
            "ph-corner",
            "PHARMACIST",
            vec![json!({
                "date": "2024-06-10",
                "start_time": "09:00:00",
                "end_time": "17:00:00",
                "is_recurring": true,
                "recurring_days": ["Mon"],
                "recurring_end_date": "2024-06-03"
            })],
        )),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_tier_outside_pharmacy_sequence_rejected() {
    let router = create_router_for_test();
    let mut body = shift_body("ph-corner", "PHARMACIST", vec![slot("2024-06-04", "09:00:00", "17:00:00")]);
    // ph-corner has neither a chain nor an organization
    body["visibility"] = json!("OWNER_CHAIN");
    let (status, _) = send(&router, "POST", "/shifts", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_edit_and_delete_shift() {
    let router = create_router_for_test();
    let view = create_shift(
        &router,
        shift_body("ph-corner", "PHARMACIST", vec![slot("2024-06-04", "09:00:00", "17:00:00")]),
    )
    .await;
    let uri = format!("/shifts/{}", view["shift"]["id"].as_str().unwrap());

    let (status, fetched) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["shift"]["id"], view["shift"]["id"]);

    let (status, edited) = send(
        &router,
        "PATCH",
        &uri,
        Some(json!({"slots": [
            slot("2024-06-04", "09:00:00", "17:00:00"),
            slot("2024-06-05", "09:00:00", "17:00:00")
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["occurrences"].as_array().unwrap().len(), 2);
    // The retained occurrence keeps its open shift
    assert!(
        edited["open_shifts"]
            .as_array()
            .unwrap()
            .iter()
            .any(|o| o["id"] == view["open_shifts"][0]["id"])
    );

    let (status, _) = send(&router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Visibility and escalation
// =============================================================================

#[tokio::test]
async fn test_open_shift_visibility_follows_tier() {
    let router = create_router_for_test();
    let view = create_shift(
        &router,
        shift_body("ph-harbour", "PHARMACIST", vec![slot("2024-06-04", "09:00:00", "17:00:00")]),
    )
    .await;
    assert_eq!(view["shift"]["current_visibility"], "FULL_PART_TIME");

    let (_, alice) = send(&router, "GET", "/open-shifts?user_id=u-alice", None).await;
    assert_eq!(alice.as_array().unwrap().len(), 1);

    // u-bob is a favourite locum and cannot see staff-only shifts yet
    let (_, bob) = send(&router, "GET", "/open-shifts?user_id=u-bob", None).await;
    assert!(bob.as_array().unwrap().is_empty());

    let (status, json) = send(&router, "POST", "/open-shifts/claim", Some(claim_body(&view, 0, "u-bob"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");

    let uri = format!("/shifts/{}/escalate", view["shift"]["id"].as_str().unwrap());
    let (status, applied) = send(&router, "POST", &uri, Some(json!({"target_visibility": "LOCUM_CASUAL"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applied["from"], "FULL_PART_TIME");
    assert_eq!(applied["to"], "LOCUM_CASUAL");

    let (_, bob) = send(&router, "GET", "/open-shifts?user_id=u-bob", None).await;
    assert_eq!(bob.as_array().unwrap().len(), 1);
    assert_eq!(bob[0]["visibility"], "LOCUM_CASUAL");

    // Assistants never see pharmacist shifts
    let (_, carol) = send(&router, "GET", "/open-shifts?user_id=u-carol", None).await;
    assert!(carol.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_escalation_only_moves_forward() {
    let router = create_router_for_test();
    // ph-corner tiers: FULL_PART_TIME, LOCUM_CASUAL, PLATFORM
    let mut body = shift_body("ph-corner", "PHARMACIST", vec![slot("2024-06-04", "09:00:00", "17:00:00")]);
    body["visibility"] = json!("LOCUM_CASUAL");
    let view = create_shift(&router, body).await;
    let uri = format!("/shifts/{}/escalate", view["shift"]["id"].as_str().unwrap());

    let (status, json) = send(&router, "POST", &uri, Some(json!({"target_visibility": "FULL_PART_TIME"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, json) = send(&router, "POST", &uri, Some(json!({"target_visibility": "PLATFORM"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["to"], "PLATFORM");

    let (status, _) = send(&router, "POST", &uri, Some(json!({"target_visibility": "PLATFORM"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_escalate_and_unassign_releases_open_shift() {
    let router = create_router_for_test();
    let assignment = assigned_to_alice(&router, "2024-06-12").await;
    let shift_id = assignment["shift_id"].as_str().unwrap();

    let (status, json) = send(
        &router,
        "POST",
        &format!("/shifts/{}/escalate", shift_id),
        Some(json!({
            "target_visibility": "PLATFORM",
            "unassign_assignment_id": assignment["id"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["released"]["occurrence"], assignment["occurrence"]);

    let (_, view) = send(&router, "GET", &format!("/shifts/{}", shift_id), None).await;
    assert!(view["assignments"].as_array().unwrap().is_empty());
    assert_eq!(view["open_shifts"].as_array().unwrap().len(), 1);

    // Non-members see platform shifts
    let (_, visible) = send(&router, "GET", "/open-shifts?user_id=u-stranger", None).await;
    assert_eq!(visible.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_scheduled_escalation_runs_once() {
    let router = create_router_for_test();
    let mut body = shift_body("ph-corner", "PHARMACIST", vec![slot("2024-06-04", "09:00:00", "17:00:00")]);
    body["escalate_to"] = json!({
        "LOCUM_CASUAL": "2024-05-01T00:00:00Z",
        "PLATFORM": "2024-05-20T00:00:00Z"
    });
    let view = create_shift(&router, body).await;
    let uri = format!("/shifts/{}", view["shift"]["id"].as_str().unwrap());

    let (status, json) = send(
        &router,
        "POST",
        "/escalations/run",
        Some(json!({"now": "2024-05-02T00:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["applied"].as_array().unwrap().len(), 1);
    assert_eq!(json["applied"][0]["to"], "LOCUM_CASUAL");

    let (_, json) = send(
        &router,
        "POST",
        "/escalations/run",
        Some(json!({"now": "2024-05-02T00:00:00Z"})),
    )
    .await;
    assert!(json["applied"].as_array().unwrap().is_empty());

    let (_, json) = send(
        &router,
        "POST",
        "/escalations/run",
        Some(json!({"now": "2024-05-21T00:00:00Z"})),
    )
    .await;
    assert_eq!(json["applied"][0]["to"], "PLATFORM");

    let (_, fetched) = send(&router, "GET", &uri, None).await;
    assert_eq!(fetched["shift"]["current_visibility"], "PLATFORM");
}

// =============================================================================
// Claims
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_have_one_winner() {
    let router = create_router_for_test();
    let mut body = shift_body("ph-harbour", "PHARMACIST", vec![slot("2024-06-06", "09:00:00", "17:00:00")]);
    body["visibility"] = json!("PLATFORM");
    let view = create_shift(&router, body).await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let router = router.clone();
        let claim = claim_body(&view, 0, &format!("u-claimer-{}", i));
        handles.push(tokio::spawn(async move {
            send(&router, "POST", "/open-shifts/claim", Some(claim)).await
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        if status == StatusCode::CREATED {
            created += 1;
        } else if status == StatusCode::CONFLICT {
            conflicts += 1;
        } else {
            panic!("unexpected status {}", status);
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 15);

    let (_, fetched) = send(&router, "GET", &format!("/shifts/{}", view["shift"]["id"].as_str().unwrap()), None).await;
    assert_eq!(fetched["assignments"].as_array().unwrap().len(), 1);
    assert!(fetched["open_shifts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_claim_double_booking_conflicts() {
    let router = create_router_for_test();
    assigned_to_alice(&router, "2024-06-13").await;

    let view = create_shift(
        &router,
        shift_body("ph-harbour", "PHARMACIST", vec![slot("2024-06-13", "12:00:00", "20:00:00")]),
    )
    .await;

    let (status, json) = send(&router, "POST", "/open-shifts/claim", Some(claim_body(&view, 0, "u-alice"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["message"].as_str().unwrap().contains("already booked"));
}

// =============================================================================
// Leave
// =============================================================================

#[tokio::test]
async fn test_second_leave_request_conflicts() {
    let router = create_router_for_test();
    let assignment = assigned_to_alice(&router, "2024-06-14").await;

    let leave = json!({
        "assignment_id": assignment["id"],
        "user_id": "u-alice",
        "leave_type": "ANNUAL",
        "note": "family trip"
    });
    let (status, first) = send(&router, "POST", "/leave-requests", Some(leave.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "PENDING");

    let (status, json) = send(&router, "POST", "/leave-requests", Some(leave)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn test_leave_lifecycle() {
    let router = create_router_for_test();
    let assignment = assigned_to_alice(&router, "2024-06-17").await;

    // Only the assignee may ask for leave
    let (status, _) = send(
        &router,
        "POST",
        "/leave-requests",
        Some(json!({
            "assignment_id": assignment["id"],
            "user_id": "u-bob",
            "leave_type": "SICK"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, leave) = send(
        &router,
        "POST",
        "/leave-requests",
        Some(json!({
            "assignment_id": assignment["id"],
            "user_id": "u-alice",
            "leave_type": "SICK"
        })),
    )
    .await;
    let uri = format!("/leave-requests/{}", leave["id"].as_str().unwrap());

    // A pending leave request pins the shift
    let shift_uri = format!("/shifts/{}", assignment["shift_id"].as_str().unwrap());
    let (status, _) = send(&router, "DELETE", &shift_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &router,
        "PATCH",
        &uri,
        Some(json!({"status": "APPROVED", "operator_id": "op-corner"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = send(
        &router,
        "PATCH",
        &uri,
        Some(json!({"status": "APPROVED", "operator_id": "op-harbour"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "APPROVED");

    // Decided requests can no longer be cancelled
    let (status, _) = send(&router, "DELETE", &format!("{}?user_id=u-alice", uri), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The assignment is kept and still blocks the worker's calendar
    let (_, assignments) = send(&router, "GET", "/assignments?user_id=u-alice", None).await;
    assert_eq!(assignments.as_array().unwrap().len(), 1);

    // Approved leave pins the assignment against release and deletion
    let (status, _) = send(
        &router,
        "POST",
        &format!("{}/escalate", shift_uri),
        Some(json!({
            "target_visibility": "PLATFORM",
            "unassign_assignment_id": assignment["id"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&router, "DELETE", &shift_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_pending_leave() {
    let router = create_router_for_test();
    let assignment = assigned_to_alice(&router, "2024-06-18").await;
    let (_, leave) = send(
        &router,
        "POST",
        "/leave-requests",
        Some(json!({
            "assignment_id": assignment["id"],
            "user_id": "u-alice",
            "leave_type": "PERSONAL"
        })),
    )
    .await;
    let uri = format!("/leave-requests/{}", leave["id"].as_str().unwrap());

    let (status, _) = send(&router, "DELETE", &format!("{}?user_id=u-bob", uri), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&router, "DELETE", &format!("{}?user_id=u-alice", uri), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// =============================================================================
// Swaps
// =============================================================================

#[tokio::test]
async fn test_swap_approved_with_replacement() {
    let router = create_router_for_test();
    let assignment = assigned_to_alice(&router, "2024-06-19").await;

    let (status, swap) = send(
        &router,
        "POST",
        "/swap-requests",
        Some(json!({
            "pharmacy_id": "ph-harbour",
            "role": "PHARMACIST",
            "occurrence": assignment["occurrence"],
            "note": "wedding",
            "requested_by": "u-alice"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(swap["status"], "PENDING");
    let uri = format!("/swap-requests/{}", swap["id"].as_str().unwrap());

    // Leave cannot be requested while the swap is pending
    let (status, _) = send(
        &router,
        "POST",
        "/leave-requests",
        Some(json!({
            "assignment_id": assignment["id"],
            "user_id": "u-alice",
            "leave_type": "ANNUAL"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send(
        &router,
        "PATCH",
        &uri,
        Some(json!({"user_id": "u-alice", "note": "wedding, whole day"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["note"], "wedding, whole day");

    let (status, outcome) = send(
        &router,
        "PATCH",
        &uri,
        Some(json!({
            "status": "APPROVED",
            "operator_id": "op-harbour",
            "replacement_user_id": "u-bob"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["swap"]["status"], "APPROVED");
    assert_eq!(outcome["assignment"]["user_id"], "u-bob");

    let (_, bob) = send(&router, "GET", "/assignments?user_id=u-bob", None).await;
    assert_eq!(bob.as_array().unwrap().len(), 1);
    let (_, alice) = send(&router, "GET", "/assignments?user_id=u-alice", None).await;
    assert!(alice.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_swap_auto_published_releases_assignment() {
    let router = create_router_for_test();
    let assignment = assigned_to_alice(&router, "2024-06-20").await;

    let (_, swap) = send(
        &router,
        "POST",
        "/swap-requests",
        Some(json!({
            "pharmacy_id": "ph-harbour",
            "role": "PHARMACIST",
            "occurrence": assignment["occurrence"],
            "requested_by": "u-alice"
        })),
    )
    .await;
    let uri = format!("/swap-requests/{}", swap["id"].as_str().unwrap());

    let (status, outcome) = send(&router, "PATCH", &uri, Some(json!({"status": "AUTO_PUBLISHED"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["swap"]["status"], "AUTO_PUBLISHED");
    assert_eq!(outcome["released"]["occurrence"], assignment["occurrence"]);

    let (status, _) = send(&router, "DELETE", &format!("{}?user_id=u-alice", uri), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// =============================================================================
// Rates
// =============================================================================

#[tokio::test]
async fn test_resolve_pharmacist_rates_from_pharmacy_defaults() {
    let router = create_router_for_test();
    let (status, json) = send(
        &router,
        "POST",
        "/rates/resolve",
        Some(json!({
            "pharmacy_id": "ph-harbour",
            "role": "PHARMACIST",
            "employment_type": "LOCUM",
            "slots": [
                slot("2024-06-10", "09:00:00", "17:00:00"),
                slot("2024-06-03", "09:00:00", "17:00:00"),
                slot("2024-06-08", "09:00:00", "17:00:00")
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rates: Vec<Decimal> = json["rates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| decimal(r.as_str().unwrap()))
        .collect();
    // Monday weekday, Saturday, then the King's Birthday holiday
    assert_eq!(rates, vec![decimal("65"), decimal("75"), decimal("110")]);
    assert_eq!(json["rows"][0]["occurrence"]["date"], "2024-06-03");
    assert_eq!(json["rows"][0]["state"]["status"], "resolved");
}

#[tokio::test]
async fn test_resolve_casual_assistant_rate_with_loading() {
    let router = create_router_for_test();
    let (status, json) = send(
        &router,
        "POST",
        "/rates/resolve",
        Some(json!({
            "pharmacy_id": "ph-central",
            "role": "ASSISTANT",
            "employment_type": "CASUAL",
            "slots": [slot("2024-06-04", "10:00:00", "16:00:00")]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(json["rates"][0].as_str().unwrap()), decimal("37.50"));
}

#[tokio::test]
async fn test_resolve_without_pharmacist_config_leaves_row_for_operator() {
    let router = create_router_for_test();
    let (status, json) = send(
        &router,
        "POST",
        "/rates/resolve",
        Some(json!({
            "pharmacy_id": "ph-corner",
            "role": "PHARMACIST",
            "employment_type": "LOCUM",
            "slots": [slot("2024-06-04", "09:00:00", "17:00:00")]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["rates"][0].is_null());
    assert_eq!(json["rows"][0]["state"]["status"], "failed");
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let router = create_router_for_test();
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/open-shifts/claim")
                .header("Content-Type", "application/json")
                .body(Body::from("{\"shift_id\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(json["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_unknown_role_returns_validation_error() {
    let router = create_router_for_test();
    let (status, json) = send(
        &router,
        "POST",
        "/shifts",
        Some(shift_body("ph-corner", "SURGEON", vec![slot("2024-06-04", "09:00:00", "17:00:00")])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}
