//! HTTP API for the shift engine.
//!
//! This module exposes the roster lifecycle, rate lookup and escalation
//! sweep as REST endpoints built on axum.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ClaimRequest, EscalateRequest, EscalationRunRequest, EscalationRunResponse,
    LeaveDecisionRequest, RateResolveRequest, RateResolveResponse, SwapAction, SwapUpdateRequest,
    UserQuery,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
