//! Flow state types

use crate::api::{ApiErrorKind, RouteResponse};
use crate::location::{LocationErrorKind, UserLocation};

/// Context for one retrieval flow (immutable configuration)
#[derive(Debug, Clone)]
pub struct RouteFlowContext {
    pub destination_id: String,
}

impl RouteFlowContext {
    pub fn new(destination_id: impl Into<String>) -> Self {
        Self {
            destination_id: destination_id.into(),
        }
    }
}

/// Which boundary produced a flow failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowErrorKind {
    Location(LocationErrorKind),
    Api(ApiErrorKind),
}

impl FlowErrorKind {
    pub fn is_retryable(self) -> bool {
        match self {
            FlowErrorKind::Location(kind) => kind.is_retryable(),
            FlowErrorKind::Api(kind) => kind.is_retryable(),
        }
    }
}

/// Travel-details retrieval state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RouteFlowState {
    /// Nothing requested yet
    #[default]
    Idle,

    /// Acquiring a position fix
    Locating,

    /// Fix acquired, route request in flight
    Fetching { location: UserLocation },

    /// Route available for display; replaced wholesale by a later fetch
    Ready {
        location: UserLocation,
        route: RouteResponse,
    },

    /// Failed; the user may retry, which re-acquires location first
    Error {
        message: String,
        kind: FlowErrorKind,
    },
}

impl RouteFlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RouteFlowState::Idle | RouteFlowState::Ready { .. } | RouteFlowState::Error { .. }
        )
    }
}
