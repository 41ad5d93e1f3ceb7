//! Pure transition function
//!
//! Given the same state and event this always produces the same result and
//! performs no I/O. One outstanding operation at a time: a transition never
//! emits more than one effect.

use super::{Effect, Event, FlowErrorKind, RouteFlowContext, RouteFlowState};
use thiserror::Error;

/// Result of a flow transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: RouteFlowState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: RouteFlowState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("A fetch is already in progress")]
    FlowBusy,
    #[error("Nothing to retry: the flow is not in an error state")]
    NothingToRetry,
}

pub fn transition(
    state: &RouteFlowState,
    _context: &RouteFlowContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Fetch (and Ready-state refresh) re-acquires location first
        (
            RouteFlowState::Idle | RouteFlowState::Ready { .. } | RouteFlowState::Error { .. },
            Event::FetchRequested,
        ) => Ok(TransitionResult::new(RouteFlowState::Locating)
            .with_effect(Effect::AcquireLocation)),

        (
            RouteFlowState::Locating | RouteFlowState::Fetching { .. },
            Event::FetchRequested | Event::RetryRequested,
        ) => Err(TransitionError::FlowBusy),

        // Retry is only meaningful out of Error
        (RouteFlowState::Error { .. }, Event::RetryRequested) => {
            Ok(TransitionResult::new(RouteFlowState::Locating)
                .with_effect(Effect::AcquireLocation))
        }

        (RouteFlowState::Idle | RouteFlowState::Ready { .. }, Event::RetryRequested) => {
            Err(TransitionError::NothingToRetry)
        }

        // Location acquisition outcomes
        (RouteFlowState::Locating, Event::LocationResolved { location }) => Ok(
            TransitionResult::new(RouteFlowState::Fetching { location }).with_effect(
                Effect::RequestRoute {
                    latitude: location.latitude,
                    longitude: location.longitude,
                },
            ),
        ),

        (RouteFlowState::Locating, Event::LocationFailed { error }) => {
            Ok(TransitionResult::new(RouteFlowState::Error {
                message: error.message.clone(),
                kind: FlowErrorKind::Location(error.kind),
            }))
        }

        // Route request outcomes; Ready replaces any earlier result wholesale
        (RouteFlowState::Fetching { location }, Event::RouteResolved { route }) => {
            Ok(TransitionResult::new(RouteFlowState::Ready {
                location: *location,
                route,
            }))
        }

        (RouteFlowState::Fetching { .. }, Event::RouteFailed { error }) => {
            Ok(TransitionResult::new(RouteFlowState::Error {
                message: error.message.clone(),
                kind: FlowErrorKind::Api(error.kind),
            }))
        }

        // A completion arriving in a state that no longer expects it belongs
        // to a superseded operation; last write wins, so drop it.
        (
            _,
            Event::LocationResolved { .. }
            | Event::LocationFailed { .. }
            | Event::RouteResolved { .. }
            | Event::RouteFailed { .. },
        ) => Ok(TransitionResult::new(state.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiErrorKind, RouteResponse};
    use crate::location::{LocationError, LocationErrorKind, UserLocation};

    fn ctx() -> RouteFlowContext {
        RouteFlowContext::new("TS01")
    }

    fn fix() -> UserLocation {
        UserLocation {
            latitude: 18.1984,
            longitude: 120.5936,
            accuracy: 12.0,
        }
    }

    fn route(total_km: f64) -> RouteResponse {
        RouteResponse {
            destination_name: "Paoay Church".to_string(),
            destination_location: "Paoay".to_string(),
            total_distance_km: total_km,
            total_fare: 65.0,
            total_time_minutes: 50,
            steps: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn test_happy_path() {
        let result = transition(&RouteFlowState::Idle, &ctx(), Event::FetchRequested).unwrap();
        assert_eq!(result.new_state, RouteFlowState::Locating);
        assert_eq!(result.effects, vec![Effect::AcquireLocation]);

        let result = transition(
            &result.new_state,
            &ctx(),
            Event::LocationResolved { location: fix() },
        )
        .unwrap();
        assert!(matches!(result.new_state, RouteFlowState::Fetching { .. }));
        assert_eq!(
            result.effects,
            vec![Effect::RequestRoute {
                latitude: 18.1984,
                longitude: 120.5936
            }]
        );

        let result = transition(
            &result.new_state,
            &ctx(),
            Event::RouteResolved { route: route(12.3) },
        )
        .unwrap();
        match result.new_state {
            RouteFlowState::Ready { route, .. } => assert_eq!(route.destination_name, "Paoay Church"),
            other => panic!("expected Ready, got {other:?}"),
        }
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_location_failure_reaches_error_without_route_request() {
        let result = transition(
            &RouteFlowState::Locating,
            &ctx(),
            Event::LocationFailed {
                error: LocationError::permission_denied(),
            },
        )
        .unwrap();

        match &result.new_state {
            RouteFlowState::Error { kind, .. } => assert_eq!(
                *kind,
                FlowErrorKind::Location(LocationErrorKind::PermissionDenied)
            ),
            other => panic!("expected Error, got {other:?}"),
        }
        // No effect: the route request is never issued
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_route_failure_reaches_error() {
        let result = transition(
            &RouteFlowState::Fetching { location: fix() },
            &ctx(),
            Event::RouteFailed {
                error: ApiError::network(),
            },
        )
        .unwrap();

        match &result.new_state {
            RouteFlowState::Error { kind, message } => {
                assert_eq!(*kind, FlowErrorKind::Api(ApiErrorKind::Network));
                assert!(!message.is_empty());
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn test_retry_from_error_reacquires_location() {
        let error = RouteFlowState::Error {
            message: "boom".to_string(),
            kind: FlowErrorKind::Api(ApiErrorKind::Server),
        };
        let result = transition(&error, &ctx(), Event::RetryRequested).unwrap();
        assert_eq!(result.new_state, RouteFlowState::Locating);
        assert_eq!(result.effects, vec![Effect::AcquireLocation]);
    }

    #[test]
    fn test_retry_outside_error_is_rejected() {
        assert!(matches!(
            transition(&RouteFlowState::Idle, &ctx(), Event::RetryRequested),
            Err(TransitionError::NothingToRetry)
        ));
    }

    #[test]
    fn test_fetch_while_busy_is_rejected() {
        assert!(matches!(
            transition(&RouteFlowState::Locating, &ctx(), Event::FetchRequested),
            Err(TransitionError::FlowBusy)
        ));
        assert!(matches!(
            transition(
                &RouteFlowState::Fetching { location: fix() },
                &ctx(),
                Event::RetryRequested
            ),
            Err(TransitionError::FlowBusy)
        ));
    }

    #[test]
    fn test_refresh_from_ready_replaces_result_wholesale() {
        let ready = RouteFlowState::Ready {
            location: fix(),
            route: route(12.3),
        };

        let result = transition(&ready, &ctx(), Event::FetchRequested).unwrap();
        assert_eq!(result.new_state, RouteFlowState::Locating);

        let result = transition(
            &result.new_state,
            &ctx(),
            Event::LocationResolved { location: fix() },
        )
        .unwrap();
        let result = transition(
            &result.new_state,
            &ctx(),
            Event::RouteResolved { route: route(99.9) },
        )
        .unwrap();

        match result.new_state {
            RouteFlowState::Ready { route, .. } => {
                assert!((route.total_distance_km - 99.9).abs() < 1e-9);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_stale_completions_are_ignored() {
        // A superseded request resolving late must not disturb the flow.
        for state in [
            RouteFlowState::Idle,
            RouteFlowState::Ready {
                location: fix(),
                route: route(12.3),
            },
        ] {
            let result = transition(
                &state,
                &ctx(),
                Event::RouteResolved { route: route(1.0) },
            )
            .unwrap();
            assert_eq!(result.new_state, state);
            assert!(result.effects.is_empty());

            let result = transition(
                &state,
                &ctx(),
                Event::LocationFailed {
                    error: LocationError::timeout(),
                },
            )
            .unwrap();
            assert_eq!(result.new_state, state);
        }
    }
}
