//! Combined workflows
//!
//! Composes the session store, API client and location provider into the
//! higher-level operations the front end calls. Each workflow issues at most
//! one outstanding network call at a time and never retries on its own;
//! retry is always an explicit user action.

use crate::api::{
    ApiClient, ApiError, ChatHistoryEntry, ChatResponse, LocationCoordinates, NearbyPlace,
    RouteResponse,
};
use crate::geo::haversine_km;
use crate::location::{LocationError, LocationOptions, LocationProvider};
use crate::route_flow::{transition, Effect, Event, RouteFlowContext, RouteFlowState};
use crate::session::{SessionError, SessionStore};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct Workflows {
    api: Arc<ApiClient>,
    sessions: Arc<dyn SessionStore>,
    location: Arc<dyn LocationProvider>,
}

impl Workflows {
    pub fn new(
        api: Arc<ApiClient>,
        sessions: Arc<dyn SessionStore>,
        location: Arc<dyn LocationProvider>,
    ) -> Self {
        Self {
            api,
            sessions,
            location,
        }
    }

    /// Send a chat message under the persisted session, creating one if
    /// absent.
    pub async fn send_chat_message(&self, message: &str) -> Result<ChatResponse, WorkflowError> {
        let session_id = self.sessions.get_or_create()?;
        Ok(self.api.send_message(message, Some(&session_id)).await?)
    }

    /// History of the current session.
    pub async fn conversation_history(&self) -> Result<Vec<ChatHistoryEntry>, WorkflowError> {
        let session_id = self.sessions.get_or_create()?;
        Ok(self.api.get_history(&session_id).await?)
    }

    /// Most recent turns across all sessions.
    pub async fn all_history(&self, limit: u32) -> Result<Vec<ChatHistoryEntry>, WorkflowError> {
        Ok(self.api.get_all_history(limit).await?)
    }

    /// Server-side conversation context summary for the current session.
    pub async fn conversation_context(&self) -> Result<serde_json::Value, WorkflowError> {
        let session_id = self.sessions.get_or_create()?;
        Ok(self.api.get_context(&session_id).await?)
    }

    /// Straight-line distance from the current position to a named place.
    pub async fn distance_to_place(
        &self,
        name: &str,
    ) -> Result<(LocationCoordinates, f64), WorkflowError> {
        let fix = self
            .location
            .current_location(&LocationOptions::default())
            .await?;
        let place = self.api.get_location_coordinates(name).await?;
        let km = haversine_km(
            fix.latitude,
            fix.longitude,
            place.coordinates.lat,
            place.coordinates.lon,
        );
        Ok((place, km))
    }

    /// Reset server-side context, delete server-side history, then clear the
    /// local session id, strictly in that order. A failure midway leaves the
    /// local id in place so the whole reset can be retried.
    pub async fn reset_conversation(&self) -> Result<(), WorkflowError> {
        let session_id = self.sessions.get_or_create()?;
        self.api.reset_context(&session_id).await?;
        self.api.delete_history(&session_id).await?;
        self.sessions.clear()?;
        tracing::info!(session_id = %session_id, "conversation reset");
        Ok(())
    }

    /// Resolve the current position, then fetch the route. If location
    /// resolution fails the route request is never issued.
    pub async fn route_from_current_location(
        &self,
        destination_id: &str,
    ) -> Result<RouteResponse, WorkflowError> {
        let fix = self
            .location
            .current_location(&LocationOptions::default())
            .await?;
        Ok(self
            .api
            .get_route(fix.latitude, fix.longitude, destination_id)
            .await?)
    }

    /// Resolve the current position, then search around it.
    pub async fn nearby_from_current_location(
        &self,
        radius_km: f64,
        limit: u32,
    ) -> Result<Vec<NearbyPlace>, WorkflowError> {
        let fix = self
            .location
            .current_location(&LocationOptions::default())
            .await?;
        Ok(self
            .api
            .get_nearby_places(fix.latitude, fix.longitude, radius_km, limit)
            .await?)
    }

    /// Run the travel-details flow from scratch; returns `Ready` or `Error`.
    pub async fn fetch_route_details(&self, destination_id: &str) -> RouteFlowState {
        self.drive(
            RouteFlowContext::new(destination_id),
            RouteFlowState::Idle,
            Event::FetchRequested,
        )
        .await
    }

    /// Explicit user retry of a failed flow: re-acquires location and
    /// re-issues the route request. A success replaces the previous result
    /// wholesale.
    pub async fn retry_route_details(
        &self,
        destination_id: &str,
        state: RouteFlowState,
    ) -> RouteFlowState {
        self.drive(
            RouteFlowContext::new(destination_id),
            state,
            Event::RetryRequested,
        )
        .await
    }

    /// Execute effects against the injected provider/client and feed
    /// completions back as events until the flow settles.
    async fn drive(
        &self,
        context: RouteFlowContext,
        mut state: RouteFlowState,
        first: Event,
    ) -> RouteFlowState {
        let mut pending = vec![first];

        while let Some(event) = pending.pop() {
            let result = match transition(&state, &context, event) {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(error = %e, "route flow event rejected");
                    continue;
                }
            };
            state = result.new_state;

            for effect in result.effects {
                match effect {
                    Effect::AcquireLocation => {
                        match self
                            .location
                            .current_location(&LocationOptions::default())
                            .await
                        {
                            Ok(location) => pending.push(Event::LocationResolved { location }),
                            Err(error) => pending.push(Event::LocationFailed { error }),
                        }
                    }
                    Effect::RequestRoute {
                        latitude,
                        longitude,
                    } => {
                        match self
                            .api
                            .get_route(latitude, longitude, &context.destination_id)
                            .await
                        {
                            Ok(route) => pending.push(Event::RouteResolved { route }),
                            Err(error) => pending.push(Event::RouteFailed { error }),
                        }
                    }
                }
            }
        }

        debug_assert!(state.is_terminal(), "flow settled mid-operation");
        state
    }
}
