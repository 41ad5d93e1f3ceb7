//! HTTP client for the LocaTour backend
//!
//! Every call funnels through [`ApiClient::dispatch`], which owns the
//! error-normalization rule: non-2xx statuses become [`ApiErrorKind::Server`]
//! with the body's `detail` when present, transport failures become
//! [`ApiErrorKind::Network`] with a fixed user-facing message, and anything
//! else is [`ApiErrorKind::Unknown`].

use super::error::{ApiError, ApiResult, GENERIC_SERVER_ERROR};
use super::types::*;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Every network call is bounded so a suspension point cannot hang.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Liveness probe. The payload is opaque to callers.
    pub async fn health_check(&self) -> ApiResult<Value> {
        self.dispatch(self.client.get(self.url("/health"))).await
    }

    pub async fn send_message(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> ApiResult<ChatResponse> {
        let request = ChatRequest {
            message: message.to_string(),
            session_id: session_id.map(String::from),
        };
        self.dispatch(self.client.post(self.url("/api/chat/")).json(&request))
            .await
    }

    pub async fn get_history(&self, session_id: &str) -> ApiResult<Vec<ChatHistoryEntry>> {
        let url = self.url(&format!("/api/chat/history/{session_id}"));
        self.dispatch(self.client.get(url)).await
    }

    pub async fn get_all_history(&self, limit: u32) -> ApiResult<Vec<ChatHistoryEntry>> {
        self.dispatch(
            self.client
                .get(self.url("/api/chat/history"))
                .query(&[("limit", limit)]),
        )
        .await
    }

    pub async fn delete_history(&self, session_id: &str) -> ApiResult<Value> {
        let url = self.url(&format!("/api/chat/history/{session_id}"));
        self.dispatch(self.client.delete(url)).await
    }

    pub async fn get_context(&self, session_id: &str) -> ApiResult<Value> {
        let url = self.url(&format!("/api/chat/context/{session_id}"));
        self.dispatch(self.client.get(url)).await
    }

    pub async fn reset_context(&self, session_id: &str) -> ApiResult<Value> {
        let url = self.url(&format!("/api/chat/reset/{session_id}"));
        self.dispatch(self.client.post(url)).await
    }

    pub async fn get_route(
        &self,
        latitude: f64,
        longitude: f64,
        destination_id: &str,
    ) -> ApiResult<RouteResponse> {
        let request = RouteRequest {
            latitude,
            longitude,
            destination_id: destination_id.to_string(),
        };
        let route: RouteResponse = self
            .dispatch(
                self.client
                    .post(self.url("/api/location/route"))
                    .json(&request),
            )
            .await?;

        if !route.steps_are_sequential() {
            tracing::warn!(destination_id, "route steps are not sequentially numbered");
        }

        Ok(route)
    }

    pub async fn get_nearby_places(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        limit: u32,
    ) -> ApiResult<Vec<NearbyPlace>> {
        self.dispatch(
            self.client.get(self.url("/api/location/nearby")).query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("radius_km", radius_km.to_string()),
                ("limit", limit.to_string()),
            ]),
        )
        .await
    }

    pub async fn get_location_coordinates(&self, name: &str) -> ApiResult<LocationCoordinates> {
        let url = self.url(&format!(
            "/api/location/coordinates/{}",
            urlencoding::encode(name)
        ));
        self.dispatch(self.client.get(url)).await
    }

    pub async fn get_transport_routes(&self) -> ApiResult<Value> {
        self.dispatch(self.client.get(self.url("/api/location/transport-routes")))
            .await
    }

    /// Single normalization point for every request/response pair.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                tracing::error!(error = %e, "request never completed");
                ApiError::network()
            } else {
                ApiError::unknown(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read response body");
            ApiError::network()
        })?;

        if !status.is_success() {
            return Err(Self::classify_status(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::unknown(format!("Failed to parse response: {e}")))
    }

    fn classify_status(status: StatusCode, body: &str) -> ApiError {
        tracing::error!(status = %status, "server returned error status");

        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from));

        ApiError::server(detail.unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{ApiErrorKind, NETWORK_ERROR_MESSAGE};
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    /// Serve a router on an ephemeral port and return its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_send_message_parses_chat_response() {
        let app = Router::new().route(
            "/api/chat/",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["message"], "beaches in pagudpud");
                assert_eq!(body["session_id"], "session-1-abcdefghi");
                Json(json!({
                    "response": "Saud Beach is a great pick!",
                    "matched_items": [
                        { "name": "Saud Beach", "destination_id": "TS03",
                          "location": "Pagudpud", "has_routing": true }
                    ],
                    "session_id": "session-1-abcdefghi",
                    "timestamp": "2025-03-14T08:30:00.123456"
                }))
            }),
        );
        let base = serve(app).await;

        let client = ApiClient::new(&base);
        let resp = client
            .send_message("beaches in pagudpud", Some("session-1-abcdefghi"))
            .await
            .unwrap();

        assert_eq!(resp.response, "Saud Beach is a great pick!");
        assert_eq!(resp.display_card().unwrap().destination_id, "TS03");
    }

    #[tokio::test]
    async fn test_error_status_with_detail_becomes_server_error() {
        let app = Router::new().route(
            "/api/chat/",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "detail": "db down" })),
                )
            }),
        );
        let base = serve(app).await;

        let err = ApiClient::new(&base)
            .send_message("hello", None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Server);
        assert_eq!(err.message, "db down");
        assert!(err.kind.is_retryable());
    }

    #[tokio::test]
    async fn test_error_status_without_detail_uses_generic_message() {
        let app = Router::new().route(
            "/health",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(app).await;

        let err = ApiClient::new(&base).health_check().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert_eq!(err.message, GENERIC_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Bind then drop to get a port nothing is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = ApiClient::new(&format!("http://{addr}"))
            .get_transport_routes()
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Network);
        assert_eq!(err.message, NETWORK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let app = Router::new().route(
            "/health",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!({ "status": "healthy" }))
            }),
        );
        let base = serve(app).await;

        let client = ApiClient::with_timeout(&base, Duration::from_millis(50));
        let err = client.health_check().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
    }

    #[tokio::test]
    async fn test_nearby_places_query_parameters() {
        let app = Router::new().route(
            "/api/location/nearby",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params["latitude"], "18.1984");
                assert_eq!(params["longitude"], "120.5936");
                assert_eq!(params["radius_km"], "5");
                assert_eq!(params["limit"], "10");
                Json(json!([
                    {
                        "id": "TS05",
                        "name": "Sinking Bell Tower",
                        "type": "Historical Site",
                        "location": "Laoag",
                        "distance_km": 0.8,
                        "walking_distance": true,
                        "estimated_walking_time": 10
                    }
                ]))
            }),
        );
        let base = serve(app).await;

        let places = ApiClient::new(&base)
            .get_nearby_places(18.1984, 120.5936, 5.0, 10)
            .await
            .unwrap();

        assert_eq!(places.len(), 1);
        assert!(places[0].walking_distance);
    }

    #[tokio::test]
    async fn test_location_name_is_path_escaped() {
        let app = Router::new().route(
            "/api/location/coordinates/:name",
            get(|Path(name): Path<String>| async move {
                // axum decodes the escaped segment back to the raw name
                assert_eq!(name, "Fort Ilocandia Resort");
                Json(json!({
                    "location": name,
                    "coordinates": { "lat": 18.1647, "lon": 120.6089 }
                }))
            }),
        );
        let base = serve(app).await;

        let coords = ApiClient::new(&base)
            .get_location_coordinates("Fort Ilocandia Resort")
            .await
            .unwrap();

        assert_eq!(coords.location, "Fort Ilocandia Resort");
        assert!((coords.coordinates.lat - 18.1647).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_get_route_parses_full_itinerary() {
        let app = Router::new().route(
            "/api/location/route",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["destination_id"], "TS01");
                Json(json!({
                    "destination_name": "Paoay Church",
                    "destination_location": "Paoay",
                    "total_distance_km": 12.3,
                    "total_fare": 65.0,
                    "total_time_minutes": 50,
                    "warnings": ["Fares are estimates"],
                    "steps": [
                        {
                            "step_number": 1,
                            "transport_mode": "tricycle",
                            "instruction": "Take a tricycle to the terminal",
                            "from_location": "Your location",
                            "to_location": "Laoag terminal",
                            "distance_km": 1.2,
                            "fare": 20.0,
                            "estimated_time_minutes": 8
                        }
                    ]
                }))
            }),
        );
        let base = serve(app).await;

        let route = ApiClient::new(&base)
            .get_route(18.1984, 120.5936, "TS01")
            .await
            .unwrap();

        assert_eq!(route.destination_name, "Paoay Church");
        assert_eq!(route.steps[0].transport_mode, TransportMode::Tricycle);
        assert_eq!(route.warnings, vec!["Fares are estimates"]);
    }

    #[tokio::test]
    async fn test_undecodable_success_body_is_unknown_error() {
        let app = Router::new().route("/health", get(|| async { "not json" }));
        let base = serve(app).await;

        let err = ApiClient::new(&base).health_check().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unknown);
        assert!(!err.kind.is_retryable());
    }
}
