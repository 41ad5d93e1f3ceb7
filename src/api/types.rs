//! Wire types for the LocaTour backend

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Body for `POST /api/chat/`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    /// `None` for anonymous/new chats; the server establishes a session.
    pub session_id: Option<String>,
}

/// Response for one chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// May be absent or empty. When present, the first element is the
    /// display card for the turn.
    #[serde(default)]
    pub matched_items: Vec<PlaceCard>,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Naive UTC stamp as emitted by the backend.
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

impl ChatResponse {
    /// The destination card to render for this turn, if any.
    pub fn display_card(&self) -> Option<&PlaceCard> {
        self.matched_items.first()
    }
}

/// Immutable destination snapshot returned with a chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCard {
    #[serde(default)]
    pub destination_id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub full_description: Option<String>,
    #[serde(default)]
    pub best_time_to_visit: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Whether the routing backend knows this destination.
    #[serde(default)]
    pub has_routing: bool,
}

/// One stored chat turn from the history endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub id: i64,
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    /// JSON-encoded list of matched item ids, stored opaquely.
    #[serde(default)]
    pub matched_items: String,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

/// Body for `POST /api/location/route`
#[derive(Debug, Clone, Serialize)]
pub struct RouteRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub destination_id: String,
}

/// Multi-modal itinerary to a destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    #[serde(default)]
    pub destination_name: String,
    #[serde(default)]
    pub destination_location: String,
    pub total_distance_km: f64,
    pub total_fare: f64,
    pub total_time_minutes: u32,
    pub steps: Vec<RouteStep>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl RouteResponse {
    /// Step numbers must be 1-based and strictly increasing by one.
    pub fn steps_are_sequential(&self) -> bool {
        self.steps
            .iter()
            .enumerate()
            .all(|(i, step)| step.step_number as usize == i + 1)
    }
}

/// One leg of an itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub step_number: u32,
    pub transport_mode: TransportMode,
    pub instruction: String,
    #[serde(default)]
    pub from_location: String,
    #[serde(default)]
    pub to_location: String,
    pub distance_km: f64,
    #[serde(default)]
    pub fare: Option<f64>,
    pub estimated_time_minutes: u32,
    #[serde(default)]
    pub landmark: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walking,
    Jeepney,
    Bus,
    Tricycle,
    Van,
}

impl TransportMode {
    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Jeepney => "jeepney",
            TransportMode::Bus => "bus",
            TransportMode::Tricycle => "tricycle",
            TransportMode::Van => "van",
        }
    }
}

/// Entry from `GET /api/location/nearby`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPlace {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub distance_km: f64,
    /// Under one kilometre away.
    pub walking_distance: bool,
    #[serde(default)]
    pub estimated_walking_time: Option<u32>,
}

/// Response for `GET /api/location/coordinates/{name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCoordinates {
    pub location: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}
