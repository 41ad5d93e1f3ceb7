//! Events fed into the flow

use crate::api::{ApiError, RouteResponse};
use crate::location::{LocationError, UserLocation};

#[derive(Debug, Clone)]
pub enum Event {
    /// User opened the details view or asked for a refresh
    FetchRequested,

    /// Position fix acquired
    LocationResolved { location: UserLocation },

    /// Position fix failed
    LocationFailed { error: LocationError },

    /// Route request completed
    RouteResolved { route: RouteResponse },

    /// Route request failed
    RouteFailed { error: ApiError },

    /// Explicit user retry out of `Error`
    RetryRequested,
}
