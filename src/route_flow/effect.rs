//! Effects produced by flow transitions

/// Work the driver performs after a transition; completions come back as
/// events.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Acquire a fresh position fix
    AcquireLocation,

    /// Issue the route request for the flow's destination
    RequestRoute { latitude: f64, longitude: f64 },
}
