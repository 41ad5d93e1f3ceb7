//! Display formatting for distances, durations and fares
//!
//! Pure functions, total over their documented domains.

/// `"500m"` under one kilometre (nearest metre), else `"2.5km"`.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1}km")
    }
}

/// `"45 min"` under an hour, else `"1h 30m"`, dropping the minute term at
/// exact hours.
pub fn format_time(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes} min");
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{hours}h")
    }
}

/// Peso-sign prefix, exactly two decimal places.
pub fn format_fare(amount: f64) -> String {
    format!("₱{amount:.2}")
}
