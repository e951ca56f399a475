use crate::model::DistanceUnit;

const METERS_PER_MILE: f64 = 1609.344;
const FEET_PER_METER: f64 = 3.28084;

/// "850 m" / "12.4 km", or "300 ft" / "7.7 mi".
pub(crate) fn format_distance(meters: f64, unit: DistanceUnit) -> String {
    match unit {
        DistanceUnit::Metric => {
            if meters < 1000.0 {
                format!("{} m", meters.round() as i64)
            } else {
                format!("{:.1} km", meters / 1000.0)
            }
        }
        DistanceUnit::Imperial => {
            let miles = meters / METERS_PER_MILE;
            if miles < 0.1 {
                format!("{} ft", (meters * FEET_PER_METER).round() as i64)
            } else {
                format!("{miles:.1} mi")
            }
        }
    }
}

/// "< 1 min", "45 min", "1 hr 5 min", "2 hr".
pub(crate) fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round() as i64;

    if minutes < 1 {
        return "< 1 min".to_string();
    }

    let hours = minutes / 60;
    let rest = minutes % 60;

    match (hours, rest) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}

/// Display name for a stop without a place name: the formatted address cut
/// at its first comma ("1600 Amphitheatre Pkwy, Mountain View, CA" ->
/// "1600 Amphitheatre Pkwy").
pub(crate) fn shorten_address(formatted_address: &str) -> String {
    formatted_address
        .split(',')
        .next()
        .unwrap_or(formatted_address)
        .trim()
        .to_string()
}
