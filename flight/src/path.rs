//! Turns a [`FlightResult`] into the ordered waypoints a drone flies through.

use geojson::{Feature, Value};

use crate::{FlightProperties, FlightResult, GeoPoint, RouteError};

/// Concatenates the vertices of every drone flight path, in feature order. Other features are
/// ignored. Nothing is deduplicated, smoothed, or reordered.
pub fn extract(result: &FlightResult) -> Vec<GeoPoint> {
    let mut path = Vec::new();
    for feature in result.features() {
        if FlightProperties::of(feature).is_none() {
            continue;
        }
        if let Some(line) = line_string(feature) {
            for position in line {
                if position.len() < 2 {
                    warn!("Skipping a flight path position with {} ordinates", position.len());
                    continue;
                }
                path.push(GeoPoint::new(position[0], position[1]));
            }
        }
    }
    path
}

/// Like [`extract`], but an empty path is reported.
pub fn require(result: &FlightResult) -> Result<Vec<GeoPoint>, RouteError> {
    let path = extract(result);
    if path.is_empty() {
        return Err(RouteError::NoFlightPath);
    }
    Ok(path)
}

fn line_string(feature: &Feature) -> Option<&Vec<Vec<f64>>> {
    match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::LineString(line)) => Some(line),
        _ => None,
    }
}
