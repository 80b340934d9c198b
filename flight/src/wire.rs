//! The JSON the routing service returns when asked to compare single- and multi-drone routes.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    flight_result_from_solution, ComparisonOutcome, FlightResult, GeoPoint, Recommendation,
    RouteAlternative, RouteChoice,
};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteComparisonResponse {
    pub single_drone_solution: Option<DeliveryPathResponse>,
    pub multi_drone_solution: Option<DeliveryPathResponse>,
    pub comparison: Option<ComparisonStats>,
    pub single_drone_geo_json: Option<FlightResult>,
    pub multi_drone_geo_json: Option<FlightResult>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonStats {
    #[serde(default)]
    pub single_drone_possible: bool,
    pub cost_difference_percent: Option<f64>,
    pub move_difference_percent: Option<f64>,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub reason: String,
    pub single_drone_cost: Option<f64>,
    pub multi_drone_cost: Option<f64>,
    pub single_drone_moves: Option<usize>,
    pub multi_drone_moves: Option<usize>,
    pub multi_drone_count: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPathResponse {
    pub total_cost: f64,
    pub total_moves: usize,
    #[serde(default)]
    pub drone_paths: Vec<DronePath>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DronePath {
    pub drone_id: String,
    #[serde(default)]
    pub deliveries: Vec<DeliveryPath>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPath {
    pub delivery_id: Option<u64>,
    #[serde(default)]
    pub flight_path: Vec<GeoPoint>,
}

impl RouteComparisonResponse {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl ComparisonOutcome {
    pub fn from_response(resp: RouteComparisonResponse) -> Self {
        let RouteComparisonResponse {
            single_drone_solution,
            multi_drone_solution,
            comparison,
            single_drone_geo_json,
            multi_drone_geo_json,
        } = resp;

        // Without comparison stats, nothing says the single-drone route is impossible
        let single_possible = comparison
            .as_ref()
            .map(|c| c.single_drone_possible)
            .unwrap_or(true);

        let single = if single_possible {
            alternative(
                RouteChoice::Single,
                single_drone_solution,
                single_drone_geo_json,
            )
            .map(|mut alt| {
                if let Some(ref c) = comparison {
                    alt.total_cost = c.single_drone_cost.or(alt.total_cost);
                    alt.total_moves = c.single_drone_moves.or(alt.total_moves);
                }
                alt.drone_count = Some(1);
                alt
            })
        } else {
            None
        };

        let multi = alternative(
            RouteChoice::Multi,
            multi_drone_solution,
            multi_drone_geo_json,
        )
        .map(|mut alt| {
            if let Some(ref c) = comparison {
                alt.total_cost = c.multi_drone_cost.or(alt.total_cost);
                alt.total_moves = c.multi_drone_moves.or(alt.total_moves);
                alt.drone_count = c.multi_drone_count.or(alt.drone_count);
            }
            alt
        });

        let mut outcome = match comparison {
            Some(c) => {
                let mut outcome = ComparisonOutcome::new(single, multi, c.recommendation, c.reason);
                outcome.cost_difference_percent = c.cost_difference_percent;
                outcome.move_difference_percent = c.move_difference_percent;
                outcome
            }
            None => ComparisonOutcome::new(single, multi, Recommendation::None, String::new()),
        };
        if outcome.single.is_none() && outcome.multi.is_none() {
            debug!("Comparison response carries neither route");
            outcome.cost_difference_percent = None;
            outcome.move_difference_percent = None;
        }
        outcome
    }
}

fn alternative(
    choice: RouteChoice,
    solution: Option<DeliveryPathResponse>,
    geojson: Option<FlightResult>,
) -> Option<RouteAlternative> {
    let result = match (geojson, &solution) {
        (Some(result), _) => result,
        (None, Some(solution)) => {
            debug!("No GeoJSON for the {choice} route; building it from the solution");
            flight_result_from_solution(solution)
        }
        (None, None) => return None,
    };
    let mut alt = RouteAlternative::new(choice, result);
    if let Some(solution) = solution {
        alt.total_cost = Some(solution.total_cost);
        alt.total_moves = Some(solution.total_moves);
        alt.drone_count = Some(solution.drone_paths.len());
    }
    Some(alt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line(drone: &str, coords: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": coords },
            "properties": { "droneId": drone, "deliveryIds": [1], "totalMoves": 4, "totalCost": 10.0 }
        })
    }

    #[test]
    fn converts_full_response() {
        let raw = json!({
            "singleDroneSolution": { "totalCost": 50.0, "totalMoves": 120, "dronePaths": [] },
            "multiDroneSolution": { "totalCost": 80.0, "totalMoves": 90, "dronePaths": [] },
            "comparison": {
                "singleDronePossible": true,
                "recommendation": "SINGLE_DRONE",
                "reason": "Single drone is cheaper",
                "singleDroneCost": 50.0,
                "multiDroneCost": 80.0,
                "singleDroneMoves": 120,
                "multiDroneMoves": 90,
                "multiDroneCount": 2,
                "costDifferencePercent": -60.0
            },
            "singleDroneGeoJson": { "type": "FeatureCollection", "features": [line("1", json!([[0.0, 0.0], [1.0, 1.0]]))] },
            "multiDroneGeoJson": { "type": "FeatureCollection", "features": [
                line("1", json!([[0.0, 0.0], [1.0, 1.0]])),
                line("2", json!([[0.0, 0.0], [2.0, 2.0]]))
            ] }
        })
        .to_string();

        let outcome = ComparisonOutcome::from_response(
            RouteComparisonResponse::from_json_str(&raw).unwrap(),
        );
        assert_eq!(outcome.recommendation, Recommendation::Single);
        assert_eq!(outcome.reason, "Single drone is cheaper");

        let single = outcome.single.as_ref().unwrap();
        assert_eq!(single.total_cost, Some(50.0));
        assert_eq!(single.total_moves, Some(120));
        assert_eq!(single.drone_count, Some(1));

        let multi = outcome.multi.as_ref().unwrap();
        assert_eq!(multi.total_cost, Some(80.0));
        assert_eq!(multi.drone_count, Some(2));
        assert_eq!(multi.result.features().len(), 2);

        assert_eq!(outcome.cost_difference_percent(), Some(-60.0));
        assert_eq!(outcome.move_difference_percent(), Some(25.0));
        assert!(outcome.is_meaningful());
    }

    #[test]
    fn impossible_single_route_is_dropped() {
        let raw = json!({
            "comparison": {
                "singleDronePossible": false,
                "recommendation": "MULTI_DRONE",
                "reason": "No single drone can carry everything"
            },
            "singleDroneGeoJson": { "type": "FeatureCollection", "features": [line("1", json!([[0.0, 0.0], [1.0, 1.0]]))] }
        })
        .to_string();
        let outcome = ComparisonOutcome::from_response(
            RouteComparisonResponse::from_json_str(&raw).unwrap(),
        );
        assert!(outcome.single.is_none());
        assert!(outcome.multi.is_none());
        assert_eq!(outcome.recommendation, Recommendation::Multi);
    }

    #[test]
    fn unknown_recommendation_means_none() {
        let raw = json!({
            "comparison": { "recommendation": "EITHER", "reason": "" }
        })
        .to_string();
        let resp = RouteComparisonResponse::from_json_str(&raw).unwrap();
        assert_eq!(
            ComparisonOutcome::from_response(resp).recommendation,
            Recommendation::None
        );
    }

    #[test]
    fn builds_geojson_from_solution() {
        let raw = json!({
            "multiDroneSolution": {
                "totalCost": 12.5,
                "totalMoves": 3,
                "dronePaths": [{
                    "droneId": "7",
                    "deliveries": [{ "deliveryId": 3, "flightPath": [{ "lng": 0.0, "lat": 0.0 }, { "lng": 1.0, "lat": 0.0 }] }]
                }]
            }
        })
        .to_string();
        let outcome = ComparisonOutcome::from_response(
            RouteComparisonResponse::from_json_str(&raw).unwrap(),
        );
        let multi = outcome.multi.unwrap();
        assert_eq!(multi.total_cost, Some(12.5));
        assert_eq!(multi.drone_count, Some(1));
        assert_eq!(crate::path::extract(&multi.result).len(), 2);
        assert!(outcome.single.is_none());
    }
}
