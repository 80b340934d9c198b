use geojson::{Feature, Geometry, Value};

use crate::wire::DeliveryPathResponse;
use crate::FlightResult;

/// One LineString per drone, joining all of its delivery legs. Each leg after the first starts
/// where the previous one ended, so that repeated point is dropped.
pub fn flight_result_from_solution(solution: &DeliveryPathResponse) -> FlightResult {
    let mut result = FlightResult::empty();
    for drone_path in &solution.drone_paths {
        let mut coordinates: Vec<Vec<f64>> = Vec::new();
        let mut delivery_ids = Vec::new();

        for delivery in &drone_path.deliveries {
            if let Some(id) = delivery.delivery_id {
                delivery_ids.push(id);
            }
            let first_leg = coordinates.is_empty();
            for (idx, pt) in delivery.flight_path.iter().enumerate() {
                if first_leg || idx > 0 {
                    coordinates.push(vec![pt.lng, pt.lat]);
                }
            }
        }

        let mut feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::LineString(coordinates))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        feature.set_property("droneId", drone_path.drone_id.clone());
        feature.set_property("deliveryIds", delivery_ids);
        // The service stamps the whole solution's totals on every drone's path
        feature.set_property("totalMoves", solution.total_moves);
        feature.set_property("totalCost", solution.total_cost);
        result.push(feature);
    }
    result
}
