use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson};
use serde::{Deserialize, Serialize};

use crate::{DeliveryID, DroneID};

/// The GeoJSON features the routing service returns for one route alternative. Feature order is
/// meaningful: drone flight paths are listed in the order they're flown.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FeatureCollection", into = "FeatureCollection")]
pub struct FlightResult {
    features: Vec<Feature>,
}

/// The properties the routing service attaches to a drone's flight path. Service points,
/// delivery markers, and restricted areas don't have these.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightProperties {
    pub drone: DroneID,
    pub deliveries: Vec<DeliveryID>,
    pub total_moves: Option<usize>,
    pub total_cost: Option<f64>,
}

impl FlightResult {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_geojson_str(raw: &str) -> Result<Self> {
        match raw.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(fc) => Ok(fc.into()),
            GeoJson::Feature(feature) => Ok(Self::new(vec![feature])),
            GeoJson::Geometry(_) => bail!("Expected a FeatureCollection, got a bare Geometry"),
        }
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        let fc: FeatureCollection = self.clone().into();
        Ok(serde_json::to_string(&GeoJson::FeatureCollection(fc))?)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Every feature belonging to a drone's flight, in order, with its parsed properties. The
    /// geometry isn't checked here.
    pub fn flight_features(&self) -> impl Iterator<Item = (&Feature, FlightProperties)> + '_ {
        self.features
            .iter()
            .filter_map(|f| FlightProperties::of(f).map(|props| (f, props)))
    }
}

impl From<FeatureCollection> for FlightResult {
    fn from(fc: FeatureCollection) -> Self {
        Self::new(fc.features)
    }
}

impl From<FlightResult> for FeatureCollection {
    fn from(result: FlightResult) -> Self {
        FeatureCollection {
            bbox: None,
            features: result.features,
            foreign_members: None,
        }
    }
}

impl FlightProperties {
    /// None if the feature has no drone identifier.
    pub fn of(feature: &Feature) -> Option<Self> {
        let drone = DroneID::from_json(feature.property("droneId")?)?;

        let mut deliveries = Vec::new();
        if let Some(serde_json::Value::Array(list)) = feature.property("deliveryIds") {
            for value in list {
                match DeliveryID::from_json(value) {
                    Some(id) => deliveries.push(id),
                    None => warn!("Ignoring malformed delivery ID {value} on {drone}"),
                }
            }
        }

        let total_moves = feature
            .property("totalMoves")
            .and_then(|x| x.as_u64())
            .map(|x| x as usize);
        let total_cost = feature
            .property("totalCost")
            .and_then(|x| x.as_f64())
            .filter(|x| x.is_finite());

        Some(Self {
            drone,
            deliveries,
            total_moves,
            total_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_service_output() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-3.1863, 55.9445] },
                    "properties": { "droneId": null, "name": "Appleton Tower", "type": "servicePoint" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": [[-3.1863, 55.9445], [-3.1870, 55.9450]] },
                    "properties": { "droneId": "4", "deliveryIds": [1, 2], "totalMoves": 12, "totalCost": 31.5 }
                }
            ]
        })
        .to_string();

        let result = FlightResult::from_geojson_str(&raw).unwrap();
        assert_eq!(result.features().len(), 2);

        let flights: Vec<FlightProperties> = result.flight_features().map(|(_, p)| p).collect();
        assert_eq!(
            flights,
            vec![FlightProperties {
                drone: DroneID("4".to_string()),
                deliveries: vec![DeliveryID(1), DeliveryID(2)],
                total_moves: Some(12),
                total_cost: Some(31.5),
            }]
        );
    }

    #[test]
    fn bare_geometry_is_rejected() {
        let raw = json!({ "type": "Point", "coordinates": [0.0, 0.0] }).to_string();
        assert!(FlightResult::from_geojson_str(&raw).is_err());
    }

    #[test]
    fn serializes_as_feature_collection() {
        let value = serde_json::to_value(FlightResult::empty()).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"], json!([]));
    }
}
