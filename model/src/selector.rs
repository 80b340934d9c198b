use std::collections::BTreeSet;

use flight::{
    path, ComparisonOutcome, DeliveryID, DroneID, FlightResult, RouteAlternative, RouteChoice,
    RouteError,
};
use serde::Serialize;

use crate::AnimationEngine;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteStats {
    pub total_cost: f64,
    pub total_moves: usize,
    pub drone_count: usize,
}

/// Drones and deliveries a route refers to, deduplicated, in order of first appearance.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Entities {
    pub drones: Vec<DroneID>,
    pub deliveries: Vec<DeliveryID>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteSummary {
    pub choice: RouteChoice,
    pub recommended: bool,
    pub stats: RouteStats,
    pub entities: Entities,
}

/// Owns the latest comparison and which of its routes is showing. Whenever the active route
/// changes, its waypoints are loaded into the animation engine.
#[derive(Default)]
pub struct RouteSelector {
    outcome: Option<ComparisonOutcome>,
    active: Option<RouteChoice>,
    entities: Entities,
}

/// The recommended route if it's feasible, otherwise whichever route is, preferring the
/// single-drone one.
pub fn select_default(
    outcome: &ComparisonOutcome,
) -> Result<(RouteChoice, &FlightResult), RouteError> {
    let preference = outcome
        .recommendation
        .choice()
        .into_iter()
        .chain([RouteChoice::Single, RouteChoice::Multi]);
    for choice in preference {
        if let Some(alt) = outcome.feasible(choice) {
            return Ok((choice, &alt.result));
        }
    }
    Err(RouteError::EmptyComparison)
}

pub fn select_alternative(
    outcome: &ComparisonOutcome,
    choice: RouteChoice,
) -> Result<&FlightResult, RouteError> {
    outcome
        .feasible(choice)
        .map(|alt| &alt.result)
        .ok_or(RouteError::AlternativeInfeasible(choice))
}

/// Totals from the routing computation win. Only the missing ones are estimated from the flight
/// path features, and the two sources are never cross-checked.
pub fn resolve_stats(alt: &RouteAlternative) -> RouteStats {
    if let (Some(total_cost), Some(total_moves), Some(drone_count)) =
        (alt.total_cost, alt.total_moves, alt.drone_count)
    {
        return RouteStats {
            total_cost,
            total_moves,
            drone_count,
        };
    }

    let mut cost = 0.0;
    let mut moves = 0;
    let mut drones = BTreeSet::new();
    for (_, props) in alt.result.flight_features() {
        cost += props.total_cost.unwrap_or(0.0);
        moves += props.total_moves.unwrap_or(0);
        drones.insert(props.drone);
    }

    RouteStats {
        total_cost: alt.total_cost.unwrap_or(cost),
        total_moves: alt.total_moves.unwrap_or(moves),
        drone_count: alt.drone_count.unwrap_or(drones.len()),
    }
}

pub fn referenced_entities(result: &FlightResult) -> Entities {
    let mut entities = Entities::default();
    for (_, props) in result.flight_features() {
        if !entities.drones.contains(&props.drone) {
            entities.drones.push(props.drone);
        }
        for id in props.deliveries {
            if !entities.deliveries.contains(&id) {
                entities.deliveries.push(id);
            }
        }
    }
    entities
}

impl RouteSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a newly computed comparison and shows its default route. If neither route is
    /// feasible, the engine is emptied and nothing is active.
    pub fn on_comparison(
        &mut self,
        outcome: ComparisonOutcome,
        engine: &mut AnimationEngine,
    ) -> Result<RouteChoice, RouteError> {
        let default = select_default(&outcome).map(|(choice, _)| choice);
        self.outcome = Some(outcome);
        self.active = None;
        match default {
            Ok(choice) => {
                info!("Showing the {choice} route by default");
                self.activate(choice, engine);
                Ok(choice)
            }
            Err(err) => {
                warn!("Comparison has no feasible route");
                self.entities = Entities::default();
                engine.clear();
                Err(err)
            }
        }
    }

    /// Switching to an infeasible route changes nothing. Re-selecting the active route doesn't
    /// restart its animation.
    pub fn select(
        &mut self,
        choice: RouteChoice,
        engine: &mut AnimationEngine,
    ) -> Result<(), RouteError> {
        let feasible = self
            .outcome
            .as_ref()
            .map(|outcome| select_alternative(outcome, choice).is_ok())
            .unwrap_or(false);
        if !feasible {
            warn!("Can't switch to the {choice} route");
            return Err(RouteError::AlternativeInfeasible(choice));
        }
        if self.active == Some(choice) {
            return Ok(());
        }
        info!("Switching to the {choice} route");
        self.activate(choice, engine);
        Ok(())
    }

    pub fn clear(&mut self, engine: &mut AnimationEngine) {
        self.outcome = None;
        self.active = None;
        self.entities = Entities::default();
        engine.clear();
    }

    pub fn is_selectable(&self, choice: RouteChoice) -> bool {
        self.outcome
            .as_ref()
            .map(|outcome| outcome.feasible(choice).is_some())
            .unwrap_or(false)
    }

    pub fn outcome(&self) -> Option<&ComparisonOutcome> {
        self.outcome.as_ref()
    }

    pub fn active(&self) -> Option<RouteChoice> {
        self.active
    }

    pub fn active_alternative(&self) -> Option<&RouteAlternative> {
        self.outcome.as_ref()?.alternative(self.active?)
    }

    pub fn stats(&self) -> Option<RouteStats> {
        self.active_alternative().map(resolve_stats)
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn summary(&self) -> Option<RouteSummary> {
        let alt = self.active_alternative()?;
        let recommended = self
            .outcome
            .as_ref()
            .and_then(|outcome| outcome.recommendation.choice())
            == Some(alt.choice);
        Some(RouteSummary {
            choice: alt.choice,
            recommended,
            stats: resolve_stats(alt),
            entities: self.entities.clone(),
        })
    }

    // Callers have checked the route is feasible
    fn activate(&mut self, choice: RouteChoice, engine: &mut AnimationEngine) {
        let result = match self.outcome.as_ref().and_then(|o| o.feasible(choice)) {
            Some(alt) => &alt.result,
            None => return,
        };
        let waypoints = path::extract(result);
        if waypoints.is_empty() {
            warn!("The {choice} route has no drone flight path to animate");
        }
        self.entities = referenced_entities(result);
        engine.load(waypoints);
        self.active = Some(choice);
        debug!(
            "{} drones and {} deliveries on the {choice} route",
            self.entities.drones.len(),
            self.entities.deliveries.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flight::{GeoPoint, Recommendation};
    use geojson::{Feature, Geometry, Value};

    fn flight(drone: &str, deliveries: &[u64], coords: &[(f64, f64)]) -> Feature {
        let mut feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::LineString(
                coords.iter().map(|(x, y)| vec![*x, *y]).collect(),
            ))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        feature.set_property("droneId", drone);
        feature.set_property("deliveryIds", deliveries.to_vec());
        feature.set_property("totalMoves", 10);
        feature.set_property("totalCost", 25.0);
        feature
    }

    #[test]
    fn stats_fall_back_per_field() {
        let mut alt = RouteAlternative::new(
            RouteChoice::Multi,
            FlightResult::new(vec![
                flight("1", &[1], &[(0.0, 0.0), (1.0, 1.0)]),
                flight("2", &[2], &[(0.0, 0.0), (2.0, 2.0)]),
                flight("1", &[3], &[(1.0, 1.0), (0.0, 0.0)]),
            ]),
        );
        assert_eq!(
            resolve_stats(&alt),
            RouteStats {
                total_cost: 75.0,
                total_moves: 30,
                drone_count: 2,
            }
        );

        alt.total_cost = Some(40.0);
        alt.drone_count = Some(5);
        assert_eq!(
            resolve_stats(&alt),
            RouteStats {
                total_cost: 40.0,
                total_moves: 30,
                drone_count: 5,
            }
        );
    }

    #[test]
    fn entities_keep_first_appearance_order() {
        let result = FlightResult::new(vec![
            flight("9", &[4, 2], &[(0.0, 0.0)]),
            flight("3", &[2, 7], &[(0.0, 0.0)]),
            flight("9", &[1], &[(0.0, 0.0)]),
        ]);
        let entities = referenced_entities(&result);
        assert_eq!(
            entities.drones,
            vec![DroneID("9".to_string()), DroneID("3".to_string())]
        );
        assert_eq!(
            entities.deliveries,
            vec![DeliveryID(4), DeliveryID(2), DeliveryID(7), DeliveryID(1)]
        );
    }

    #[test]
    fn no_recommendation_prefers_single() {
        let outcome = ComparisonOutcome::new(
            Some(RouteAlternative::new(
                RouteChoice::Single,
                FlightResult::new(vec![flight("1", &[1], &[(0.0, 0.0)])]),
            )),
            Some(RouteAlternative::new(
                RouteChoice::Multi,
                FlightResult::new(vec![flight("2", &[1], &[(5.0, 5.0)])]),
            )),
            Recommendation::None,
            String::new(),
        );
        let (choice, _) = select_default(&outcome).unwrap();
        assert_eq!(choice, RouteChoice::Single);
    }

    #[test]
    fn recommended_but_empty_falls_back() {
        let outcome = ComparisonOutcome::new(
            Some(RouteAlternative::new(
                RouteChoice::Single,
                FlightResult::new(vec![flight("1", &[1], &[(0.0, 0.0)])]),
            )),
            Some(RouteAlternative::new(RouteChoice::Multi, FlightResult::empty())),
            Recommendation::Multi,
            String::new(),
        );
        assert_eq!(select_default(&outcome).unwrap().0, RouteChoice::Single);
        assert_eq!(
            select_alternative(&outcome, RouteChoice::Multi),
            Err(RouteError::AlternativeInfeasible(RouteChoice::Multi))
        );
    }

    #[test]
    fn feasible_route_without_flights_empties_the_engine() {
        let mut marker = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![0.0, 0.0]))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        marker.set_property("type", "deliveryPoint");
        let outcome = ComparisonOutcome::new(
            Some(RouteAlternative::new(
                RouteChoice::Single,
                FlightResult::new(vec![marker]),
            )),
            None,
            Recommendation::Single,
            String::new(),
        );

        let mut engine = AnimationEngine::new();
        engine.load(vec![GeoPoint::new(1.0, 1.0)]);
        let mut selector = RouteSelector::new();
        assert_eq!(
            selector.on_comparison(outcome, &mut engine),
            Ok(RouteChoice::Single)
        );
        assert!(engine.is_empty());
        assert_eq!(selector.entities(), &Entities::default());
    }
}
