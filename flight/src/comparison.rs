use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::FlightResult;

/// One of the two precomputed solutions for the same set of deliveries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RouteChoice {
    Single,
    Multi,
}

/// What the routing service suggests showing first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "SINGLE_DRONE")]
    Single,
    #[serde(rename = "MULTI_DRONE")]
    Multi,
    #[serde(rename = "NONE", other)]
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteAlternative {
    pub choice: RouteChoice,
    pub result: FlightResult,
    // Totals from the routing computation itself. Absent when the service didn't send them.
    pub total_cost: Option<f64>,
    pub total_moves: Option<usize>,
    pub drone_count: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonOutcome {
    pub single: Option<RouteAlternative>,
    pub multi: Option<RouteAlternative>,
    pub recommendation: Recommendation,
    pub reason: String,
    /// Positive means the multi-drone route is cheaper. If None, derived from the alternatives.
    pub cost_difference_percent: Option<f64>,
    /// Positive means the multi-drone route needs fewer moves.
    pub move_difference_percent: Option<f64>,
}

impl RouteChoice {
    pub const ALL: [RouteChoice; 2] = [RouteChoice::Single, RouteChoice::Multi];

    pub fn other(self) -> Self {
        match self {
            RouteChoice::Single => RouteChoice::Multi,
            RouteChoice::Multi => RouteChoice::Single,
        }
    }
}

impl fmt::Display for RouteChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RouteChoice::Single => write!(f, "single-drone"),
            RouteChoice::Multi => write!(f, "multi-drone"),
        }
    }
}

impl FromStr for RouteChoice {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        match x.trim().to_ascii_lowercase().as_str() {
            "single" | "single-drone" | "single_drone" => Ok(RouteChoice::Single),
            "multi" | "multi-drone" | "multi_drone" => Ok(RouteChoice::Multi),
            _ => bail!("Unknown route {x}; expected single or multi"),
        }
    }
}

impl Recommendation {
    pub fn choice(self) -> Option<RouteChoice> {
        match self {
            Recommendation::Single => Some(RouteChoice::Single),
            Recommendation::Multi => Some(RouteChoice::Multi),
            Recommendation::None => None,
        }
    }
}

impl RouteAlternative {
    pub fn new(choice: RouteChoice, result: FlightResult) -> Self {
        Self {
            choice,
            result,
            total_cost: None,
            total_moves: None,
            drone_count: None,
        }
    }

    /// An alternative with no features can't be shown or animated.
    pub fn is_feasible(&self) -> bool {
        !self.result.is_empty()
    }
}

impl ComparisonOutcome {
    pub fn new(
        single: Option<RouteAlternative>,
        multi: Option<RouteAlternative>,
        recommendation: Recommendation,
        reason: String,
    ) -> Self {
        Self {
            single,
            multi,
            recommendation,
            reason,
            cost_difference_percent: None,
            move_difference_percent: None,
        }
    }

    pub fn alternative(&self, choice: RouteChoice) -> Option<&RouteAlternative> {
        match choice {
            RouteChoice::Single => self.single.as_ref(),
            RouteChoice::Multi => self.multi.as_ref(),
        }
    }

    /// Present and non-empty
    pub fn feasible(&self, choice: RouteChoice) -> Option<&RouteAlternative> {
        self.alternative(choice).filter(|alt| alt.is_feasible())
    }

    pub fn cost_difference_percent(&self) -> Option<f64> {
        self.cost_difference_percent.or_else(|| {
            percent_difference(
                self.single.as_ref()?.total_cost?,
                self.multi.as_ref()?.total_cost?,
            )
        })
    }

    pub fn move_difference_percent(&self) -> Option<f64> {
        self.move_difference_percent.or_else(|| {
            percent_difference(
                self.single.as_ref()?.total_moves? as f64,
                self.multi.as_ref()?.total_moves? as f64,
            )
        })
    }

    /// Only worth a side-by-side comparison when both routes exist and the multi-drone one really
    /// uses more than one drone.
    pub fn is_meaningful(&self) -> bool {
        let multi = match self.feasible(RouteChoice::Multi) {
            Some(alt) => alt,
            None => return false,
        };
        if self.feasible(RouteChoice::Single).is_none() {
            return false;
        }
        let drones = multi.drone_count.unwrap_or_else(|| {
            multi
                .result
                .flight_features()
                .map(|(_, props)| props.drone)
                .collect::<BTreeSet<_>>()
                .len()
        });
        drones >= 2
    }

    /// Appended to the summary emailed to the user.
    pub fn recommendation_note(&self) -> Option<String> {
        let label = match self.recommendation {
            Recommendation::Single => "Single Drone",
            Recommendation::Multi => "Multi Drone",
            Recommendation::None => return None,
        };
        Some(format!(" ({label} recommended: {})", self.reason))
    }
}

fn percent_difference(single: f64, multi: f64) -> Option<f64> {
    if single == 0.0 || !single.is_finite() || !multi.is_finite() {
        return None;
    }
    Some((single - multi) / single * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Feature, Geometry, Value};

    fn flight(drone: &str) -> Feature {
        let mut feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::LineString(vec![
                vec![0.0, 0.0],
                vec![1.0, 1.0],
            ]))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        feature.set_property("droneId", drone);
        feature
    }

    fn alternative(choice: RouteChoice, drones: &[&str], cost: f64, moves: usize) -> RouteAlternative {
        let mut alt = RouteAlternative::new(
            choice,
            FlightResult::new(drones.iter().map(|d| flight(d)).collect()),
        );
        alt.total_cost = Some(cost);
        alt.total_moves = Some(moves);
        alt
    }

    #[test]
    fn derives_differences_when_missing() {
        let outcome = ComparisonOutcome::new(
            Some(alternative(RouteChoice::Single, &["1"], 80.0, 200)),
            Some(alternative(RouteChoice::Multi, &["1", "2"], 60.0, 250)),
            Recommendation::Multi,
            "Cheaper".to_string(),
        );
        assert_eq!(outcome.cost_difference_percent(), Some(25.0));
        assert_eq!(outcome.move_difference_percent(), Some(-25.0));

        let mut sent = outcome.clone();
        sent.cost_difference_percent = Some(3.0);
        assert_eq!(sent.cost_difference_percent(), Some(3.0));
    }

    #[test]
    fn no_difference_without_both_routes() {
        let outcome = ComparisonOutcome::new(
            None,
            Some(alternative(RouteChoice::Multi, &["1", "2"], 60.0, 250)),
            Recommendation::Multi,
            String::new(),
        );
        assert_eq!(outcome.cost_difference_percent(), None);
        assert!(!outcome.is_meaningful());
    }

    #[test]
    fn meaningful_needs_two_drones() {
        let mut outcome = ComparisonOutcome::new(
            Some(alternative(RouteChoice::Single, &["1"], 80.0, 200)),
            Some(alternative(RouteChoice::Multi, &["1"], 80.0, 200)),
            Recommendation::Single,
            String::new(),
        );
        assert!(!outcome.is_meaningful());
        outcome.multi = Some(alternative(RouteChoice::Multi, &["1", "3"], 60.0, 150));
        assert!(outcome.is_meaningful());
    }

    #[test]
    fn recommendation_note() {
        let mut outcome = ComparisonOutcome::new(
            None,
            None,
            Recommendation::Single,
            "Fewer moves".to_string(),
        );
        assert_eq!(
            outcome.recommendation_note().unwrap(),
            " (Single Drone recommended: Fewer moves)"
        );
        outcome.recommendation = Recommendation::None;
        assert_eq!(outcome.recommendation_note(), None);
    }

    #[test]
    fn parse_route_choice() {
        assert_eq!("Single".parse::<RouteChoice>().unwrap(), RouteChoice::Single);
        assert_eq!("multi-drone".parse::<RouteChoice>().unwrap(), RouteChoice::Multi);
        assert!("both".parse::<RouteChoice>().is_err());
    }
}
