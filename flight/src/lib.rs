#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod comparison;
mod delivery;
mod ids;
pub mod path;
mod result;
pub mod wire;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use comparison::{ComparisonOutcome, Recommendation, RouteAlternative, RouteChoice};
pub use delivery::flight_result_from_solution;
pub use ids::{DeliveryID, DroneID};
pub use result::{FlightProperties, FlightResult};

/// A longitude/latitude pair. Ranges aren't checked; callers are expected to pass sane values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lng, self.lat)
    }
}

/// Recoverable conditions reported by route selection and path extraction. None of these are
/// fatal; callers render them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("the result has no drone flight path")]
    NoFlightPath,
    #[error("the {0} route isn't feasible")]
    AlternativeInfeasible(RouteChoice),
    #[error("no solution found")]
    EmptyComparison,
}
