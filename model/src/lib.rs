#[macro_use]
extern crate log;

mod animation;
mod clock;
mod selector;
mod speed;

pub use self::animation::{AnimationEngine, Frame, Playback, BASE_INTERVAL};
pub use self::clock::TickToken;
pub use self::selector::{
    referenced_entities, resolve_stats, select_alternative, select_default, Entities,
    RouteSelector, RouteStats, RouteSummary,
};
pub use self::speed::SpeedSetting;
