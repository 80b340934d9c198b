use std::fmt;

use serde::{Deserialize, Serialize};

/// The playback speeds offered to the user. The engine accepts any positive multiplier; this is
/// just the set the controls step through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpeedSetting {
    /// One waypoint every 200ms
    Half,
    /// One waypoint every base interval
    Normal,
    Double,
    Quadruple,
    /// One waypoint every 12.5ms
    Octuple,
}

impl SpeedSetting {
    pub const ALL: [SpeedSetting; 5] = [
        SpeedSetting::Half,
        SpeedSetting::Normal,
        SpeedSetting::Double,
        SpeedSetting::Quadruple,
        SpeedSetting::Octuple,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            SpeedSetting::Half => 0.5,
            SpeedSetting::Normal => 1.0,
            SpeedSetting::Double => 2.0,
            SpeedSetting::Quadruple => 4.0,
            SpeedSetting::Octuple => 8.0,
        }
    }

    /// Only exact matches
    pub fn from_multiplier(multiplier: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.multiplier() == multiplier)
    }

    /// Stays put at the fastest setting
    pub fn faster(self) -> Self {
        match self {
            SpeedSetting::Half => SpeedSetting::Normal,
            SpeedSetting::Normal => SpeedSetting::Double,
            SpeedSetting::Double => SpeedSetting::Quadruple,
            SpeedSetting::Quadruple | SpeedSetting::Octuple => SpeedSetting::Octuple,
        }
    }

    pub fn slower(self) -> Self {
        match self {
            SpeedSetting::Half | SpeedSetting::Normal => SpeedSetting::Half,
            SpeedSetting::Double => SpeedSetting::Normal,
            SpeedSetting::Quadruple => SpeedSetting::Double,
            SpeedSetting::Octuple => SpeedSetting::Quadruple,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedSetting::Half => "0.5x speed",
            SpeedSetting::Normal => "1x speed",
            SpeedSetting::Double => "2x speed",
            SpeedSetting::Quadruple => "4x speed",
            SpeedSetting::Octuple => "8x speed",
        }
    }
}

impl Default for SpeedSetting {
    fn default() -> Self {
        SpeedSetting::Normal
    }
}

impl fmt::Display for SpeedSetting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
