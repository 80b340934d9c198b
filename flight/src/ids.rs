use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The routing service identifies drones by string, but some payloads carry them as numbers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DroneID(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeliveryID(pub u64);

impl DroneID {
    /// None for JSON null, booleans, arrays, and objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(x) => Some(Self(x.clone())),
            Value::Number(x) => Some(Self(x.to_string())),
            _ => None,
        }
    }
}

impl DeliveryID {
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(x) => x.as_u64().map(Self),
            Value::String(x) => x.trim().parse().ok().map(Self),
            _ => None,
        }
    }
}

impl fmt::Display for DroneID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "drone {}", self.0)
    }
}

impl fmt::Display for DeliveryID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "delivery #{}", self.0)
    }
}
