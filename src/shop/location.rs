use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of one physical sign: dimension plus block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationKey {
    pub dimension: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl LocationKey {
    pub const fn new(dimension: i32, x: i32, y: i32, z: i32) -> Self {
        Self { dimension, x, y, z }
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{},{}", self.dimension, self.x, self.y, self.z)
    }
}
