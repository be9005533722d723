//! Roads returned for a single query and the indicators shown for them
use std::fmt;

use itertools::Itertools;

/// A coordinate moved by the mapping service onto the nearest known road segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnappedPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for SnappedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug keeps the `.0` of whole degrees
        write!(f, "{:?}, {:?}", self.latitude, self.longitude)
    }
}

/// Single letter naming a road by the position it was returned in.
///
/// Only meaningful within one query, the next query hands out the same letters again.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RoadLabel(char);

impl RoadLabel {
    /// One road per letter of the alphabet
    pub const MAX_ROADS: usize = 26;

    pub fn from_position(position: usize) -> Option<Self> {
        if position >= Self::MAX_ROADS {
            return None;
        }

        Some(RoadLabel(char::from(b'A' + position as u8)))
    }

    pub fn letter(self) -> char {
        self.0
    }

    /// Color shown on the road's traffic light.
    ///
    /// Decided by the letter alone, the measured traffic plays no part in it.
    pub fn light_color(self) -> LightColor {
        match self.0 {
            'A' => LightColor::Green,
            'B' => LightColor::Red,
            'C' => LightColor::Yellow,
            _ => LightColor::Red,
        }
    }
}

impl fmt::Display for RoadLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Labels `A`, `B`, `C`, ... in the order the roads were returned.
/// Callers keep at most [`RoadLabel::MAX_ROADS`] roads so every road gets one.
pub fn label_roads(points: &[SnappedPoint]) -> Vec<RoadLabel> {
    (0..points.len())
        .map_while(RoadLabel::from_position)
        .collect_vec()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightColor {
    Red,
    Yellow,
    Green,
}

impl LightColor {
    /// Lamps of a traffic light from top to bottom
    pub const LAMP_ORDER: [LightColor; 3] = [LightColor::Red, LightColor::Yellow, LightColor::Green];

    pub fn name(self) -> &'static str {
        match self {
            LightColor::Red => "red",
            LightColor::Yellow => "yellow",
            LightColor::Green => "green",
        }
    }
}
