// Core types shared across the simulation.
//
// Defines the grid coordinate (`Coordinate`), the runtime entity identifier
// (`Uid`), and the vertical map partition (`Layer`). All types are plain
// values: cheap to copy, totally ordered, and serde-serializable so they can
// appear in dumped records and as `BTreeMap` keys.
//
// `Coordinate` serializes as its `"x y"` text form rather than as a struct so
// that it can key JSON objects (serde_json requires string keys). On input it
// also accepts `{"x": .., "y": ..}` and `[x, y]`, which is how prototype
// files written by hand tend to spell positions.
//
// See also: `shape.rs` for footprints built from coordinates, `map.rs` which
// keys its layer indices by `Coordinate`, `factory.rs` which hands out `Uid`s.
//
// **Critical constraint: determinism.** Coordinates and uids are ordered
// keys in every iterated collection. Their `Ord` impls define the iteration
// order of the whole map and must not change.

use crate::error::{Result, SimError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A cell of the integer map grid.
///
/// Ordered by `x`, then `y`. All arithmetic returns a new value. The
/// operators overflow like plain `i32`; the map goes through `checked_add` /
/// `checked_sub` wherever a value comes from outside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

/// Offsets of the eight cells around a coordinate: orthogonal first, then
/// diagonal.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two coordinates.
    pub fn distance(a: Self, b: Self) -> f64 {
        a.distance_to(b)
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Number of king moves between two cells (diagonal steps count as one).
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x
            .abs_diff(other.x)
            .max(self.y.abs_diff(other.y))
    }

    /// The 8-connected neighborhood of this cell. Cells past the edge of the
    /// `i32` grid are left out, so a corner cell has three neighbors.
    pub fn neighbors(self) -> impl Iterator<Item = Coordinate> {
        NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| self.checked_add(Coordinate::new(dx, dy)))
    }

    /// `self + rhs`, or `None` if either axis leaves the grid.
    pub fn checked_add(self, rhs: Coordinate) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(rhs.x)?,
            self.y.checked_add(rhs.y)?,
        ))
    }

    /// `self - rhs`, or `None` if either axis leaves the grid.
    pub fn checked_sub(self, rhs: Coordinate) -> Option<Self> {
        Some(Self::new(
            self.x.checked_sub(rhs.x)?,
            self.y.checked_sub(rhs.y)?,
        ))
    }

    /// Integer division of both axes by `divisor`, truncating toward zero.
    pub fn checked_div(self, divisor: i32) -> Result<Self> {
        if divisor == 0 {
            return Err(SimError::DivisionByZero);
        }
        Ok(Self::new(self.x / divisor, self.y / divisor))
    }

    pub fn to_tuple(self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn from_tuple((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Coordinate {
    type Output = Coordinate;

    fn add(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Add<i32> for Coordinate {
    type Output = Coordinate;

    fn add(self, rhs: i32) -> Coordinate {
        Coordinate::new(self.x + rhs, self.y + rhs)
    }
}

impl Sub for Coordinate {
    type Output = Coordinate;

    fn sub(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub<i32> for Coordinate {
    type Output = Coordinate;

    fn sub(self, rhs: i32) -> Coordinate {
        Coordinate::new(self.x - rhs, self.y - rhs)
    }
}

impl Mul<i32> for Coordinate {
    type Output = Coordinate;

    fn mul(self, rhs: i32) -> Coordinate {
        Coordinate::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Coordinate {
    type Output = Coordinate;

    fn neg(self) -> Coordinate {
        Coordinate::new(-self.x, -self.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

impl FromStr for Coordinate {
    type Err = SimError;

    /// Parses two whitespace-separated integers, e.g. `"3 -4"`.
    fn from_str(s: &str) -> Result<Self> {
        let parse_err = |reason: &str| SimError::Parse {
            input: s.to_owned(),
            reason: reason.to_owned(),
        };
        let mut parts = s.split_whitespace();
        let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(parse_err("expected exactly two integers"));
        };
        let x = x.parse().map_err(|_| parse_err("x is not an integer"))?;
        let y = y.parse().map_err(|_| parse_err("y is not an integer"))?;
        Ok(Self::new(x, y))
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepted input spellings for a coordinate.
#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinateRepr {
    Text(String),
    Fields { x: i32, y: i32 },
    Pair(i32, i32),
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match CoordinateRepr::deserialize(deserializer)? {
            CoordinateRepr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            CoordinateRepr::Fields { x, y } | CoordinateRepr::Pair(x, y) => Ok(Self::new(x, y)),
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime identity
// ---------------------------------------------------------------------------

/// Runtime-unique entity identifier handed out by the `Factory`.
///
/// Distinct from an entity's designer-assigned `id`, which is shared by every
/// clone of the same prototype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(pub u64);

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uid {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim().parse().map(Uid).map_err(|_| SimError::Parse {
            input: s.to_owned(),
            reason: "uid is not an unsigned integer".to_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Map layers
// ---------------------------------------------------------------------------

/// Vertical partition of the map. Serialized as its integer code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Layer {
    /// Ground decals, spills, rugs.
    Floor,
    /// Walls, furniture, creatures.
    #[default]
    Main,
    /// Roofing; used to reason about enclosed rooms.
    Ceiling,
}

impl Layer {
    /// All layers in scan order.
    pub const ALL: [Layer; 3] = [Layer::Floor, Layer::Main, Layer::Ceiling];
}

impl TryFrom<u8> for Layer {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, String> {
        match code {
            0 => Ok(Layer::Floor),
            1 => Ok(Layer::Main),
            2 => Ok(Layer::Ceiling),
            other => Err(format!("layer must be 0, 1 or 2, got {other}")),
        }
    }
}

impl From<Layer> for u8 {
    fn from(layer: Layer) -> u8 {
        match layer {
            Layer::Floor => 0,
            Layer::Main => 1,
            Layer::Ceiling => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_coords() -> Vec<Coordinate> {
        let mut coords = Vec::new();
        for x in -3..=3 {
            for y in [-7, -1, 0, 2, 11] {
                coords.push(Coordinate::new(x * 5, y));
            }
        }
        coords
    }

    #[test]
    fn distance_is_symmetric() {
        let coords = sample_coords();
        for &a in &coords {
            for &b in &coords {
                assert_eq!(Coordinate::distance(a, b), Coordinate::distance(b, a));
            }
        }
    }

    #[test]
    fn add_then_sub_is_identity() {
        let coords = sample_coords();
        for &a in &coords {
            for &b in &coords {
                assert_eq!(a + b - b, a);
            }
        }
    }

    #[test]
    fn string_roundtrip() {
        for a in sample_coords() {
            let text = a.to_string();
            assert_eq!(text.parse::<Coordinate>().unwrap(), a);
        }
    }

    #[test]
    fn display_format() {
        assert_eq!(Coordinate::new(3, -4).to_string(), "3 -4");
    }

    #[test]
    fn parse_tolerates_extra_whitespace() {
        assert_eq!(
            "  7 \t 8 ".parse::<Coordinate>().unwrap(),
            Coordinate::new(7, 8)
        );
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for bad in ["", "1", "1 2 3", "a 2", "1 b", "1.5 2"] {
            let err = bad.parse::<Coordinate>().unwrap_err();
            assert!(matches!(err, SimError::Parse { .. }), "input {bad:?}");
        }
    }

    #[test]
    fn euclidean_distance() {
        let a = Coordinate::new(0, 0);
        let b = Coordinate::new(3, 4);
        assert_eq!(a.distance_to(b), 5.0);
    }

    #[test]
    fn chebyshev_distance_counts_diagonals_once() {
        let a = Coordinate::new(0, 0);
        assert_eq!(a.chebyshev_distance(Coordinate::new(3, 4)), 4);
        assert_eq!(a.chebyshev_distance(Coordinate::new(-5, 2)), 5);
    }

    #[test]
    fn scalar_arithmetic() {
        let c = Coordinate::new(4, -6);
        assert_eq!(c + 1, Coordinate::new(5, -5));
        assert_eq!(c - 2, Coordinate::new(2, -8));
        assert_eq!(c * 3, Coordinate::new(12, -18));
        assert_eq!(c.checked_div(2).unwrap(), Coordinate::new(2, -3));
        assert_eq!(-c, Coordinate::new(-4, 6));
    }

    #[test]
    fn divide_by_zero_fails() {
        let err = Coordinate::new(1, 1).checked_div(0).unwrap_err();
        assert!(matches!(err, SimError::DivisionByZero));
    }

    #[test]
    fn ordering_is_x_then_y() {
        assert!(Coordinate::new(0, 9) < Coordinate::new(1, 0));
        assert!(Coordinate::new(1, 0) < Coordinate::new(1, 1));
        let mut coords = vec![
            Coordinate::new(2, 0),
            Coordinate::new(1, 5),
            Coordinate::new(1, -5),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![
                Coordinate::new(1, -5),
                Coordinate::new(1, 5),
                Coordinate::new(2, 0)
            ]
        );
    }

    #[test]
    fn neighbors_are_all_adjacent() {
        let c = Coordinate::new(10, -3);
        let neighbors: Vec<Coordinate> = c.neighbors().collect();
        for &n in &neighbors {
            assert_eq!(c.chebyshev_distance(n), 1);
        }
        let mut unique = neighbors.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn neighbors_stop_at_the_grid_edge() {
        let corner = Coordinate::new(i32::MAX, i32::MIN);
        let neighbors: Vec<Coordinate> = corner.neighbors().collect();
        assert_eq!(neighbors.len(), 3);
        assert!(neighbors.contains(&Coordinate::new(i32::MAX - 1, i32::MIN + 1)));

        let edge = Coordinate::new(0, i32::MAX);
        assert_eq!(edge.neighbors().count(), 5);
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let c = Coordinate::new(0, i32::MAX);
        assert_eq!(c.checked_add(Coordinate::new(1, 0)), Some(Coordinate::new(1, i32::MAX)));
        assert_eq!(c.checked_add(Coordinate::new(0, 1)), None);
        assert_eq!(
            Coordinate::new(i32::MIN, 0).checked_sub(Coordinate::new(1, 0)),
            None
        );
        assert_eq!(
            Coordinate::new(3, 4).checked_sub(Coordinate::new(1, 1)),
            Some(Coordinate::new(2, 3))
        );
    }

    #[test]
    fn coordinate_serializes_as_text() {
        let json = serde_json::to_string(&Coordinate::new(-2, 5)).unwrap();
        assert_eq!(json, "\"-2 5\"");
    }

    #[test]
    fn coordinate_accepts_alternate_spellings() {
        let from_text: Coordinate = serde_json::from_str("\"1 2\"").unwrap();
        let from_fields: Coordinate = serde_json::from_str(r#"{"x": 1, "y": 2}"#).unwrap();
        let from_pair: Coordinate = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(from_text, Coordinate::new(1, 2));
        assert_eq!(from_fields, from_text);
        assert_eq!(from_pair, from_text);
        assert!(serde_json::from_str::<Coordinate>("\"1\"").is_err());
    }

    #[test]
    fn layer_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Layer::Ceiling).unwrap(), "2");
        let floor: Layer = serde_json::from_str("0").unwrap();
        assert_eq!(floor, Layer::Floor);
        assert!(serde_json::from_str::<Layer>("3").is_err());
    }

    #[test]
    fn default_layer_is_main() {
        assert_eq!(Layer::default(), Layer::Main);
    }

    #[test]
    fn uid_parse_and_display() {
        let uid: Uid = "42".parse().unwrap();
        assert_eq!(uid, Uid(42));
        assert_eq!(uid.to_string(), "42");
        assert!("-1".parse::<Uid>().is_err());
    }
}
