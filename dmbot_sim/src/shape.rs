// ASCII footprint patterns.
//
// A `Shape` is a small picture of the cells an object covers, written the way
// designers type it into prototype files:
//
//   xxx
//   x x
//   xxx
//
// Every character other than a space becomes a relative `Coordinate(row, col)`
// (row on the x axis, column on the y axis). Lines are split on `\n`, trailing
// whitespace (including a `\r`) is ignored, and row/column indices are taken
// from the text as written, so leading spaces and blank lines shift the
// footprint.
//
// See also: `components.rs` for `ShapeComponent`, `map.rs` which turns a
// shape plus an anchor into absolute footprint coordinates.

use crate::types::Coordinate;
use serde::{Deserialize, Serialize};

/// A parsed footprint pattern. Equal iff the source text is equal.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Shape {
    pattern: String,
    cells: Vec<Coordinate>,
}

impl Shape {
    /// Parse a pattern. Never fails; a pattern with no glyphs has an empty
    /// footprint.
    pub fn parse(pattern: &str) -> Self {
        let mut cells = Vec::new();
        for (row, line) in pattern.split('\n').enumerate() {
            for (col, ch) in line.trim_end().chars().enumerate() {
                if ch != ' ' {
                    cells.push(Coordinate::new(row as i32, col as i32));
                }
            }
        }
        Self {
            pattern: pattern.to_owned(),
            cells,
        }
    }

    /// The one-cell shape used for objects that declare none.
    pub fn single() -> Self {
        Self::parse("x")
    }

    /// Relative offsets covered by this shape, in reading order.
    pub fn footprint(&self) -> &[Coordinate] {
        &self.cells
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::single()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for Shape {}

impl From<String> for Shape {
    fn from(pattern: String) -> Self {
        Self::parse(&pattern)
    }
}

impl From<Shape> for String {
    fn from(shape: Shape) -> String {
        shape.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cell() {
        assert_eq!(Shape::single().footprint(), &[Coordinate::ORIGIN]);
    }

    #[test]
    fn ring_has_no_center() {
        let ring = Shape::parse("xxx\nx x\nxxx");
        assert_eq!(ring.footprint().len(), 8);
        assert!(!ring.footprint().contains(&Coordinate::new(1, 1)));
        assert!(ring.footprint().contains(&Coordinate::new(2, 2)));
    }

    #[test]
    fn one_entry_per_glyph_at_row_and_column() {
        let pattern = " ab\n\nc  d\n  e";
        let shape = Shape::parse(pattern);
        let mut expected = Vec::new();
        for (row, line) in pattern.split('\n').enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch != ' ' {
                    expected.push(Coordinate::new(row as i32, col as i32));
                }
            }
        }
        assert_eq!(shape.footprint(), expected.as_slice());
        assert_eq!(shape.footprint().len(), 5);
    }

    #[test]
    fn trailing_whitespace_is_ignored() {
        let shape = Shape::parse("xx  \r\nx\t\n");
        assert_eq!(
            shape.footprint(),
            &[
                Coordinate::new(0, 0),
                Coordinate::new(0, 1),
                Coordinate::new(1, 0)
            ]
        );
    }

    #[test]
    fn empty_pattern_has_empty_footprint() {
        assert!(Shape::parse("").is_empty());
        assert!(Shape::parse("   \n  ").is_empty());
    }

    #[test]
    fn equality_follows_source_text() {
        assert_eq!(Shape::parse("xx"), Shape::parse("xx"));
        // Same cells, different glyphs: still different shapes.
        assert_ne!(Shape::parse("xx"), Shape::parse("##"));
    }

    #[test]
    fn serializes_as_pattern_text() {
        let shape = Shape::parse("x\nx");
        let json = serde_json::to_string(&shape).unwrap();
        assert_eq!(json, "\"x\\nx\"");
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back.footprint(), shape.footprint());
    }
}
