//! Piece domain model and the static shape catalog.
//!
//! # Responsibility
//! - Define the canonical piece record placed on the board.
//! - Map every shape kind to its fixed wire code, outline and default color.
//!
//! # Invariants
//! - `id` is stable for the lifetime of a piece within one scene.
//! - The shape catalog is a closed, versionless enumeration: adding a tenth
//!   kind requires a coordinated wire-format version bump.
//! - `rotation` is plain degrees and is deliberately not normalized to
//!   [0, 360); unmutated values round-trip through persistence unchanged.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a piece inside a scene.
pub type PieceId = Uuid;

/// The nine tangram shape kinds supported by the editor.
///
/// Serialized names match the external scene schema (`squareSM` etc.); the
/// numeric wire codes are fixed by the compact share-link format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    #[serde(rename = "squareSM")]
    SquareSm,
    #[serde(rename = "squareMD")]
    SquareMd,
    #[serde(rename = "squareLG")]
    SquareLg,
    #[serde(rename = "triangleSM")]
    TriangleSm,
    #[serde(rename = "triangleMD")]
    TriangleMd,
    #[serde(rename = "triangleLG")]
    TriangleLg,
    #[serde(rename = "parallelogramA")]
    ParallelogramA,
    #[serde(rename = "parallelogramB")]
    ParallelogramB,
    #[serde(rename = "trapezoid")]
    Trapezoid,
}

impl ShapeKind {
    /// All kinds in wire-code order.
    pub const ALL: [ShapeKind; 9] = [
        ShapeKind::SquareSm,
        ShapeKind::SquareMd,
        ShapeKind::SquareLg,
        ShapeKind::TriangleSm,
        ShapeKind::TriangleMd,
        ShapeKind::TriangleLg,
        ShapeKind::ParallelogramA,
        ShapeKind::ParallelogramB,
        ShapeKind::Trapezoid,
    ];

    /// Returns the fixed integer code used by the compact wire format.
    pub fn wire_code(self) -> u8 {
        match self {
            ShapeKind::SquareSm => 0,
            ShapeKind::SquareMd => 1,
            ShapeKind::SquareLg => 2,
            ShapeKind::TriangleSm => 3,
            ShapeKind::TriangleMd => 4,
            ShapeKind::TriangleLg => 5,
            ShapeKind::ParallelogramA => 6,
            ShapeKind::ParallelogramB => 7,
            ShapeKind::Trapezoid => 8,
        }
    }

    /// Resolves a wire code back to its shape kind.
    ///
    /// Returns `None` for codes outside the closed 0..=8 table.
    pub fn from_wire_code(code: u8) -> Option<ShapeKind> {
        ShapeKind::ALL.get(usize::from(code)).copied()
    }

    /// Returns the untransformed outline polygon for this kind.
    ///
    /// Points are board units around the shape's local origin; rotation and
    /// translation are applied by callers.
    pub fn outline(self) -> &'static [(f64, f64)] {
        match self {
            ShapeKind::SquareSm => &[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0), (0.0, 50.0)],
            ShapeKind::SquareMd => &[(0.0, 0.0), (75.0, 0.0), (75.0, 75.0), (0.0, 75.0)],
            ShapeKind::SquareLg => &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            ShapeKind::TriangleSm => &[(0.0, 0.0), (50.0, 0.0), (0.0, 50.0)],
            ShapeKind::TriangleMd => &[(0.0, 0.0), (75.0, 0.0), (0.0, 75.0)],
            ShapeKind::TriangleLg => &[(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)],
            ShapeKind::ParallelogramA => {
                &[(0.0, 0.0), (75.0, 0.0), (100.0, 50.0), (25.0, 50.0)]
            }
            ShapeKind::ParallelogramB => {
                &[(25.0, 0.0), (100.0, 0.0), (75.0, 50.0), (0.0, 50.0)]
            }
            ShapeKind::Trapezoid => &[(25.0, 0.0), (75.0, 0.0), (100.0, 50.0), (0.0, 50.0)],
        }
    }

    /// Returns the fill color assigned to freshly spawned pieces.
    pub fn default_color(self) -> &'static str {
        match self {
            ShapeKind::SquareSm => "#F94144",
            ShapeKind::SquareMd => "#F3722C",
            ShapeKind::SquareLg => "#F8961E",
            ShapeKind::TriangleSm => "#F9C74F",
            ShapeKind::TriangleMd => "#90BE6D",
            ShapeKind::TriangleLg => "#43AA8B",
            ShapeKind::ParallelogramA => "#4D908E",
            ShapeKind::ParallelogramB => "#577590",
            ShapeKind::Trapezoid => "#277DA1",
        }
    }
}

/// One geometric piece placed on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    /// Stable identity within the owning scene. Not preserved across a
    /// share-link round trip: imports mint fresh IDs on purpose.
    pub id: PieceId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees, unbounded.
    pub rotation: f64,
    /// Hex or named CSS color.
    pub color: String,
}

impl Piece {
    /// Creates a piece of the given kind at a position, using the catalog's
    /// default fill color.
    pub fn new(kind: ShapeKind, x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            rotation: 0.0,
            color: kind.default_color().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ShapeKind;

    #[test]
    fn wire_codes_are_a_closed_bijection() {
        for (expected, kind) in ShapeKind::ALL.iter().enumerate() {
            assert_eq!(usize::from(kind.wire_code()), expected);
            assert_eq!(ShapeKind::from_wire_code(kind.wire_code()), Some(*kind));
        }
        assert_eq!(ShapeKind::from_wire_code(9), None);
        assert_eq!(ShapeKind::from_wire_code(255), None);
    }

    #[test]
    fn serde_names_match_external_schema() {
        let json = serde_json::to_string(&ShapeKind::SquareSm).unwrap();
        assert_eq!(json, "\"squareSM\"");
        let back: ShapeKind = serde_json::from_str("\"parallelogramB\"").unwrap();
        assert_eq!(back, ShapeKind::ParallelogramB);
    }

    #[test]
    fn every_kind_has_a_closed_outline_and_color() {
        for kind in ShapeKind::ALL {
            assert!(kind.outline().len() >= 3);
            assert!(kind.default_color().starts_with('#'));
        }
    }
}
