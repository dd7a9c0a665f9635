//! Pieces module - rotation bitmasks and the piece catalog
//!
//! A rotation is a small stack of row bitmasks (bottom to top) aligned to the
//! left edge of the board. Horizontal offsets are produced by shifting every
//! row right, so enumerating placements never allocates.
//!
//! Shapes are described as text, top row first, `'1'` for a filled cell:
//!
//! ```text
//! 010
//! 111
//! ```

use std::fs;
use std::path::Path;

use arrayvec::ArrayVec;
use log::debug;

use crate::error::CatalogError;
use crate::types::{PieceId, Row, BOARD_WIDTH, MAX_PIECE_HEIGHT};

/// One orientation of a piece at one horizontal offset
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PieceRotation {
    /// Row masks, bottom to top
    rows: ArrayVec<Row, MAX_PIECE_HEIGHT>,
    width: usize,
}

impl PieceRotation {
    /// Parse a rotation from text rows (top row first).
    ///
    /// `origin` names the shape in error messages (usually a file path).
    pub fn parse(text: &str, origin: &str) -> Result<Self, CatalogError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            return Err(CatalogError::EmptyShape {
                origin: origin.to_string(),
            });
        };

        let width = first.len();
        if width == 0 || width > BOARD_WIDTH {
            return Err(CatalogError::TooWide {
                origin: origin.to_string(),
                width,
            });
        }
        if lines.len() > MAX_PIECE_HEIGHT {
            return Err(CatalogError::TooTall {
                origin: origin.to_string(),
                height: lines.len(),
            });
        }

        let mut rows = ArrayVec::new();
        for (line_no, line) in lines.iter().enumerate().rev() {
            if line.len() != width {
                return Err(CatalogError::RaggedShape {
                    origin: origin.to_string(),
                    line: line_no + 1,
                });
            }
            let mut row: Row = 0;
            for (x, ch) in line.chars().enumerate() {
                match ch {
                    '1' => row |= 1 << (BOARD_WIDTH - 1 - x),
                    '0' => {}
                    other => {
                        return Err(CatalogError::InvalidCell {
                            origin: origin.to_string(),
                            line: line_no + 1,
                            found: other,
                        })
                    }
                }
            }
            rows.push(row);
        }

        if rows.iter().all(|row| *row == 0) {
            return Err(CatalogError::EmptyShape {
                origin: origin.to_string(),
            });
        }

        Ok(Self { rows, width })
    }

    /// Row masks, bottom to top
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Bounding width in columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bounding height in rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Largest offset at which the rotation still fits horizontally
    pub fn max_offset(&self) -> usize {
        BOARD_WIDTH - self.width
    }

    /// Copy of this rotation moved `offset` columns to the right
    pub fn shifted(&self, offset: usize) -> Self {
        debug_assert!(offset <= self.max_offset());
        Self {
            rows: self.rows.iter().map(|row| row >> offset).collect(),
            width: self.width,
        }
    }

    /// Number of filled cells
    pub fn cell_count(&self) -> u32 {
        self.rows.iter().map(|row| row.count_ones()).sum()
    }
}

/// A candidate placement: rotation index, horizontal offset and the shifted masks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placement {
    pub rotation: usize,
    pub offset: usize,
    pub shape: PieceRotation,
}

/// A named piece with its rotation variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    name: String,
    rotations: Vec<PieceRotation>,
}

impl Piece {
    pub fn new(name: impl Into<String>, rotations: Vec<PieceRotation>) -> Result<Self, CatalogError> {
        let name = name.into();
        if rotations.is_empty() {
            return Err(CatalogError::NoRotations { piece: name });
        }
        Ok(Self { name, rotations })
    }

    /// Build a piece from text shapes, one per rotation
    pub fn from_shapes(name: &str, shapes: &[&str]) -> Result<Self, CatalogError> {
        let rotations = shapes
            .iter()
            .enumerate()
            .map(|(i, text)| PieceRotation::parse(text, &format!("{}/{}", name, i + 1)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(name, rotations)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rotations(&self) -> &[PieceRotation] {
        &self.rotations
    }

    /// Every (rotation, offset) pair, rotation-major, offsets left to right
    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        self.rotations
            .iter()
            .enumerate()
            .flat_map(|(rotation, shape)| {
                (0..=shape.max_offset()).map(move |offset| Placement {
                    rotation,
                    offset,
                    shape: shape.shifted(offset),
                })
            })
    }

    /// Number of placements `placements()` yields
    pub fn placement_count(&self) -> usize {
        self.rotations.iter().map(|r| r.max_offset() + 1).sum()
    }
}

/// Piece names and rotation counts of the standard set, in catalog order
pub const STANDARD_MANIFEST: [(&str, usize); 7] = [
    ("O", 1),
    ("L", 4),
    ("RL", 4),
    ("N", 2),
    ("RN", 2),
    ("I", 2),
    ("T", 4),
];

const STANDARD_SHAPES: [&[&str]; 7] = [
    // O
    &["11\n11"],
    // L
    &["10\n10\n11", "111\n100", "11\n01\n01", "001\n111"],
    // RL
    &["01\n01\n11", "100\n111", "11\n10\n10", "111\n001"],
    // N
    &["011\n110", "10\n11\n01"],
    // RN
    &["110\n011", "01\n11\n10"],
    // I
    &["1111", "1\n1\n1\n1"],
    // T
    &["111\n010", "01\n11\n01", "010\n111", "10\n11\n10"],
];

/// Immutable, ordered piece library. Piece ids are indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceCatalog {
    pieces: Vec<Piece>,
}

impl PieceCatalog {
    pub fn new(pieces: Vec<Piece>) -> Result<Self, CatalogError> {
        if pieces.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { pieces })
    }

    /// The seven standard pieces, built in
    pub fn standard() -> Self {
        let pieces = STANDARD_MANIFEST
            .iter()
            .zip(STANDARD_SHAPES.iter())
            .map(|((name, _), shapes)| {
                Piece::from_shapes(name, shapes).unwrap_or_else(|e| panic!("builtin shape: {e}"))
            })
            .collect();
        Self { pieces }
    }

    /// Load the standard manifest from `<dir>/<name>/<k>.txt` files
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::load_manifest(dir, &STANDARD_MANIFEST)
    }

    /// Load pieces listed in `manifest` from `<dir>/<name>/<k>.txt` files (k starts at 1)
    pub fn load_manifest(
        dir: impl AsRef<Path>,
        manifest: &[(&str, usize)],
    ) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let mut pieces = Vec::with_capacity(manifest.len());

        for &(name, count) in manifest {
            let mut rotations = Vec::with_capacity(count);
            for k in 1..=count {
                let path = dir.join(name).join(format!("{k}.txt"));
                let text = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                rotations.push(PieceRotation::parse(&text, &path.display().to_string())?);
            }
            pieces.push(Piece::new(name, rotations)?);
        }

        debug!("loaded {} pieces from {}", pieces.len(), dir.display());
        Self::new(pieces)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Look up a piece id by name
    pub fn find(&self, name: &str) -> Option<PieceId> {
        self.pieces.iter().position(|p| p.name == name)
    }
}

impl std::ops::Index<PieceId> for PieceCatalog {
    type Output = Piece;

    fn index(&self, id: PieceId) -> &Piece {
        &self.pieces[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_bottom_to_top() {
        let rot = PieceRotation::parse("100\n111", "test").unwrap();
        assert_eq!(rot.width(), 3);
        assert_eq!(rot.height(), 2);
        assert_eq!(rot.rows()[0], 0b111 << 7);
        assert_eq!(rot.rows()[1], 0b100 << 7);
    }

    #[test]
    fn test_shifted_moves_right() {
        let rot = PieceRotation::parse("11", "test").unwrap();
        let moved = rot.shifted(rot.max_offset());
        assert_eq!(moved.rows()[0], 0b11);
        assert_eq!(moved.width(), 2);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            PieceRotation::parse("", "x"),
            Err(CatalogError::EmptyShape { .. })
        ));
        assert!(matches!(
            PieceRotation::parse("000", "x"),
            Err(CatalogError::EmptyShape { .. })
        ));
        assert!(matches!(
            PieceRotation::parse("11\n1", "x"),
            Err(CatalogError::RaggedShape { line: 2, .. })
        ));
        assert!(matches!(
            PieceRotation::parse("1x", "x"),
            Err(CatalogError::InvalidCell { found: 'x', .. })
        ));
        assert!(matches!(
            PieceRotation::parse("11111111111", "x"),
            Err(CatalogError::TooWide { width: 11, .. })
        ));
        assert!(matches!(
            PieceRotation::parse("1\n1\n1\n1\n1", "x"),
            Err(CatalogError::TooTall { height: 5, .. })
        ));
    }

    #[test]
    fn test_standard_catalog_counts() {
        let catalog = PieceCatalog::standard();
        assert_eq!(catalog.len(), 7);
        for (piece, (name, count)) in catalog.pieces().iter().zip(STANDARD_MANIFEST) {
            assert_eq!(piece.name(), name);
            assert_eq!(piece.rotations().len(), count);
            for rot in piece.rotations() {
                assert_eq!(rot.cell_count(), 4, "{} has 4 cells", name);
            }
        }
    }

    #[test]
    fn test_placement_enumeration() {
        let catalog = PieceCatalog::standard();
        let i = &catalog[catalog.find("I").unwrap()];
        let placements: Vec<_> = i.placements().collect();
        // 7 horizontal offsets + 10 vertical offsets
        assert_eq!(placements.len(), 17);
        assert_eq!(placements.len(), i.placement_count());
        assert_eq!((placements[0].rotation, placements[0].offset), (0, 0));
        assert_eq!((placements[7].rotation, placements[7].offset), (1, 0));
        assert_eq!(placements[16].shape.rows(), &[1, 1, 1, 1]);
    }
}
