//! Piece catalog tests - standard set, placement enumeration, loading from disk

use std::fs;
use std::path::PathBuf;

use tetris_lookahead::core::pieces::STANDARD_MANIFEST;
use tetris_lookahead::core::{CatalogError, Piece, PieceCatalog, PieceRotation};
use tetris_lookahead::types::BOARD_WIDTH;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tetris-pieces-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_standard_catalog_order() {
    let catalog = PieceCatalog::standard();
    let names: Vec<&str> = catalog.pieces().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["O", "L", "RL", "N", "RN", "I", "T"]);
    for (piece, (_, count)) in catalog.pieces().iter().zip(STANDARD_MANIFEST) {
        assert_eq!(piece.rotations().len(), count);
    }
}

#[test]
fn test_placements_cover_every_offset() {
    let catalog = PieceCatalog::standard();
    for piece in catalog.pieces() {
        let placements: Vec<_> = piece.placements().collect();
        assert_eq!(placements.len(), piece.placement_count());
        for placement in &placements {
            let rotation = &piece.rotations()[placement.rotation];
            assert!(placement.offset + rotation.width() <= BOARD_WIDTH);
            assert_eq!(placement.shape, rotation.shifted(placement.offset));
        }
    }

    // O: 9 offsets; T: 8 + 9 + 8 + 9.
    assert_eq!(catalog[catalog.find("O").unwrap()].placement_count(), 9);
    assert_eq!(catalog[catalog.find("T").unwrap()].placement_count(), 34);
}

#[test]
fn test_rotation_rows_bottom_to_top() {
    let l = PieceRotation::parse("10\n10\n11", "L").unwrap();
    assert_eq!(l.height(), 3);
    assert_eq!(l.width(), 2);
    // Bottom row "11" occupies the two leftmost columns.
    assert_eq!(l.rows()[0], 0b11 << (BOARD_WIDTH - 2));
    assert_eq!(l.rows()[2], 0b1 << (BOARD_WIDTH - 1));
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        PieceRotation::parse("", "empty"),
        Err(CatalogError::EmptyShape { .. })
    ));
    assert!(matches!(
        PieceRotation::parse("10\n1", "ragged"),
        Err(CatalogError::RaggedShape { line: 2, .. })
    ));
    assert!(matches!(
        PieceRotation::parse("1x", "bad"),
        Err(CatalogError::InvalidCell { found: 'x', .. })
    ));
    assert!(matches!(
        PieceRotation::parse("1\n1\n1\n1\n1", "tall"),
        Err(CatalogError::TooTall { height: 5, .. })
    ));
    assert!(matches!(
        PieceRotation::parse("11111111111", "wide"),
        Err(CatalogError::TooWide { width: 11, .. })
    ));
    assert!(matches!(
        Piece::new("none", Vec::new()),
        Err(CatalogError::NoRotations { .. })
    ));
}

#[test]
fn test_load_dir_matches_standard() {
    let dir = temp_dir("standard");
    let standard = PieceCatalog::standard();
    for piece in standard.pieces() {
        let piece_dir = dir.join(piece.name());
        fs::create_dir_all(&piece_dir).unwrap();
        for (k, rotation) in piece.rotations().iter().enumerate() {
            let text: Vec<String> = rotation
                .rows()
                .iter()
                .rev()
                .map(|row| {
                    (0..rotation.width())
                        .map(|x| if row >> (BOARD_WIDTH - 1 - x) & 1 == 1 { '1' } else { '0' })
                        .collect()
                })
                .collect();
            fs::write(piece_dir.join(format!("{}.txt", k + 1)), text.join("\n")).unwrap();
        }
    }

    let loaded = PieceCatalog::load_dir(&dir).unwrap();
    fs::remove_dir_all(&dir).unwrap();
    assert_eq!(loaded, standard);
}

#[test]
fn test_load_dir_missing_file_names_path() {
    let dir = temp_dir("missing");
    let err = PieceCatalog::load_dir(&dir).unwrap_err();
    fs::remove_dir_all(&dir).unwrap();
    match err {
        CatalogError::Io { path, .. } => assert!(path.ends_with("1.txt"), "{}", path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_custom_manifest() {
    let dir = temp_dir("custom");
    fs::create_dir_all(dir.join("dot")).unwrap();
    fs::write(dir.join("dot").join("1.txt"), "1\n").unwrap();

    let catalog = PieceCatalog::load_manifest(&dir, &[("dot", 1)]).unwrap();
    fs::remove_dir_all(&dir).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].placement_count(), BOARD_WIDTH);
    assert_eq!(catalog.find("dot"), Some(0));
    assert!(catalog.get(1).is_none());
}
