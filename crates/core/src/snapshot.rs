//! Snapshot module - text format for boards and search contexts
//!
//! Board format:
//!
//! ```text
//! 10 20
//! 0000000000
//! ...          (20 rows, top row first, '1' = filled)
//! ```
//!
//! A context snapshot prefixes the name of the piece to place on the header
//! line: `T 10 20`.

use std::fs;
use std::path::Path;

use crate::board::Board;
use crate::error::SnapshotError;
use crate::pieces::PieceCatalog;
use crate::types::{column_bit, PieceId, BOARD_HEIGHT, BOARD_WIDTH};

/// A board plus the piece about to be placed on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub board: Board,
    pub piece: PieceId,
}

/// Render `board` in the snapshot text format
pub fn serialize_board(board: &Board) -> String {
    let mut out = String::with_capacity((BOARD_WIDTH + 1) * (BOARD_HEIGHT + 1));
    out.push_str(&format!("{} {}\n", BOARD_WIDTH, BOARD_HEIGHT));
    for y in (0..BOARD_HEIGHT).rev() {
        for x in 0..BOARD_WIDTH {
            out.push(if board.is_occupied(x, y) { '1' } else { '0' });
        }
        out.push('\n');
    }
    out
}

/// Parse the snapshot text format back into a board
pub fn deserialize_board(text: &str) -> Result<Board, SnapshotError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(SnapshotError::MissingHeader)?;
    let (width, height) = parse_dimensions(header, header.split_whitespace())?;
    check_dimensions(width, height)?;
    parse_rows(lines)
}

/// Render a context snapshot (`<piece> <width> <height>` header)
pub fn serialize_context(context: &Context, catalog: &PieceCatalog) -> String {
    let name = catalog
        .get(context.piece)
        .map_or("?", |piece| piece.name());
    format!("{} {}", name, serialize_board(&context.board))
}

/// Parse a context snapshot, resolving the piece name against `catalog`
pub fn deserialize_context(text: &str, catalog: &PieceCatalog) -> Result<Context, SnapshotError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(SnapshotError::MissingHeader)?;
    let mut tokens = header.split_whitespace();
    let name = tokens
        .next()
        .ok_or_else(|| SnapshotError::BadHeader(header.to_string()))?;
    let (width, height) = parse_dimensions(header, tokens)?;
    check_dimensions(width, height)?;

    let piece = catalog
        .find(name)
        .ok_or_else(|| SnapshotError::UnknownPiece(name.to_string()))?;
    let board = parse_rows(lines)?;
    Ok(Context { board, piece })
}

pub fn save_board(path: impl AsRef<Path>, board: &Board) -> Result<(), SnapshotError> {
    write_file(path.as_ref(), &serialize_board(board))
}

pub fn load_board(path: impl AsRef<Path>) -> Result<Board, SnapshotError> {
    deserialize_board(&read_file(path.as_ref())?)
}

pub fn save_context(
    path: impl AsRef<Path>,
    context: &Context,
    catalog: &PieceCatalog,
) -> Result<(), SnapshotError> {
    write_file(path.as_ref(), &serialize_context(context, catalog))
}

pub fn load_context(path: impl AsRef<Path>, catalog: &PieceCatalog) -> Result<Context, SnapshotError> {
    deserialize_context(&read_file(path.as_ref())?, catalog)
}

fn read_file(path: &Path) -> Result<String, SnapshotError> {
    fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), SnapshotError> {
    fs::write(path, contents).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse_dimensions<'a>(
    header: &str,
    mut tokens: impl Iterator<Item = &'a str>,
) -> Result<(usize, usize), SnapshotError> {
    let bad = || SnapshotError::BadHeader(header.to_string());
    let width = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(bad)?;
    let height = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(bad)?;
    if tokens.next().is_some() {
        return Err(bad());
    }
    Ok((width, height))
}

fn check_dimensions(width: usize, height: usize) -> Result<(), SnapshotError> {
    if width != BOARD_WIDTH || height != BOARD_HEIGHT {
        return Err(SnapshotError::DimensionMismatch {
            width,
            height,
            expected_width: BOARD_WIDTH,
            expected_height: BOARD_HEIGHT,
        });
    }
    Ok(())
}

fn parse_rows<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Board, SnapshotError> {
    // Line numbers count the header as line 1.
    let mut rows: Vec<(usize, &str)> = lines
        .map(str::trim_end)
        .enumerate()
        .map(|(i, line)| (i + 2, line))
        .collect();
    // Trailing blank lines are allowed; a blank line between rows fails the width check.
    while rows.last().is_some_and(|(_, line)| line.is_empty()) {
        rows.pop();
    }

    let mut masks = [0; BOARD_HEIGHT];
    for (i, &(line_no, line)) in rows.iter().enumerate() {
        let found = line.chars().count();
        if found != BOARD_WIDTH {
            return Err(SnapshotError::RowWidth {
                line: line_no,
                found,
                expected: BOARD_WIDTH,
            });
        }
        let mut mask = 0;
        for (x, ch) in line.chars().enumerate() {
            match ch {
                '1' => mask |= column_bit(x),
                '0' => {}
                found => return Err(SnapshotError::InvalidCell { line: line_no, found }),
            }
        }
        if let Some(slot) = BOARD_HEIGHT.checked_sub(i + 1) {
            masks[slot] = mask;
        }
    }
    if rows.len() != BOARD_HEIGHT {
        return Err(SnapshotError::RowCount {
            found: rows.len(),
            expected: BOARD_HEIGHT,
        });
    }
    Ok(Board::from_rows(masks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_layout() {
        let board = Board::from_picture("x........x");
        let text = serialize_board(&board);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "10 20");
        assert_eq!(lines.len(), BOARD_HEIGHT + 1);
        assert_eq!(lines[1], "0000000000");
        assert_eq!(lines[BOARD_HEIGHT], "1000000001");
    }

    #[test]
    fn test_board_roundtrip() {
        let board = Board::from_picture(
            "
            .x..x.....
            xxx.xxxxx.
            ",
        );
        let back = deserialize_board(&serialize_board(&board)).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_rejects_wrong_dimensions() {
        let err = deserialize_board("10 16\n").unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::DimensionMismatch { height: 16, .. }
        ));
    }

    #[test]
    fn test_rejects_bad_rows() {
        let mut text = serialize_board(&Board::new());
        text = text.replacen("0000000000", "00000x0000", 1);
        assert!(matches!(
            deserialize_board(&text),
            Err(SnapshotError::InvalidCell { line: 2, found: 'x' })
        ));

        let short = "10 20\n0000000000\n";
        assert!(matches!(
            deserialize_board(short),
            Err(SnapshotError::RowCount { found: 1, .. })
        ));
    }

    #[test]
    fn test_blank_line_between_rows_rejected() {
        let mut lines: Vec<String> = serialize_board(&Board::new())
            .lines()
            .map(String::from)
            .collect();
        lines.insert(4, String::new());
        let text = lines.join("\n");
        // Header is line 1, so the inserted blank is line 5.
        assert!(matches!(
            deserialize_board(&text),
            Err(SnapshotError::RowWidth {
                line: 5,
                found: 0,
                expected: BOARD_WIDTH
            })
        ));
    }

    #[test]
    fn test_trailing_blank_lines_allowed() {
        let board = Board::from_picture("x.x.x.x.x.");
        let text = format!("{}\n\n", serialize_board(&board));
        assert_eq!(deserialize_board(&text).unwrap(), board);
    }

    #[test]
    fn test_error_line_numbers_count_every_line() {
        // The bad cell is in the last row, line 21 of the file.
        let mut text = serialize_board(&Board::new());
        let last = text.rfind("0000000000").unwrap();
        text.replace_range(last..last + 1, "2");
        assert!(matches!(
            deserialize_board(&text),
            Err(SnapshotError::InvalidCell { line: 21, found: '2' })
        ));
    }

    #[test]
    fn test_context_roundtrip() {
        let catalog = PieceCatalog::standard();
        let context = Context {
            board: Board::from_picture("xxxx.xxxxx"),
            piece: catalog.find("T").unwrap(),
        };
        let text = serialize_context(&context, &catalog);
        assert!(text.starts_with("T 10 20\n"));
        assert_eq!(deserialize_context(&text, &catalog).unwrap(), context);
    }

    #[test]
    fn test_context_unknown_piece() {
        let catalog = PieceCatalog::standard();
        let text = format!("Q {}", serialize_board(&Board::new()));
        assert!(matches!(
            deserialize_context(&text, &catalog),
            Err(SnapshotError::UnknownPiece(name)) if name == "Q"
        ));
    }
}
