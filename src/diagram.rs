//! The ASCII diagram grammar.
//!
//! Diagrams are the `$$`-prefixed board blocks found in forum posts:
//!
//! ```text
//! $$B A capture
//! $$ +-------+
//! $$ | . X . |
//! $$ | X O X |
//! $$ | . 1 . |
//! $$ +-------+
//! ```
//!
//! Line 0 is the title: an optional first-player letter, a coordinates
//! flag and a first-move-number override, followed by free-form caption
//! text. Remaining lines are either border fillers (runs of `-`/`+`) or
//! content rows whose inner span is decoded character-by-character through
//! the symbol table. Border flags accumulate board-wide: any row showing a
//! left border pipe sets `borders.left` for the whole board.
//!
//! Parsing is best-effort per row. An unrecognized character or a repeated
//! move number abandons that row at the failing character, records a
//! [`RowDiagnostic`] and continues with the next line; a width mismatch or
//! a structurally unparseable line aborts the whole diagram.
//!
//! Dashes are legal inside a content row for a board point in the markup
//! at large, but the diagrams handled here never use them that way, so the
//! content pattern may exclude them.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ParseError, RowDiagnostic};
use crate::position::{Point, Stones};
use crate::symbols::{self, Color, Marker};

/// Title-line metadata, parsed from the first character in `[bBwWcm0-9]`.
static TITLE_INFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([bBWw]?)(c?)m?([0-9]*)").expect("title pattern is valid"));

/// One or more `$`; optional whitespace, dashes and plusses; at least one
/// dash or plus; optional trailing whitespace, dashes and plusses.
static BORDER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$+[\s\-+]*[\-+]+[\s\-+]*").expect("border pattern is valid"));

/// One or more `$`, an optional left-border pipe, the inner span, an
/// optional right-border pipe.
static CONTENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$+\s*(\|)?([^|\-+\[\]$]+)(\|)?").expect("content pattern is valid")
});

/// Which board edges the diagram shows. Flags are OR-accumulated across
/// rows, never tracked per row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Borders {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Borders {
    pub fn count(&self) -> usize {
        [self.up, self.down, self.left, self.right]
            .iter()
            .filter(|&&b| b)
            .count()
    }

    /// True if both edges of some opposite pair are present.
    pub fn has_opposite_pair(&self) -> bool {
        (self.up && self.down) || (self.left && self.right)
    }
}

/// A numbered move at a board point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub number: u32,
    pub point: Point,
}

/// Everything the grammar extracts from one diagram text block.
#[derive(Debug)]
pub struct ParsedDiagram {
    pub title_line: String,
    pub first_player: Color,
    pub has_coordinates: bool,
    pub first_move_number: Option<u32>,
    pub borders: Borders,
    pub stones: Stones,
    pub markers: BTreeMap<Point, Marker>,
    /// Sorted ascending by move number.
    pub moves: Vec<Move>,
    pub board_width: usize,
    pub board_height: usize,
    pub diagnostics: Vec<RowDiagnostic>,
}

impl Default for ParsedDiagram {
    fn default() -> Self {
        ParsedDiagram {
            title_line: String::new(),
            first_player: Color::Black,
            has_coordinates: false,
            first_move_number: None,
            borders: Borders::default(),
            stones: Stones::new(),
            markers: BTreeMap::new(),
            moves: Vec::new(),
            board_width: 0,
            board_height: 0,
            diagnostics: Vec::new(),
        }
    }
}

pub fn is_border_line(line: &str) -> bool {
    BORDER_LINE.is_match(line)
}

/// Parse one diagram text block.
///
/// # Errors
///
/// [`ParseError::LineMismatch`] when a content row's width disagrees with
/// the first row's, [`ParseError::UnmatchedRow`] when a non-blank line is
/// neither a border nor a content row. Per-row failures are collected in
/// [`ParsedDiagram::diagnostics`] instead.
pub fn parse(text: &str) -> Result<ParsedDiagram, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let title_line = lines.first().copied().unwrap_or_default();

    let mut diagram = ParsedDiagram {
        title_line: title_line.to_string(),
        ..ParsedDiagram::default()
    };
    parse_title_line(title_line, &mut diagram);

    if lines.get(1).is_some_and(|line| is_border_line(line)) {
        diagram.borders.up = true;
    }
    // Probe the last non-blank line so a trailing newline cannot hide the
    // bottom border.
    if let Some(last) = lines.iter().rev().find(|line| !line.trim().is_empty()) {
        if is_border_line(last) {
            diagram.borders.down = true;
        }
    }

    let mut row = 0;
    for (index, line) in lines.iter().enumerate().skip(1) {
        let Some(captures) = CONTENT_LINE.captures(line) else {
            if is_border_line(line) || line.trim().is_empty() {
                continue;
            }
            return Err(ParseError::UnmatchedRow { line: index + 1 });
        };

        // Any row with a border indicator flags the whole board.
        if captures.get(1).is_some() {
            diagram.borders.left = true;
        }
        if captures.get(3).is_some() {
            diagram.borders.right = true;
        }

        if is_border_line(line) {
            continue;
        }
        let inner = &captures[2];
        if inner.trim().is_empty() {
            continue;
        }

        row += 1;
        parse_row(inner, row, &mut diagram)?;
    }

    diagram.board_height = row;
    diagram.moves.sort_by_key(|m| m.number);
    Ok(diagram)
}

/// Decode the inner span of one content row.
///
/// Spaces are removed first; the column index then advances once per
/// character, marker and filler characters included.
fn parse_row(inner: &str, row: usize, diagram: &mut ParsedDiagram) -> Result<(), ParseError> {
    let mut column = 0;

    for c in inner.chars().filter(|&c| c != ' ') {
        let Some(symbol) = symbols::symbol(c) else {
            abandon_row(
                row,
                ParseError::UnrecognizedCharacter {
                    row,
                    column: column + 1,
                    character: c,
                },
                diagram,
            );
            return Ok(());
        };
        column += 1;

        if let Some(color) = symbol.stone {
            diagram.stones.insert((column, row), color);
        }

        if let Some(marker) = symbol.marker {
            diagram.markers.insert((column, row), marker);
        } else if let Some(number) = symbols::move_number(c) {
            // Some diagrams show the same move several times; the repeats
            // abandon their row rather than corrupt the move chain.
            if diagram.moves.iter().any(|m| m.number == number) {
                abandon_row(row, ParseError::DuplicateMove { row, number }, diagram);
                return Ok(());
            }
            diagram.moves.push(Move {
                number,
                point: (column, row),
            });
        }
    }

    if diagram.board_width == 0 {
        diagram.board_width = column;
    } else if diagram.board_width != column {
        return Err(ParseError::LineMismatch {
            row,
            expected: diagram.board_width,
            found: column,
        });
    }
    Ok(())
}

/// Record a recoverable per-row failure. Cells decoded before the failing
/// character are kept; the width check is skipped for the abandoned row.
fn abandon_row(row: usize, error: ParseError, diagram: &mut ParsedDiagram) {
    log::warn!("abandoning diagram row: {error}");
    diagram.diagnostics.push(RowDiagnostic { row, error });
}

/// Extract first player, coordinates flag and first-move-number override
/// from the title line, when present.
fn parse_title_line(line: &str, diagram: &mut ParsedDiagram) {
    let Some(start) =
        line.find(|c: char| matches!(c, 'B' | 'b' | 'W' | 'w' | 'c' | 'm' | '0'..='9'))
    else {
        return;
    };
    let Some(captures) = TITLE_INFO.captures(&line[start..]) else {
        return;
    };

    if captures[1].eq_ignore_ascii_case("w") {
        diagram.first_player = Color::White;
    }
    if !captures[2].is_empty() {
        diagram.has_coordinates = true;
    }
    if let Ok(number) = captures[3].parse::<u32>() {
        diagram.first_move_number = Some(number);
    }
}
