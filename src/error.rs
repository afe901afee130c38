//! Error types for diagram parsing and embedding.

use thiserror::Error;

use crate::diagram::Borders;

/// Failures while parsing a diagram's text.
///
/// `LineMismatch` and `UnmatchedRow` are structural and abort the whole
/// fragment. `UnrecognizedCharacter` and `DuplicateMove` are recoverable:
/// the failing row is abandoned at the bad character and parsing continues
/// with the next line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A content row's width disagrees with the established board width.
    #[error("row {row} is {found} points wide, board is {expected}")]
    LineMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A character outside the diagram alphabet.
    #[error("can't recognize character {character:?} at row {row}, column {column}")]
    UnrecognizedCharacter {
        row: usize,
        column: usize,
        character: char,
    },

    /// A move number appears more than once in one diagram.
    #[error("move {number} appears twice (row {row})")]
    DuplicateMove { row: usize, number: u32 },

    /// A non-blank line that is neither a border nor a content row.
    #[error("line {line} is not a diagram row")]
    UnmatchedRow { line: usize },
}

/// Failures while embedding a fragment onto a larger board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbedError {
    /// The target board is smaller than the fragment in some dimension.
    #[error(
        "target board {width}x{height} is smaller than the fragment's \
         {fragment_width}x{fragment_height}"
    )]
    TooSmall {
        width: usize,
        height: usize,
        fragment_width: usize,
        fragment_height: usize,
    },

    /// The border configuration does not anchor the fragment to a corner.
    #[error("borders {borders:?} do not anchor the fragment to a corner")]
    NotEmbeddable { borders: Borders },
}

/// A recoverable parse failure, recorded against the row it abandoned.
///
/// Diagnostics are accumulated on the parsed diagram so callers can inspect
/// what was dropped; they are also logged as they occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    pub row: usize,
    pub error: ParseError,
}
