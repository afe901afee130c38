//! One parsed diagram and its derived move-by-move chain of positions.
//!
//! A [`Fragment`] owns the grammar output for one diagram and registers a
//! child position with the shared [`PositionList`] for the board before any
//! move and after each numbered move. Partially-bordered fragments can be
//! embedded onto a larger board: the border flags anchor the diagram to a
//! corner and every coordinate is translated by the resulting offset.

use std::collections::BTreeMap;

use crate::diagram::{self, Borders, Move};
use crate::error::{EmbedError, ParseError, RowDiagnostic};
use crate::position::{Point, Stones, stones_rep};
use crate::position_list::{FragmentId, PositionId, PositionList};
use crate::symbols::{Color, Marker};

/// The size and borders a fragment had before it was embedded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EmbedOrigin {
    pub board_width: usize,
    pub board_height: usize,
    pub borders: Borders,
}

/// One diagram's contents plus the chain of positions its moves produce.
#[derive(Debug)]
pub struct Fragment {
    pub id: FragmentId,
    pub text: String,
    pub title_line: String,
    pub first_player: Color,
    pub has_coordinates: bool,
    pub first_move_number: Option<u32>,
    pub borders: Borders,
    pub stones: Stones,
    pub markers: BTreeMap<Point, Marker>,
    /// Ascending by move number.
    pub moves: Vec<Move>,
    pub board_width: usize,
    pub board_height: usize,
    /// `children[0]` is the position before any move; `children[i]` the
    /// position after playing move `i`.
    pub children: Vec<PositionId>,
    /// Rows the grammar abandoned, if any.
    pub diagnostics: Vec<RowDiagnostic>,
    /// Present on fragments produced by [`Fragment::embed`].
    pub embedded_from: Option<EmbedOrigin>,
}

impl Fragment {
    /// Parse a diagram text block and build its position chain against the
    /// shared list.
    pub fn parse(text: &str, positions: &mut PositionList) -> Result<Fragment, ParseError> {
        let parsed = diagram::parse(text)?;
        let mut fragment = Fragment {
            id: positions.allocate_fragment(),
            text: text.to_string(),
            title_line: parsed.title_line,
            first_player: parsed.first_player,
            has_coordinates: parsed.has_coordinates,
            first_move_number: parsed.first_move_number,
            borders: parsed.borders,
            stones: parsed.stones,
            markers: parsed.markers,
            moves: parsed.moves,
            board_width: parsed.board_width,
            board_height: parsed.board_height,
            children: Vec::new(),
            diagnostics: parsed.diagnostics,
            embedded_from: None,
        };
        fragment.create_children(positions);
        Ok(fragment)
    }

    /// Register the zero-move position, then one successor per move.
    ///
    /// Colors alternate from `first_player`; even move numbers take the
    /// opposite color.
    fn create_children(&mut self, positions: &mut PositionList) {
        self.children = Vec::with_capacity(self.moves.len() + 1);

        let mut previous = positions.new_position(
            self.stones.clone(),
            self.id,
            self.board_width,
            self.board_height,
        );
        self.children.push(previous);

        for mv in &self.moves {
            let color = if mv.number % 2 == 0 {
                self.first_player.opposite()
            } else {
                self.first_player
            };
            let stones = positions.get(previous).place_move(mv.point, color);
            previous =
                positions.new_position(stones, self.id, self.board_width, self.board_height);
            self.children.push(previous);
        }
    }

    /// Parse a diagram against its own private registry, for callers with
    /// no shared list in play.
    pub fn parse_standalone(text: &str) -> Result<(Fragment, PositionList), ParseError> {
        let mut positions = PositionList::new();
        let fragment = Fragment::parse(text, &mut positions)?;
        Ok((fragment, positions))
    }

    /// Canonical representation of the fragment's parsed stones: the
    /// borderless, markerless diagram it could be rebuilt from.
    pub fn stones_rep(&self) -> String {
        stones_rep(&self.stones, self.board_width, self.board_height)
    }

    pub fn equal_stones(&self, other: &Fragment) -> bool {
        self.stones_rep() == other.stones_rep()
    }

    /// A board can be unambiguously placed on a larger one so long as its
    /// borders pin it to a corner: at least one border, not all four, and
    /// two borders must not be an opposite pair.
    pub fn embeddable(&self) -> bool {
        let count = self.borders.count();
        if count == 0 || count == 4 {
            return false;
        }
        !(count == 2 && self.borders.has_opposite_pair())
    }

    /// Translate this fragment onto a `new_width` x `new_height` board.
    ///
    /// Unbordered sides fall away from their board edge, so stones keep
    /// their distance to the bordered corner. The returned fragment records
    /// the original size and borders and re-derives its children in the new
    /// coordinate space.
    ///
    /// # Errors
    ///
    /// [`EmbedError::TooSmall`] if either dimension shrinks,
    /// [`EmbedError::NotEmbeddable`] if the borders don't anchor a corner.
    pub fn embed(
        &self,
        new_width: usize,
        new_height: usize,
        positions: &mut PositionList,
    ) -> Result<Fragment, EmbedError> {
        if new_width < self.board_width || new_height < self.board_height {
            return Err(EmbedError::TooSmall {
                width: new_width,
                height: new_height,
                fragment_width: self.board_width,
                fragment_height: self.board_height,
            });
        }
        if !self.embeddable() {
            return Err(EmbedError::NotEmbeddable {
                borders: self.borders,
            });
        }

        let x_offset = if self.borders.left {
            0
        } else {
            new_width - self.board_width
        };
        let y_offset = if self.borders.up {
            0
        } else {
            new_height - self.board_height
        };
        let translate = |(x, y): Point| (x + x_offset, y + y_offset);

        let mut fragment = Fragment {
            id: positions.allocate_fragment(),
            text: self.text.clone(),
            title_line: self.title_line.clone(),
            first_player: self.first_player,
            has_coordinates: self.has_coordinates,
            first_move_number: self.first_move_number,
            borders: Borders::default(),
            stones: self
                .stones
                .iter()
                .map(|(&point, &color)| (translate(point), color))
                .collect(),
            markers: self
                .markers
                .iter()
                .map(|(&point, &marker)| (translate(point), marker))
                .collect(),
            moves: self
                .moves
                .iter()
                .map(|mv| Move {
                    number: mv.number,
                    point: translate(mv.point),
                })
                .collect(),
            board_width: new_width,
            board_height: new_height,
            children: Vec::new(),
            diagnostics: Vec::new(),
            embedded_from: Some(EmbedOrigin {
                board_width: self.board_width,
                board_height: self.board_height,
                borders: self.borders,
            }),
        };
        fragment.create_children(positions);
        Ok(fragment)
    }

    /// The largest width and height over a batch of fragments.
    pub fn max_size(fragments: &[Fragment]) -> (usize, usize) {
        (
            fragments.iter().map(|f| f.board_width).max().unwrap_or(0),
            fragments.iter().map(|f| f.board_height).max().unwrap_or(0),
        )
    }

    /// Expand every fragment to the size of the largest one in the batch.
    ///
    /// Fragments already at full size pass through unchanged; a fragment
    /// whose embed fails is logged and dropped without aborting the batch.
    pub fn embed_all(fragments: Vec<Fragment>, positions: &mut PositionList) -> Vec<Fragment> {
        let (width, height) = Fragment::max_size(&fragments);

        let mut embedded = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            if fragment.board_width < width || fragment.board_height < height {
                match fragment.embed(width, height, positions) {
                    Ok(expanded) => embedded.push(expanded),
                    Err(error) => {
                        log::warn!("dropping fragment: {error}\n{}", fragment.text);
                    }
                }
            } else {
                embedded.push(fragment);
            }
        }
        embedded
    }

    /// Keep only the fragments already at the largest board size found,
    /// as a no-translation alternative to [`Fragment::embed_all`].
    pub fn one_size(fragments: Vec<Fragment>) -> Vec<Fragment> {
        let (width, height) = Fragment::max_size(&fragments);
        fragments
            .into_iter()
            .filter(|f| f.board_width == width && f.board_height == height)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn borders(up: bool, down: bool, left: bool, right: bool) -> Borders {
        Borders {
            up,
            down,
            left,
            right,
        }
    }

    fn fragment_with_borders(borders: Borders, positions: &mut PositionList) -> Fragment {
        let mut fragment =
            Fragment::parse("$$B\n$$ . .\n$$ X .", positions).expect("valid diagram");
        fragment.borders = borders;
        fragment
    }

    #[test]
    fn test_children_one_per_move_plus_initial() {
        let mut positions = PositionList::new();
        let text = "$$B\n$$ . . .\n$$ 1 2 .\n$$ . 3 .";
        let fragment = Fragment::parse(text, &mut positions).unwrap();
        assert_eq!(fragment.moves.len(), 3);
        assert_eq!(fragment.children.len(), 4);
    }

    #[test]
    fn test_children_alternate_from_first_player() {
        let mut positions = PositionList::new();
        let fragment = Fragment::parse("$$W\n$$ 1 2\n$$ 3 .", &mut positions).unwrap();
        let last = positions.get(fragment.children[3]);
        assert_eq!(last.stone_at((1, 1)), Some(Color::White));
        assert_eq!(last.stone_at((2, 1)), Some(Color::Black));
        assert_eq!(last.stone_at((1, 2)), Some(Color::White));
    }

    #[test]
    fn test_capture_during_replay() {
        // White (2,2) is in atari; move 1 takes its last liberty.
        let text = "$$B\n\
                    $$ . X . .\n\
                    $$ X O 1 .\n\
                    $$ . X . .\n\
                    $$ . . . .";
        let mut positions = PositionList::new();
        let fragment = Fragment::parse(text, &mut positions).unwrap();

        assert_eq!(fragment.children.len(), 2);
        let before = positions.get(fragment.children[0]);
        let after = positions.get(fragment.children[1]);
        assert_eq!(before.number_stones(), 4);
        assert_eq!(after.number_stones(), 4); // 4 - 1 captured + 1 played
        assert_eq!(after.stone_at((2, 2)), None);
        assert_eq!(after.stone_at((3, 2)), Some(Color::Black));
    }

    #[test]
    fn test_embeddable_border_configurations() {
        let mut positions = PositionList::new();
        let cases = [
            (borders(false, false, false, false), false), // nothing anchors
            (borders(true, false, false, false), true),
            (borders(false, false, true, false), true),
            (borders(true, false, true, false), true), // corner
            (borders(true, true, false, false), false), // opposite pair
            (borders(false, false, true, true), false), // opposite pair
            (borders(true, true, true, false), true),
            (borders(true, true, true, true), false), // already a full board
        ];
        for (b, expected) in cases {
            let fragment = fragment_with_borders(b, &mut positions);
            assert_eq!(fragment.embeddable(), expected, "{b:?}");
        }
    }

    #[test]
    fn test_embed_translates_toward_unbordered_corner() {
        let mut positions = PositionList::new();
        // Bordered right and down: anchored to the bottom-right corner.
        let text = "$$B\n$$ . X |\n$$ 1 . |\n$$ ----";
        let fragment = Fragment::parse(text, &mut positions).unwrap();
        assert!(fragment.embeddable());

        let embedded = fragment.embed(4, 5, &mut positions).unwrap();
        assert_eq!(embedded.board_width, 4);
        assert_eq!(embedded.board_height, 5);
        // x shifts by 4-2, y by 5-2
        assert_eq!(embedded.stones.get(&(4, 4)), Some(&Color::Black));
        assert_eq!(embedded.moves[0].point, (3, 5));
        assert_eq!(
            embedded.embedded_from,
            Some(EmbedOrigin {
                board_width: 2,
                board_height: 2,
                borders: borders(false, true, false, true),
            })
        );
        assert_eq!(embedded.first_player, fragment.first_player);
        assert_eq!(embedded.children.len(), 2);
    }

    #[test]
    fn test_embed_keeps_left_top_anchor() {
        let mut positions = PositionList::new();
        let text = "$$B\n$$ ----\n$$ | X .\n$$ | . 1";
        let fragment = Fragment::parse(text, &mut positions).unwrap();
        assert!(fragment.borders.up);
        assert!(fragment.borders.left);

        let embedded = fragment.embed(5, 5, &mut positions).unwrap();
        // anchored at the top-left: no shift at all
        assert_eq!(embedded.stones.get(&(1, 1)), Some(&Color::Black));
        assert_eq!(embedded.moves[0].point, (2, 2));
    }

    #[test]
    fn test_embed_preserves_relative_layout() {
        let mut positions = PositionList::new();
        let text = "$$B\n$$ X O |\n$$ . X |\n$$ ----";
        let fragment = Fragment::parse(text, &mut positions).unwrap();
        let embedded = fragment.embed(9, 9, &mut positions).unwrap();

        for (&(x, y), &color) in &fragment.stones {
            assert_eq!(embedded.stones.get(&(x + 7, y + 7)), Some(&color));
        }
        assert_eq!(embedded.stones.len(), fragment.stones.len());
    }

    #[test]
    fn test_embed_too_small() {
        let mut positions = PositionList::new();
        let text = "$$B\n$$ . X |\n$$ X . |\n$$ ----";
        let fragment = Fragment::parse(text, &mut positions).unwrap();
        let result = fragment.embed(1, 9, &mut positions);
        assert!(matches!(result, Err(EmbedError::TooSmall { .. })));
    }

    #[test]
    fn test_embed_not_embeddable() {
        let mut positions = PositionList::new();
        let fragment = fragment_with_borders(borders(false, false, false, false), &mut positions);
        let result = fragment.embed(9, 9, &mut positions);
        assert!(matches!(result, Err(EmbedError::NotEmbeddable { .. })));
    }

    #[test]
    fn test_embed_all_drops_failures() {
        let mut positions = PositionList::new();
        let anchored = Fragment::parse("$$B\n$$ . X |\n$$ X . |\n$$ ----", &mut positions).unwrap();
        let full = Fragment::parse(
            "$$B\n$$ . . . X\n$$ . . . .\n$$ . . . .\n$$ X . . .",
            &mut positions,
        )
        .unwrap();
        let unanchored = Fragment::parse("$$B\n$$ X .\n$$ . .", &mut positions).unwrap();

        let embedded = Fragment::embed_all(vec![anchored, full, unanchored], &mut positions);
        assert_eq!(embedded.len(), 2);
        assert!(embedded.iter().all(|f| f.board_width == 4));
        assert!(embedded.iter().all(|f| f.board_height == 4));
        // the anchored 2x2 was translated, the 4x4 passed through
        assert!(embedded[0].embedded_from.is_some());
        assert!(embedded[1].embedded_from.is_none());
    }

    #[test]
    fn test_one_size_keeps_largest_only() {
        let mut positions = PositionList::new();
        let small = Fragment::parse("$$B\n$$ X .\n$$ . .", &mut positions).unwrap();
        let tall = Fragment::parse("$$B\n$$ X .\n$$ . .\n$$ . .", &mut positions).unwrap();
        let wide = Fragment::parse("$$B\n$$ X . .\n$$ . . .\n$$ . . .", &mut positions).unwrap();

        let kept = Fragment::one_size(vec![small, tall, wide]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].board_width, 3);
        assert_eq!(kept[0].board_height, 3);
    }

    #[test]
    fn test_parse_standalone_private_registry() {
        let (fragment, positions) = Fragment::parse_standalone("$$B\n$$ 1 .\n$$ . .").unwrap();
        assert_eq!(fragment.children.len(), 2);
        assert_eq!(positions.len(), 2);
    }

    #[test]
    fn test_equal_stones() {
        let mut positions = PositionList::new();
        let a = Fragment::parse("$$B\n$$ X .\n$$ . O", &mut positions).unwrap();
        let b = Fragment::parse("$$W another diagram\n$$ X .\n$$ . O", &mut positions).unwrap();
        let c = Fragment::parse("$$B\n$$ O .\n$$ . X", &mut positions).unwrap();
        assert!(a.equal_stones(&b));
        assert!(!a.equal_stones(&c));
    }
}
