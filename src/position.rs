//! Board snapshots and capture resolution.
//!
//! A [`Position`] is one concrete stone arrangement on a board of fixed
//! dimensions. Positions are immutable once created: playing a move produces
//! a fresh stones map via [`Position::place_move`], never an in-place edit.
//!
//! Group and liberty computation is a flood fill over orthogonally-connected
//! same-colored stones, with an explicit stack and visited set. Capture
//! resolution checks each neighbor group of an incoming stone for its last
//! liberty. There is no suicide check: a move that leaves its own group
//! without liberties is placed as-is, a documented limitation of the model.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::position_list::{FragmentId, PositionId};
use crate::symbols::{self, Color};

/// A point on the board: 1-based (column, row).
pub type Point = (usize, usize);

/// Sparse stone arrangement; absent points are empty.
pub type Stones = BTreeMap<Point, Color>;

/// A maximal set of same-colored, orthogonally-connected stones, together
/// with the de-duplicated liberties of the whole group.
///
/// An empty seed point yields an empty group with `color: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub points: Vec<Point>,
    pub liberties: Vec<Point>,
    pub color: Option<Color>,
}

/// One stone arrangement on a `board_width` x `board_height` board.
#[derive(Debug)]
pub struct Position {
    stones: Stones,
    board_width: usize,
    board_height: usize,
    number_stones: usize,
    /// Fragments whose move chain reached this position.
    referrers: Vec<FragmentId>,
    /// Positions that reach this one by capturing.
    capture_sources: Vec<PositionId>,
    one_liberty_groups: OnceCell<Vec<Group>>,
    post_capture_boards: OnceCell<Vec<Position>>,
}

impl Position {
    pub fn new(stones: Stones, board_width: usize, board_height: usize) -> Position {
        let number_stones = stones.len();
        Position {
            stones,
            board_width,
            board_height,
            number_stones,
            referrers: Vec::new(),
            capture_sources: Vec::new(),
            one_liberty_groups: OnceCell::new(),
            post_capture_boards: OnceCell::new(),
        }
    }

    pub fn stones(&self) -> &Stones {
        &self.stones
    }

    pub fn board_width(&self) -> usize {
        self.board_width
    }

    pub fn board_height(&self) -> usize {
        self.board_height
    }

    pub fn number_stones(&self) -> usize {
        self.number_stones
    }

    pub fn stone_at(&self, point: Point) -> Option<Color> {
        self.stones.get(&point).copied()
    }

    pub fn is_occupied(&self, point: Point) -> bool {
        self.stones.contains_key(&point)
    }

    /// Fragments whose move chain produced this position.
    pub fn referrers(&self) -> &[FragmentId] {
        &self.referrers
    }

    /// Positions known to reach this one by a capture.
    pub fn capture_sources(&self) -> &[PositionId] {
        &self.capture_sources
    }

    pub fn is_capture_result(&self) -> bool {
        !self.capture_sources.is_empty()
    }

    pub(crate) fn add_referrer(&mut self, fragment: FragmentId) {
        self.referrers.push(fragment);
    }

    pub(crate) fn add_capture_source(&mut self, source: PositionId) {
        self.capture_sources.push(source);
    }

    /// Orthogonal neighbors of a point, clipped to the board bounds.
    ///
    /// Edge points have three neighbors, corner points two; there is no
    /// wraparound.
    pub fn adjacent(&self, point: Point) -> Vec<Point> {
        let (x, y) = point;
        let mut adjacents = Vec::with_capacity(4);
        if y < self.board_height {
            adjacents.push((x, y + 1));
        }
        if x < self.board_width {
            adjacents.push((x + 1, y));
        }
        if x > 1 {
            adjacents.push((x - 1, y));
        }
        if y > 1 {
            adjacents.push((x, y - 1));
        }
        adjacents
    }

    /// Flood-fill the group containing `point`.
    pub fn group_at(&self, point: Point) -> Group {
        let Some(color) = self.stone_at(point) else {
            return Group {
                points: Vec::new(),
                liberties: Vec::new(),
                color: None,
            };
        };

        let mut stack = vec![point];
        let mut visited: BTreeSet<Point> = BTreeSet::new();
        let mut liberties: BTreeSet<Point> = BTreeSet::new();

        while let Some(pt) = stack.pop() {
            if !visited.insert(pt) {
                continue;
            }
            for n in self.adjacent(pt) {
                match self.stone_at(n) {
                    None => {
                        liberties.insert(n);
                    }
                    Some(c) if c == color && !visited.contains(&n) => stack.push(n),
                    _ => {}
                }
            }
        }

        Group {
            points: visited.into_iter().collect(),
            liberties: liberties.into_iter().collect(),
            color: Some(color),
        }
    }

    /// The distinct neighbor groups that placing a `color` stone at `point`
    /// would capture: opposite-colored groups whose single remaining liberty
    /// is `point` itself.
    ///
    /// Returns `None` if `point` is already occupied. Does not mutate.
    pub fn captured_strings(&self, point: Point, color: Color) -> Option<Vec<Group>> {
        if self.is_occupied(point) {
            return None;
        }

        let mut captures = Vec::new();
        let mut seen: BTreeSet<Point> = BTreeSet::new();
        for n in self.adjacent(point) {
            if !self.is_occupied(n) || seen.contains(&n) {
                continue;
            }
            let group = self.group_at(n);
            seen.extend(group.points.iter().copied());
            if group.color != Some(color) && group.liberties.len() == 1 {
                captures.push(group);
            }
        }
        Some(captures)
    }

    /// Play a stone and resolve captures, returning the resulting stones map.
    ///
    /// `self` is left untouched. No suicide check is performed. A move onto
    /// an occupied point (seen in noisy hand-typed diagrams) overwrites the
    /// stone without computing captures.
    pub fn place_move(&self, point: Point, color: Color) -> Stones {
        let mut stones = self.stones.clone();
        match self.captured_strings(point, color) {
            Some(captures) => {
                for group in &captures {
                    for pt in &group.points {
                        stones.remove(pt);
                    }
                }
            }
            None => log::debug!("move at {point:?} replays onto an occupied point"),
        }
        stones.insert(point, color);
        stones
    }

    /// All groups currently down to one liberty. Computed once and cached.
    pub fn potential_captures(&self) -> &[Group] {
        self.one_liberty_groups.get_or_init(|| {
            let mut processed: BTreeSet<Point> = BTreeSet::new();
            let mut groups = Vec::new();
            for &pt in self.stones.keys() {
                if processed.contains(&pt) {
                    continue;
                }
                let group = self.group_at(pt);
                processed.extend(group.points.iter().copied());
                if group.liberties.len() == 1 {
                    groups.push(group);
                }
            }
            groups
        })
    }

    /// For each one-liberty group, the speculative board reached by the
    /// opponent filling that liberty. Used to reconstruct plausible
    /// successor states when the explicit move order is unknown.
    pub fn after_captures(&self) -> &[Position] {
        self.post_capture_boards.get_or_init(|| {
            self.potential_captures()
                .iter()
                .filter_map(|group| {
                    let color = group.color?;
                    let liberty = *group.liberties.first()?;
                    let stones = self.place_move(liberty, color.opposite());
                    Some(Position::new(stones, self.board_width, self.board_height))
                })
                .collect()
        })
    }

    pub fn same_board_size(&self, other: &Position) -> bool {
        self.board_width == other.board_width && self.board_height == other.board_height
    }

    /// True iff `other` is the same board with exactly one stone added or
    /// removed. A recolored point, a moved stone (equal counts) or a
    /// multi-stone difference all fail.
    pub fn differs_by_one_stone(&self, other: &Position) -> bool {
        if !self.same_board_size(other) || self.number_stones == other.number_stones {
            return false;
        }

        let mut added = 0;
        for (point, &color) in &self.stones {
            match other.stones.get(point) {
                Some(&c) if c != color => return false,
                Some(_) => {}
                None => {
                    added += 1;
                    if added > 1 {
                        return false;
                    }
                }
            }
        }

        let mut removed = 0;
        for point in other.stones.keys() {
            if !self.stones.contains_key(point) {
                removed += 1;
                if removed > 1 {
                    return false;
                }
            }
        }

        added == 1 || removed == 1
    }

    /// Stone-for-stone subset test: every stone of `self` sits unchanged in
    /// `other`.
    pub fn is_subset_of(&self, other: &Position) -> bool {
        self.stones
            .iter()
            .all(|(point, color)| other.stones.get(point) == Some(color))
    }

    /// Stones present in `self` but absent from `other`.
    pub fn added_stones(&self, other: &Position) -> Stones {
        self.stones
            .iter()
            .filter(|(point, _)| !other.stones.contains_key(point))
            .map(|(&point, &color)| (point, color))
            .collect()
    }

    /// Canonical representation of this position's stones; doubles as the
    /// de-duplication key and the textual reconstruction of the diagram.
    pub fn rep(&self) -> String {
        stones_rep(&self.stones, self.board_width, self.board_height)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rep())
    }
}

/// Canonical representation of a stones map: row-major, one display
/// character per point followed by a space, one line per row.
pub fn stones_rep(stones: &Stones, width: usize, height: usize) -> String {
    let mut rep = String::with_capacity(height * (2 * width + 1));
    for row in 1..=height {
        for column in 1..=width {
            rep.push(symbols::stone_char(stones.get(&(column, row)).copied()));
            rep.push(' ');
        }
        rep.push('\n');
    }
    rep
}
