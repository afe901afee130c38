//! Godiag: extract Go positions from ASCII forum diagrams.
//!
//! This crate parses the `$$`-prefixed ASCII board diagrams found in Go
//! forum posts and links the resulting board states into a de-duplicated
//! graph of positions connected by moves.
//!
//! ## Modules
//!
//! - [`symbols`] - The fixed diagram alphabet: stones, markers, move digits
//! - [`diagram`] - The diagram grammar (title line, borders, content rows)
//! - [`position`] - Board snapshots: groups, liberties, captures
//! - [`fragment`] - One parsed diagram and its move-by-move position chain
//! - [`position_list`] - The shared, de-duplicating position registry
//! - [`error`] - Parse and embed error types
//!
//! ## Example
//!
//! ```
//! use godiag::fragment::Fragment;
//! use godiag::position_list::PositionList;
//!
//! let text = "\
//! $$B
//! $$ . . . . .
//! $$ . 1 . . .
//! $$ . . 2 . .
//! $$ . . . . .
//! $$ . . . . .";
//!
//! let mut positions = PositionList::new();
//! let fragment = Fragment::parse(text, &mut positions).unwrap();
//!
//! // the empty board, then one position per numbered move
//! assert_eq!(fragment.children.len(), 3);
//! println!("{}", positions.get(fragment.children[2]));
//! ```

pub mod diagram;
pub mod error;
pub mod fragment;
pub mod position;
pub mod position_list;
pub mod symbols;
