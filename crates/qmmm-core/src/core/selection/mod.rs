//! A small selection language for addressing atoms of loaded structures.
//!
//! The syntax follows the subset of molecular-viewer selection algebra that
//! QM/MM setups typically need:
//!
//! ```text
//! all | none | <name>
//! index 1-20+25      (1-based position within the object)
//! id 100-120         (atom serial)
//! elem C+N | name CA+CB | resn HOH | resi 45-47 | chain A+B
//! not E | E and E | E or E | ( E )
//! ```
//!
//! `!`, `&` and `|` are accepted as short forms of `not`, `and` and `or`.
//! `not` binds tighter than `and`, which binds tighter than `or`.

pub mod expr;
pub mod parser;

pub use expr::SelectionExpr;
pub use parser::{SelectionParseError, is_valid_name, parse};
