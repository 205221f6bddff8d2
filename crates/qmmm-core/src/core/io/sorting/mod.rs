//! Canonical atom ordering.
//!
//! Molecular viewers that do not retain the file order re-sort atoms on load:
//! by chain, then residue number, then a fixed atom-name priority. This module
//! reproduces that ordering so a session can model a host in which atom
//! positions (indices) no longer follow atom ids.

pub mod rules;
pub mod sorter;
