//! # Core Module
//!
//! Stateless building blocks: the molecular data model, the selection language,
//! file formats and geometry helpers. Nothing in here holds session state or
//! knows about named selections; that is the job of the [`crate::engine`] layer.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, elements, bonds and systems
//! - **Selection Language** ([`selection`]) - Parsing and per-atom evaluation of selection expressions
//! - **File I/O** ([`io`]) - BGF structure files, the CP2K `&QMMM` section, canonical atom ordering
//! - **Utilities** ([`utils`]) - Bounding boxes

pub mod io;
pub mod models;
pub mod selection;
pub mod utils;
