//! # QM/MM Partition Library
//!
//! Generates and parses the QM/MM partition section (`&QMMM`) of CP2K input
//! files from molecular structures and atom selections.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`),
//!   the selection language, BGF structure I/O and the `&QMMM` text codec.
//!
//! - **[`engine`]: The Host Layer.** The `StructureHost` capability trait the
//!   workflows depend on, and `Session`, an in-memory host that owns loaded
//!   structures and named selections.
//!
//! - **[`workflows`]: The Public API.** `generate_partition` writes the section
//!   for a QM selection; `load_partition` turns a section back into a selection.

pub mod core;
pub mod engine;
pub mod workflows;
