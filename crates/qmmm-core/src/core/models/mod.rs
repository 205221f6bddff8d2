//! # Core Models Module
//!
//! Data structures describing the molecular structures the QM/MM partition is
//! computed from.
//!
//! - [`atom`] - Atoms and chemical elements
//! - [`topology`] - Covalent bonds and bond orders
//! - [`system`] - A complete structure: ordered atoms plus bonds
//! - [`ids`] - Keys for structures loaded into a session
//!
//! Atoms are addressed in two ways throughout the crate: by *internal index*,
//! their position inside a [`system::MolecularSystem`], and by *id*, the
//! serial number carried by the structure file. Bonds use internal indices;
//! the `&QMMM` section uses ids.

pub mod atom;
pub mod ids;
pub mod system;
pub mod topology;
