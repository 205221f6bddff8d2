//! Reading and writing of structure files and of the CP2K `&QMMM` section.
//!
//! Structure formats implement the [`traits::MolecularFile`] trait; the
//! `&QMMM` codec lives in [`qmmm`]. Canonical atom ordering, used when a
//! session does not retain file order, is in [`sorting`].

pub mod bgf;
pub mod qmmm;
pub mod sorting;
pub mod traits;
