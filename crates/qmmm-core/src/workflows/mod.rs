//! # Workflows Module
//!
//! The public entry points: writing a QM/MM partition of a host's structure
//! as a CP2K `&QMMM` section, and restoring a QM selection from such a section.
//!
//! - **Generation** ([`generate`]) - Cell, QM kinds and boundary links from two selections
//! - **Loading** ([`load`]) - Re-creating the QM selection from the `&QM_KIND` blocks
//!
//! Both workflows require the host to keep atoms in file order (see
//! [`AtomOrdering`]): the section stores atom ids while selections address
//! atoms by position, and only then do the two coincide.

use crate::engine::error::EngineError;
use crate::engine::host::{AtomOrdering, StructureHost};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub mod generate;
pub mod load;

#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Selection error: {0}")]
    Selection(#[from] EngineError),

    #[error(
        "The structure host does not retain the file's atom order, so atom indices would not match atom ids"
    )]
    UnstableAtomOrder,
}

fn ensure_retained_order<H: StructureHost + ?Sized>(host: &H) -> Result<(), PartitionError> {
    match host.atom_ordering() {
        AtomOrdering::Retained => Ok(()),
        AtomOrdering::Sorted => Err(PartitionError::UnstableAtomOrder),
    }
}
