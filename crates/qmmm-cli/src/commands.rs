pub mod generate;
pub mod inspect;
pub mod load;

use crate::config::StructureConfig;
use crate::error::{CliError, Result};
use qmmm_partition::core::io::bgf::{BgfFile, BgfMetadata};
use qmmm_partition::core::io::traits::MolecularFile;
use qmmm_partition::engine::session::Session;
use tracing::info;

/// Reads the structure into a fresh session and defines the configured
/// selections on it.
pub fn open_session(config: &StructureConfig) -> Result<(Session, BgfMetadata)> {
    info!("Loading structure from {:?}", &config.path);
    let (system, metadata) =
        BgfFile::read_from_path(&config.path).map_err(|e| CliError::FileParsing {
            path: config.path.clone(),
            source: e.into(),
        })?;

    let mut session = Session::new(config.atom_ordering);
    let atom_count = system.atom_count();
    session.load_object(&config.object_name, system)?;
    info!(
        "Loaded {} atoms as object '{}' ({:?} atom order).",
        atom_count, config.object_name, config.atom_ordering
    );

    for (name, expression) in &config.selections {
        let count = session.define_selection(name, expression)?;
        info!("Defined selection '{}' ({} atoms): {}", name, count, expression);
    }

    Ok((session, metadata))
}
