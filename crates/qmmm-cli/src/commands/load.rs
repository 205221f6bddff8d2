use super::open_session;
use crate::cli::LoadArgs;
use crate::config::{LoadConfig, build_load_config};
use crate::error::{CliError, Result};
use qmmm_partition::core::io::bgf::{BgfError, BgfFile};
use qmmm_partition::core::io::traits::MolecularFile;
use qmmm_partition::core::selection::SelectionExpr;
use qmmm_partition::workflows::load::load_partition;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{info, warn};

/// What a load run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    /// Number of ids read from the section, repeats included.
    pub listed: usize,
    /// Ids of the atoms now in the target selection.
    pub selected_ids: Vec<usize>,
}

pub async fn run(args: LoadArgs) -> Result<()> {
    let config = build_load_config(&args)?;
    let outcome = tokio::task::block_in_place(|| execute(&config))?;

    println!("{} atoms selected", outcome.listed);
    if !outcome.selected_ids.is_empty() {
        let ids: Vec<String> = outcome.selected_ids.iter().map(usize::to_string).collect();
        println!("{}: {}", config.target_selection, ids.join(" "));
    }
    if let Some(path) = &config.subset_output {
        println!("✓ Selected atoms written to: {}", path.display());
    }
    Ok(())
}

/// Loads the structure, restores the QM selection and optionally writes the
/// selected atoms out as a BGF file.
pub fn execute(config: &LoadConfig) -> Result<LoadOutcome> {
    let (mut session, metadata) = open_session(&config.structure)?;

    let listed = load_partition(
        &mut session,
        &config.input,
        &config.object,
        &config.target_selection,
    )?;

    if listed == 0 {
        warn!("No QM atom ids found in {:?}", &config.input);
        return Ok(LoadOutcome {
            listed,
            selected_ids: Vec::new(),
        });
    }

    let selected_ids = session.selection_ids(&config.target_selection)?;
    info!(
        "Selection '{}' now holds {} atoms.",
        config.target_selection,
        selected_ids.len()
    );

    if let Some(path) = &config.subset_output {
        let subset = session.extract(&SelectionExpr::named(config.target_selection.as_str()))?;
        info!("Writing {} atoms to {:?}", subset.atom_count(), path);

        let file_error = |e: BgfError| CliError::FileParsing {
            path: path.clone(),
            source: e.into(),
        };
        let mut writer = BufWriter::new(File::create(path)?);
        BgfFile::write_to(&subset, &metadata, &mut writer).map_err(file_error)?;
        writer.flush()?;
    }

    Ok(LoadOutcome {
        listed,
        selected_ids,
    })
}
