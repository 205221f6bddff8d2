use super::inspect::describe;
use super::open_session;
use crate::cli::GenerateArgs;
use crate::config::{GenerateConfig, build_generate_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use qmmm_partition::core::io::qmmm::QmmmSection;
use qmmm_partition::engine::progress::ProgressReporter;
use qmmm_partition::workflows::generate::generate_partition;
use tracing::info;

pub async fn run(args: GenerateArgs) -> Result<()> {
    let config = build_generate_config(&args)?;
    let progress_handler = CliProgressHandler::for_stderr();

    println!("Generating QM/MM partition...");
    let section = tokio::task::block_in_place(|| execute(&config, &progress_handler))?;

    print!("{}", describe(&section));
    println!("✓ &QMMM section written to: {}", config.output.display());
    Ok(())
}

/// Loads the structure and writes the section described by `config`.
pub fn execute(config: &GenerateConfig, progress_handler: &CliProgressHandler) -> Result<QmmmSection> {
    let (session, _) = open_session(&config.structure)?;
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(
        "Partitioning with QM = '{}' and MM = '{}'",
        config.qm_selection, config.mm_selection
    );
    let section = generate_partition(
        &session,
        &config.output,
        &config.qm_selection,
        &config.mm_selection,
        &reporter,
    )?;
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::config::StructureConfig;
    use crate::error::CliError;
    use qmmm_partition::engine::host::AtomOrdering;
    use qmmm_partition::workflows::PartitionError;
    use std::path::Path;
    use tempfile::tempdir;

    fn config(dir: &Path, qm: &str, ordering: AtomOrdering) -> GenerateConfig {
        GenerateConfig {
            structure: StructureConfig {
                path: test_support::write_structure(dir),
                object_name: "ethyl".to_string(),
                atom_ordering: ordering,
                selections: vec![("methyl".to_string(), "index 1-4".to_string())],
            },
            qm_selection: qm.to_string(),
            mm_selection: "all".to_string(),
            output: dir.join("qmmm.inc"),
        }
    }

    #[test]
    fn execute_writes_the_section_for_a_named_selection() {
        let dir = tempdir().unwrap();
        let config = config(dir.path(), "methyl", AtomOrdering::Retained);

        let section = execute(&config, &CliProgressHandler::hidden()).unwrap();

        assert_eq!(section.kinds.len(), 2);
        assert_eq!(section.links.len(), 1);
        let written = std::fs::read_to_string(&config.output).unwrap();
        assert_eq!(
            written,
            "&QMMM\n\
             \x20 &CELL\n\
             \x20   ABC 6.50 7.35 7.56\n\
             \x20 &END CELL\n\
             \x20 &QM_KIND C\n\
             \x20   MM_INDEX 1\n\
             \x20 &END QM_KIND\n\
             \x20 &QM_KIND H\n\
             \x20   MM_INDEX 2 3 4\n\
             \x20 &END QM_KIND\n\
             \x20 &LINK\n\
             \x20   QM_INDEX 1\n\
             \x20   MM_INDEX 5\n\
             \x20   QM_KIND H\n\
             \x20 &END LINK\n\
             &END QMMM\n"
        );
    }

    #[test]
    fn execute_refuses_sorted_atom_order() {
        let dir = tempdir().unwrap();
        let config = config(dir.path(), "methyl", AtomOrdering::Sorted);

        let result = execute(&config, &CliProgressHandler::hidden());
        assert!(matches!(
            result,
            Err(CliError::Partition(PartitionError::UnstableAtomOrder))
        ));
        assert!(!config.output.exists());
    }

    #[test]
    fn execute_reports_empty_qm_selection() {
        let dir = tempdir().unwrap();
        let config = config(dir.path(), "resn HOH", AtomOrdering::Retained);

        let result = execute(&config, &CliProgressHandler::hidden());
        assert!(matches!(
            result,
            Err(CliError::Partition(PartitionError::Selection(_)))
        ));
        assert!(!config.output.exists());
    }
}
