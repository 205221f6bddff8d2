use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use qmmm_partition::core::io::qmmm::QmmmSection;
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub async fn run(args: InspectArgs) -> Result<()> {
    let section = read_section(&args.input)?;
    info!(
        "Parsed {} kinds and {} links from {:?}",
        section.kinds.len(),
        section.links.len(),
        &args.input
    );
    print!("{}", describe(&section));
    Ok(())
}

pub fn read_section(path: &Path) -> Result<QmmmSection> {
    let file = File::open(path)?;
    QmmmSection::read_from(&mut BufReader::new(file)).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Human-readable summary of a section: the cell, one line per kind and one
/// line per link.
pub fn describe(section: &QmmmSection) -> String {
    let mut out = String::new();
    match &section.cell {
        Some(cell) => {
            let [a, b, c] = cell.abc;
            let _ = writeln!(out, "Cell: {:.2} x {:.2} x {:.2} A", a, b, c);
        }
        None => out.push_str("Cell: not specified\n"),
    }

    let qm_atoms = section.qm_indices().count();
    let _ = writeln!(
        out,
        "QM atoms: {} in {} kind(s)",
        qm_atoms,
        section.kinds.len()
    );
    for kind in &section.kinds {
        let ids: Vec<String> = kind.mm_indices.iter().map(usize::to_string).collect();
        let _ = writeln!(
            out,
            "  {:<3} {:>5}  {}",
            kind.element,
            kind.mm_indices.len(),
            ids.join(" ")
        );
    }

    let _ = writeln!(out, "Links: {}", section.links.len());
    for link in &section.links {
        let _ = writeln!(
            out,
            "  QM {} - MM {} (capped with {})",
            link.qm_index, link.mm_index, link.kind
        );
    }
    out
}
