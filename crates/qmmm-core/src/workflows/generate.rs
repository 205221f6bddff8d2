use super::{PartitionError, ensure_retained_order};
use crate::core::io::qmmm::{Cell, Link, QmKind, QmmmSection};
use crate::core::selection::SelectionExpr;
use crate::engine::error::EngineError;
use crate::engine::host::{StructureHost, parse_selection};
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Writes the `&QMMM` section for the QM region `qm_selection` to
/// `output_path`, overwriting any existing file.
///
/// Links are searched among the bonds of `mm_selection`, which normally
/// covers the whole system. The complete section is built before the file is
/// created, so a selection error leaves an existing file untouched.
///
/// # Errors
///
/// - [`PartitionError::UnstableAtomOrder`] if the host re-sorts atoms.
/// - [`PartitionError::Selection`] if either expression is invalid, refers to
///   an unknown name or matches no atoms.
/// - [`PartitionError::Io`] if the output file cannot be created or written.
#[instrument(skip_all, name = "generate_workflow", fields(output = %output_path.display()))]
pub fn generate_partition<H: StructureHost + ?Sized>(
    host: &H,
    output_path: &Path,
    qm_selection: &str,
    mm_selection: &str,
    reporter: &ProgressReporter,
) -> Result<QmmmSection, PartitionError> {
    ensure_retained_order(host)?;
    let qm = parse_selection(qm_selection)?;
    let mm = parse_selection(mm_selection)?;

    let section = build_section(host, &qm, &mm, reporter)?;

    reporter.report(Progress::PhaseStart { name: "Writing" });
    write_section(&section, output_path)?;
    reporter.report(Progress::Message(format!(
        "Wrote {} QM atoms in {} kinds and {} links to {}",
        section.qm_indices().count(),
        section.kinds.len(),
        section.links.len(),
        output_path.display()
    )));
    reporter.report(Progress::PhaseFinish);

    info!(
        kinds = section.kinds.len(),
        links = section.links.len(),
        "QM/MM section written."
    );
    Ok(section)
}

/// Computes the cell, kinds and links without touching the filesystem.
pub fn build_section<H: StructureHost + ?Sized>(
    host: &H,
    qm: &SelectionExpr,
    mm: &SelectionExpr,
    reporter: &ProgressReporter,
) -> Result<QmmmSection, PartitionError> {
    reporter.report(Progress::PhaseStart { name: "Cell" });
    let bbox = host.bounding_box(qm)?;
    let cell = Cell::from_bounding_box(&bbox);
    debug!(abc = ?cell.abc, "QM cell computed.");
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "QM Kinds" });
    let kinds = group_kinds(host, qm)?;
    debug!(kinds = kinds.len(), "QM atoms grouped by element.");
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Links" });
    let links = find_links(host, qm, mm, reporter)?;
    debug!(links = links.len(), "Boundary bonds detected.");
    reporter.report(Progress::PhaseFinish);

    Ok(QmmmSection {
        cell: Some(cell),
        kinds,
        links,
    })
}

/// One kind per distinct kind symbol, sorted by symbol. Ids keep the host's
/// natural order.
fn group_kinds<H: StructureHost + ?Sized>(
    host: &H,
    qm: &SelectionExpr,
) -> Result<Vec<QmKind>, EngineError> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    host.for_each_atom(qm, &mut |id: usize, kind: &str| match groups.get_mut(kind) {
        Some(ids) => ids.push(id),
        None => {
            groups.insert(kind.to_string(), vec![id]);
        }
    })?;

    Ok(groups
        .into_iter()
        .map(|(element, mm_indices)| QmKind {
            element,
            mm_indices,
        })
        .collect())
}

/// A link for every bond of `mm` with exactly one endpoint in `qm`, oriented
/// QM atom first.
fn find_links<H: StructureHost + ?Sized>(
    host: &H,
    qm: &SelectionExpr,
    mm: &SelectionExpr,
    reporter: &ProgressReporter,
) -> Result<Vec<Link>, EngineError> {
    let mut qm_ids = HashSet::new();
    host.for_each_atom(qm, &mut |id: usize, _: &str| {
        qm_ids.insert(id);
    })?;

    let bonds = host.bond_list(mm)?;
    reporter.report(Progress::TaskStart {
        total_steps: bonds.len() as u64,
    });

    let mut links = Vec::new();
    for (atom_a, atom_b) in bonds {
        let id_a = host.resolve_id(atom_a)?;
        let id_b = host.resolve_id(atom_b)?;
        match (qm_ids.contains(&id_a), qm_ids.contains(&id_b)) {
            (true, false) => links.push(Link::new(id_a, id_b)),
            (false, true) => links.push(Link::new(id_b, id_a)),
            _ => {}
        }
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    Ok(links)
}

fn write_section(section: &QmmmSection, path: &Path) -> Result<(), PartitionError> {
    let io_error = |source| PartitionError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    section.write_to(&mut writer).map_err(io_error)?;
    writer.flush().map_err(io_error)?;
    Ok(())
}
