use super::{PartitionError, ensure_retained_order};
use crate::core::io::qmmm::scan_kind_indices;
use crate::core::selection::SelectionExpr;
use crate::engine::host::StructureHost;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Restores a QM selection from the `&QM_KIND` blocks of a `&QMMM` section.
///
/// Every id listed on an `MM_INDEX` line inside a `&QM_KIND` block is taken as
/// a 1-based atom index of `object_name`; the selection `target_selection` is
/// replaced by exactly those atoms. Returns the number of ids read, counting
/// repeats. When the file lists no ids the selection is left as it was.
///
/// # Errors
///
/// - [`PartitionError::UnstableAtomOrder`] if the host re-sorts atoms.
/// - [`PartitionError::Io`] if the file cannot be opened or read.
/// - [`PartitionError::Selection`] if `object_name` is unknown or
///   `target_selection` is not a usable selection name.
#[instrument(skip_all, name = "load_workflow", fields(input = %input_path.display()))]
pub fn load_partition<H: StructureHost + ?Sized>(
    host: &mut H,
    input_path: &Path,
    object_name: &str,
    target_selection: &str,
) -> Result<usize, PartitionError> {
    ensure_retained_order(host)?;

    let io_error = |source| PartitionError::Io {
        path: input_path.to_path_buf(),
        source,
    };
    let file = File::open(input_path).map_err(io_error)?;
    let indices = scan_kind_indices(BufReader::new(file)).map_err(io_error)?;

    let count = indices.len();
    if count == 0 {
        info!("No QM kind indices found; selection left unchanged.");
        return Ok(0);
    }

    let distinct = indices.iter().collect::<HashSet<_>>().len();
    let expression = SelectionExpr::named(object_name).and(SelectionExpr::index_set(indices));
    let selected = host.select(target_selection, &expression)?;

    if selected < distinct {
        warn!(
            listed = distinct,
            selected,
            object = object_name,
            "Some listed indices do not exist in the object."
        );
    }
    info!(count, selected, selection = target_selection, "QM selection loaded.");
    Ok(count)
}
