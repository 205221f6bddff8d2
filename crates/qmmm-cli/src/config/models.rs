use qmmm_partition::engine::host::AtomOrdering;
use std::path::PathBuf;

/// The structure to load and how to load it.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureConfig {
    pub path: PathBuf,
    pub object_name: String,
    pub atom_ordering: AtomOrdering,
    /// Named selections created right after loading, in name order.
    pub selections: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateConfig {
    pub structure: StructureConfig,
    pub qm_selection: String,
    pub mm_selection: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    pub structure: StructureConfig,
    pub input: PathBuf,
    pub object: String,
    pub target_selection: String,
    pub subset_output: Option<PathBuf>,
}
