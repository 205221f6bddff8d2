use crate::error::{CliError, Result};
use qmmm_partition::engine::host::AtomOrdering;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileStructureConfig {
    pub path: Option<PathBuf>,
    pub object_name: Option<String>,
    pub atom_ordering: Option<AtomOrdering>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileGenerateConfig {
    pub qm_selection: Option<String>,
    pub mm_selection: Option<String>,
    pub output: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileLoadConfig {
    pub object: Option<String>,
    pub target_selection: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub structure: Option<FileStructureConfig>,
    /// Named selections in the order they appear in the file, so a later
    /// entry may refer to an earlier one.
    #[serde(default)]
    pub selections: toml::Table,
    pub generate: Option<FileGenerateConfig>,
    pub load: Option<FileLoadConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
