use qmmm_partition::engine::host::AtomOrdering;

pub struct DefaultsConfig {
    pub mm_selection: String,
    pub atom_ordering: AtomOrdering,
    pub target_selection: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            mm_selection: "all".to_string(),
            atom_ordering: AtomOrdering::Retained,
            target_selection: "qm".to_string(),
        }
    }
}
