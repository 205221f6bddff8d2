use thiserror::Error;

use super::host::AtomRef;
use crate::core::selection::SelectionParseError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid selection expression '{expression}': {source}")]
    InvalidSelection {
        expression: String,
        #[source]
        source: SelectionParseError,
    },

    #[error("No selection or object named '{0}'")]
    UnknownName(String),

    #[error("Selection '{0}' matches no atoms")]
    EmptySelection(String),

    #[error("'{0}' cannot be used as a selection or object name")]
    InvalidName(String),

    #[error("The name '{0}' is already in use")]
    NameInUse(String),

    #[error("Atom reference {0:?} does not point to a loaded atom")]
    DanglingAtom(AtomRef),
}
