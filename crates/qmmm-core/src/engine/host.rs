//! The capability interface between the partition workflows and whatever owns
//! the loaded structures and the named selections.

use super::error::EngineError;
use crate::core::models::ids::ObjectId;
use crate::core::selection::SelectionExpr;
use crate::core::utils::geometry::BoundingBox;
use serde::{Deserialize, Serialize};

/// How a host orders the atoms of a structure after loading it.
///
/// The `index` selection keyword addresses atoms by position, while the
/// `&QMMM` section lists atom ids. The two agree only when positions follow
/// file order, which is why the partition workflows insist on
/// [`AtomOrdering::Retained`].
///
/// [`AtomOrdering::Sorted`] models hosts that re-sort atoms on load. It is a
/// state the partition workflows detect and reject with
/// [`PartitionError::UnstableAtomOrder`](crate::workflows::PartitionError::UnstableAtomOrder)
/// rather than a mode they support; sessions still accept it so that the
/// rejection is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtomOrdering {
    /// Atoms keep the order of the structure file.
    #[default]
    Retained,
    /// Atoms are re-sorted by chain, residue and atom name.
    Sorted,
}

/// A host-level handle to one atom: the object it belongs to and its internal
/// index within that object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtomRef {
    pub object: ObjectId,
    pub index: usize,
}

impl AtomRef {
    pub fn new(object: ObjectId, index: usize) -> Self {
        Self { object, index }
    }
}

/// Structure and selection services the partition workflows rely on.
///
/// Atoms are always visited in natural order: objects in the order they were
/// loaded, atoms by ascending internal index.
pub trait StructureHost {
    /// The ordering policy atoms were loaded under.
    fn atom_ordering(&self) -> AtomOrdering;

    /// Computes the axis-aligned box around the atoms matched by `selection`.
    ///
    /// # Arguments
    ///
    /// * `selection` - The atoms to enclose.
    ///
    /// # Return
    ///
    /// Returns the minimum and maximum corners of the matched atoms.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownName`] if the selection references an
    /// undefined name, or [`EngineError::EmptySelection`] if it matches no atoms.
    fn bounding_box(&self, selection: &SelectionExpr) -> Result<BoundingBox, EngineError>;

    /// Visits every atom matched by `selection` in natural order.
    ///
    /// # Arguments
    ///
    /// * `selection` - The atoms to visit.
    /// * `visit` - Called with each atom's id and its kind symbol: the element
    ///   symbol, or for an atom of unknown element the symbol carried by its
    ///   type (see [`Atom::kind_symbol`](crate::core::models::atom::Atom::kind_symbol)).
    ///
    /// # Return
    ///
    /// Returns `Ok(())` once every matched atom has been visited. An empty
    /// match visits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownName`] if the selection references an
    /// undefined name.
    fn for_each_atom(
        &self,
        selection: &SelectionExpr,
        visit: &mut dyn FnMut(usize, &str),
    ) -> Result<(), EngineError>;

    /// Lists the bonds whose two endpoints are both matched by `selection`.
    ///
    /// # Arguments
    ///
    /// * `selection` - The atoms whose internal bonds are wanted.
    ///
    /// # Return
    ///
    /// Returns each bond once, as a pair of atom handles.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownName`] if the selection references an
    /// undefined name, or [`EngineError::EmptySelection`] if it matches no atoms.
    fn bond_list(&self, selection: &SelectionExpr) -> Result<Vec<(AtomRef, AtomRef)>, EngineError>;

    /// Resolves an atom handle to the id carried by the structure file.
    ///
    /// # Arguments
    ///
    /// * `atom` - A handle previously returned by this host.
    ///
    /// # Return
    ///
    /// Returns the atom's id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DanglingAtom`] if the handle does not point at
    /// an atom of a loaded object.
    fn resolve_id(&self, atom: AtomRef) -> Result<usize, EngineError>;

    /// Evaluates `expression` and stores the result as the selection `target`,
    /// replacing any previous selection of that name.
    ///
    /// The expression may refer to `target` itself; it is evaluated against
    /// the selection's previous contents.
    ///
    /// # Arguments
    ///
    /// * `target` - The selection name to define or replace.
    /// * `expression` - The atoms to store.
    ///
    /// # Return
    ///
    /// Returns the number of atoms now in `target`, which may be zero.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidName`] if `target` is not a valid name,
    /// [`EngineError::NameInUse`] if it names a loaded object, or
    /// [`EngineError::UnknownName`] if the expression references an undefined
    /// name.
    fn select(&mut self, target: &str, expression: &SelectionExpr) -> Result<usize, EngineError>;
}

/// Parses a selection expression, reporting failures as [`EngineError`].
pub fn parse_selection(expression: &str) -> Result<SelectionExpr, EngineError> {
    crate::core::selection::parse(expression).map_err(|source| EngineError::InvalidSelection {
        expression: expression.to_string(),
        source,
    })
}
