use super::error::EngineError;
use super::host::{AtomOrdering, AtomRef, StructureHost, parse_selection};
use crate::core::io::sorting::sorter::canonical_atom_order;
use crate::core::models::atom::Atom;
use crate::core::models::ids::ObjectId;
use crate::core::models::system::MolecularSystem;
use crate::core::selection::{SelectionExpr, is_valid_name};
use crate::core::utils::geometry::BoundingBox;
use nalgebra::Point3;
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};

/// A structure loaded into a [`Session`] under a name.
#[derive(Debug, Clone)]
pub struct MolecularObject {
    name: String,
    system: MolecularSystem,
}

impl MolecularObject {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system(&self) -> &MolecularSystem {
        &self.system
    }
}

enum Membership {
    Selection(HashSet<AtomRef>),
    Object(ObjectId),
}

/// An in-memory [`StructureHost`]: named objects plus named selections.
///
/// Objects and selections share one namespace. Selections store atom
/// references in natural order (objects in load order, then internal index).
#[derive(Debug, Default)]
pub struct Session {
    ordering: AtomOrdering,
    objects: SlotMap<ObjectId, MolecularObject>,
    load_order: Vec<ObjectId>,
    object_names: HashMap<String, ObjectId>,
    selections: HashMap<String, Vec<AtomRef>>,
}

impl Session {
    pub fn new(ordering: AtomOrdering) -> Self {
        Self {
            ordering,
            ..Default::default()
        }
    }

    pub fn ordering(&self) -> AtomOrdering {
        self.ordering
    }

    /// Adds `system` as a new object called `name`.
    ///
    /// With [`AtomOrdering::Sorted`] the atoms are re-sorted canonically first,
    /// so internal indices no longer follow file order.
    pub fn load_object(&mut self, name: &str, system: MolecularSystem) -> Result<ObjectId, EngineError> {
        if !is_valid_name(name) {
            return Err(EngineError::InvalidName(name.to_string()));
        }
        if self.object_names.contains_key(name) || self.selections.contains_key(name) {
            return Err(EngineError::NameInUse(name.to_string()));
        }

        let system = match self.ordering {
            AtomOrdering::Retained => system,
            AtomOrdering::Sorted => system.reordered(&canonical_atom_order(&system)),
        };
        let id = self.objects.insert(MolecularObject {
            name: name.to_string(),
            system,
        });
        self.load_order.push(id);
        self.object_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&MolecularObject> {
        self.objects.get(id)
    }

    pub fn object_by_name(&self, name: &str) -> Option<(ObjectId, &MolecularObject)> {
        let id = *self.object_names.get(name)?;
        self.objects.get(id).map(|object| (id, object))
    }

    /// Loaded objects in load order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &MolecularObject)> + '_ {
        self.load_order
            .iter()
            .filter_map(|&id| self.objects.get(id).map(|object| (id, object)))
    }

    pub fn selection(&self, name: &str) -> Option<&[AtomRef]> {
        self.selections.get(name).map(Vec::as_slice)
    }

    pub fn atom(&self, atom: AtomRef) -> Result<&Atom, EngineError> {
        self.objects
            .get(atom.object)
            .and_then(|object| object.system.atom(atom.index))
            .ok_or(EngineError::DanglingAtom(atom))
    }

    /// Parses `expression` and stores its result as the selection `name`.
    pub fn define_selection(&mut self, name: &str, expression: &str) -> Result<usize, EngineError> {
        let expr = parse_selection(expression)?;
        self.select(name, &expr)
    }

    /// Ids of the atoms in the selection `name`, in natural order.
    pub fn selection_ids(&self, name: &str) -> Result<Vec<usize>, EngineError> {
        let atoms = self
            .selections
            .get(name)
            .ok_or_else(|| EngineError::UnknownName(name.to_string()))?;
        atoms.iter().map(|&atom| self.resolve_id(atom)).collect()
    }

    /// All atoms matched by `expression`, in natural order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownName`] if the expression refers to a name
    /// that is neither a selection nor an object.
    pub fn evaluate(&self, expression: &SelectionExpr) -> Result<Vec<AtomRef>, EngineError> {
        let mut memberships: HashMap<&str, Membership> = HashMap::new();
        for name in expression.referenced_names() {
            if memberships.contains_key(name) {
                continue;
            }
            let membership = if let Some(atoms) = self.selections.get(name) {
                Membership::Selection(atoms.iter().copied().collect())
            } else if let Some(&id) = self.object_names.get(name) {
                Membership::Object(id)
            } else {
                return Err(EngineError::UnknownName(name.to_string()));
            };
            memberships.insert(name, membership);
        }

        let mut matched = Vec::new();
        for (object_id, object) in self.objects() {
            for (index, atom) in object.system.atoms().iter().enumerate() {
                let atom_ref = AtomRef::new(object_id, index);
                let is_member = |name: &str| match memberships.get(name) {
                    Some(Membership::Selection(atoms)) => atoms.contains(&atom_ref),
                    Some(Membership::Object(id)) => *id == object_id,
                    None => false,
                };
                if expression.matches(index + 1, atom, &is_member) {
                    matched.push(atom_ref);
                }
            }
        }
        Ok(matched)
    }

    /// Copies the atoms matched by `expression` into a new system, keeping
    /// bonds between copied atoms. Atoms of several objects are concatenated
    /// in load order.
    pub fn extract(&self, expression: &SelectionExpr) -> Result<MolecularSystem, EngineError> {
        let matched = self.evaluate(expression)?;
        let mut result = MolecularSystem::new();

        for (object_id, object) in self.objects() {
            let indices: Vec<usize> = matched
                .iter()
                .filter(|atom| atom.object == object_id)
                .map(|atom| atom.index)
                .collect();
            if indices.is_empty() {
                continue;
            }

            let subset = object.system.extract(&indices);
            let offset = result.atom_count();
            for atom in subset.atoms() {
                result.add_atom(atom.clone());
            }
            for bond in subset.bonds() {
                result.add_bond(offset + bond.atom1_idx, offset + bond.atom2_idx, bond.order);
            }
        }

        Ok(result)
    }
}

impl StructureHost for Session {
    fn atom_ordering(&self) -> AtomOrdering {
        self.ordering
    }

    fn bounding_box(&self, selection: &SelectionExpr) -> Result<BoundingBox, EngineError> {
        let positions = self
            .evaluate(selection)?
            .into_iter()
            .map(|atom| self.atom(atom).map(|a| a.position))
            .collect::<Result<Vec<Point3<f64>>, _>>()?;
        BoundingBox::from_points(&positions)
            .ok_or_else(|| EngineError::EmptySelection(selection.to_string()))
    }

    fn for_each_atom(
        &self,
        selection: &SelectionExpr,
        visit: &mut dyn FnMut(usize, &str),
    ) -> Result<(), EngineError> {
        for atom_ref in self.evaluate(selection)? {
            let atom = self.atom(atom_ref)?;
            visit(atom.serial, &atom.kind_symbol());
        }
        Ok(())
    }

    fn bond_list(&self, selection: &SelectionExpr) -> Result<Vec<(AtomRef, AtomRef)>, EngineError> {
        let matched: HashSet<AtomRef> = self.evaluate(selection)?.into_iter().collect();
        if matched.is_empty() {
            return Err(EngineError::EmptySelection(selection.to_string()));
        }

        let mut bonds = Vec::new();
        for (object_id, object) in self.objects() {
            for bond in object.system.bonds() {
                let a = AtomRef::new(object_id, bond.atom1_idx);
                let b = AtomRef::new(object_id, bond.atom2_idx);
                if matched.contains(&a) && matched.contains(&b) {
                    bonds.push((a, b));
                }
            }
        }
        Ok(bonds)
    }

    fn resolve_id(&self, atom: AtomRef) -> Result<usize, EngineError> {
        self.atom(atom).map(|a| a.serial)
    }

    fn select(&mut self, target: &str, expression: &SelectionExpr) -> Result<usize, EngineError> {
        if !is_valid_name(target) {
            return Err(EngineError::InvalidName(target.to_string()));
        }
        if self.object_names.contains_key(target) {
            return Err(EngineError::NameInUse(target.to_string()));
        }

        let matched = self.evaluate(expression)?;
        let count = matched.len();
        self.selections.insert(target.to_string(), matched);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Element;
    use crate::core::models::topology::BondOrder;

    // O-C-N chain; file order matches ids 10, 11, 12.
    fn create_fragment() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        let o = system.add_atom(Atom::new(10, "O", Element::O, Point3::new(1.0, 0.0, 0.0)));
        let c = system.add_atom(Atom::new(11, "CA", Element::C, Point3::new(0.0, 0.0, 0.0)));
        let n = system.add_atom(Atom::new(12, "N", Element::N, Point3::new(-1.0, 2.0, 0.5)));
        system.add_bond(o, c, BondOrder::Single).unwrap();
        system.add_bond(c, n, BondOrder::Single).unwrap();
        system
    }

    fn create_session() -> Session {
        let mut session = Session::new(AtomOrdering::Retained);
        session.load_object("frag", create_fragment()).unwrap();
        session
    }

    fn expr(text: &str) -> SelectionExpr {
        parse_selection(text).unwrap()
    }

    #[test]
    fn load_object_rejects_bad_and_duplicate_names() {
        let mut session = create_session();
        assert!(matches!(
            session.load_object("frag", create_fragment()),
            Err(EngineError::NameInUse(_))
        ));
        assert!(matches!(
            session.load_object("two words", create_fragment()),
            Err(EngineError::InvalidName(_))
        ));
        session.define_selection("qm", "all").unwrap();
        assert!(matches!(
            session.load_object("qm", create_fragment()),
            Err(EngineError::NameInUse(_))
        ));
    }

    #[test]
    fn retained_ordering_keeps_file_order() {
        let session = create_session();
        let (_, object) = session.object_by_name("frag").unwrap();
        let serials: Vec<_> = object.system().atoms().iter().map(|a| a.serial).collect();
        assert_eq!(serials, vec![10, 11, 12]);
        assert_eq!(object.name(), "frag");
    }

    #[test]
    fn sorted_ordering_reorders_atoms_and_breaks_index_id_correspondence() {
        let mut session = Session::new(AtomOrdering::Sorted);
        session.load_object("frag", create_fragment()).unwrap();
        assert_eq!(session.atom_ordering(), AtomOrdering::Sorted);

        // N sorts before CA, which sorts before O.
        session.define_selection("first", "index 1").unwrap();
        assert_eq!(session.selection_ids("first").unwrap(), vec![12]);
    }

    #[test]
    fn evaluate_resolves_objects_and_selections() {
        let mut session = create_session();
        assert_eq!(session.define_selection("heavy", "frag and not elem N").unwrap(), 2);
        assert_eq!(session.selection_ids("heavy").unwrap(), vec![10, 11]);

        let atoms = session.evaluate(&expr("heavy and index 2-3")).unwrap();
        assert_eq!(atoms.len(), 1);
        assert_eq!(session.resolve_id(atoms[0]).unwrap(), 11);
    }

    #[test]
    fn evaluate_rejects_unknown_names() {
        let session = create_session();
        assert!(matches!(
            session.evaluate(&expr("frag and ghost")),
            Err(EngineError::UnknownName(name)) if name == "ghost"
        ));
    }

    #[test]
    fn select_may_refer_to_its_own_previous_contents() {
        let mut session = create_session();
        session.define_selection("qm", "id 10").unwrap();
        assert_eq!(session.define_selection("qm", "frag & (qm | index 3)").unwrap(), 2);
        assert_eq!(session.selection_ids("qm").unwrap(), vec![10, 12]);
    }

    #[test]
    fn select_rejects_object_names_and_invalid_names() {
        let mut session = create_session();
        assert!(matches!(
            session.select("frag", &SelectionExpr::All),
            Err(EngineError::NameInUse(_))
        ));
        assert!(matches!(
            session.select("all", &SelectionExpr::All),
            Err(EngineError::InvalidName(_))
        ));
    }

    #[test]
    fn define_selection_reports_parse_errors() {
        let mut session = create_session();
        assert!(matches!(
            session.define_selection("qm", "index"),
            Err(EngineError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn bounding_box_covers_matched_atoms() {
        let session = create_session();
        let bbox = session.bounding_box(&expr("all")).unwrap();
        assert_eq!(bbox.min, Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(bbox.max, Point3::new(1.0, 2.0, 0.5));
        assert!(matches!(
            session.bounding_box(&expr("none")),
            Err(EngineError::EmptySelection(_))
        ));
    }

    #[test]
    fn for_each_atom_visits_in_natural_order() {
        let session = create_session();
        let mut visited = Vec::new();
        session
            .for_each_atom(&expr("not id 11"), &mut |id, kind| {
                visited.push((id, kind.to_string()))
            })
            .unwrap();
        assert_eq!(visited, vec![(10, "O".to_string()), (12, "N".to_string())]);
    }

    #[test]
    fn for_each_atom_reports_typed_symbols_for_unknown_elements() {
        let mut system = MolecularSystem::new();
        let mut metal = Atom::new(1, "M1", Element::Unknown, Point3::origin());
        metal.force_field_type = "Qq3".to_string();
        system.add_atom(metal);
        system.add_atom(Atom::new(2, "TI2", Element::Ti, Point3::origin()));

        let mut session = Session::new(AtomOrdering::Retained);
        session.load_object("metals", system).unwrap();

        let mut visited = Vec::new();
        session
            .for_each_atom(&expr("all"), &mut |id, kind| visited.push((id, kind.to_string())))
            .unwrap();
        assert_eq!(visited, vec![(1, "Qq".to_string()), (2, "Ti".to_string())]);
    }

    #[test]
    fn bond_list_keeps_only_bonds_inside_the_selection() {
        let session = create_session();
        let bonds = session.bond_list(&expr("id 10-11")).unwrap();
        assert_eq!(bonds.len(), 1);
        let (a, b) = bonds[0];
        assert_eq!((session.resolve_id(a).unwrap(), session.resolve_id(b).unwrap()), (10, 11));
        assert!(matches!(
            session.bond_list(&expr("none")),
            Err(EngineError::EmptySelection(_))
        ));
    }

    #[test]
    fn resolve_id_rejects_dangling_references() {
        let session = create_session();
        let (object, _) = session.object_by_name("frag").unwrap();
        assert!(matches!(
            session.resolve_id(AtomRef::new(object, 99)),
            Err(EngineError::DanglingAtom(_))
        ));
    }

    #[test]
    fn extract_concatenates_objects_in_load_order() {
        let mut session = create_session();
        let mut second = MolecularSystem::new();
        second.add_atom(Atom::new(20, "OW", Element::O, Point3::origin()));
        second.add_atom(Atom::new(21, "HW1", Element::H, Point3::origin()));
        second.add_bond(0, 1, BondOrder::Single).unwrap();
        session.load_object("water", second).unwrap();

        let subset = session.extract(&expr("id 11+12+20+21")).unwrap();
        let serials: Vec<_> = subset.atoms().iter().map(|a| a.serial).collect();
        assert_eq!(serials, vec![11, 12, 20, 21]);
        assert_eq!(subset.bonds().len(), 2);
        assert_eq!(subset.bonded_neighbors(2).unwrap(), &[3]);
    }

    #[test]
    fn selection_ids_of_unknown_selection_fails() {
        let session = create_session();
        assert!(matches!(
            session.selection_ids("qm"),
            Err(EngineError::UnknownName(_))
        ));
    }
}
