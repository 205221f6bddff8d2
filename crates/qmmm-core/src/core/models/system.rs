use super::atom::Atom;
use super::topology::{Bond, BondOrder};
use std::collections::HashMap;

/// A molecular structure: an ordered list of atoms and the bonds between them.
///
/// An atom's position in [`atoms`](Self::atoms) is its internal index. Bonds
/// refer to atoms by internal index; the structure file's atom ids are kept in
/// [`Atom::serial`] and can be looked up through
/// [`atom_by_serial`](Self::atom_by_serial).
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    serial_map: HashMap<usize, usize>,
    bond_adjacency: Vec<Vec<usize>>,
}

impl MolecularSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Returns the internal index of the atom carrying `serial`.
    pub fn index_of_serial(&self, serial: usize) -> Option<usize> {
        self.serial_map.get(&serial).copied()
    }

    pub fn atom_by_serial(&self, serial: usize) -> Option<&Atom> {
        self.index_of_serial(serial)
            .and_then(|idx| self.atoms.get(idx))
    }

    /// Appends an atom and returns its internal index.
    ///
    /// Serials are expected to be unique; if one repeats, serial lookups
    /// resolve to the most recently added atom.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        let index = self.atoms.len();
        self.serial_map.insert(atom.serial, index);
        self.atoms.push(atom);
        self.bond_adjacency.push(Vec::new());
        index
    }

    /// Adds a bond between two atoms given by internal index.
    ///
    /// Adding an existing bond (in either direction) succeeds without creating
    /// a duplicate. Self-bonds and out-of-range indices return `None`.
    pub fn add_bond(&mut self, atom1_idx: usize, atom2_idx: usize, order: BondOrder) -> Option<()> {
        if atom1_idx == atom2_idx || atom1_idx >= self.atoms.len() || atom2_idx >= self.atoms.len()
        {
            return None;
        }
        if self.bond_adjacency[atom1_idx].contains(&atom2_idx) {
            return Some(());
        }

        self.bonds.push(Bond::new(atom1_idx, atom2_idx, order));
        self.bond_adjacency[atom1_idx].push(atom2_idx);
        self.bond_adjacency[atom2_idx].push(atom1_idx);
        Some(())
    }

    /// Adds a bond between the atoms carrying the given serials.
    pub fn add_bond_by_serial(&mut self, serial1: usize, serial2: usize, order: BondOrder) -> Option<()> {
        let idx1 = self.index_of_serial(serial1)?;
        let idx2 = self.index_of_serial(serial2)?;
        self.add_bond(idx1, idx2, order)
    }

    pub fn bonded_neighbors(&self, index: usize) -> Option<&[usize]> {
        self.bond_adjacency.get(index).map(Vec::as_slice)
    }

    /// Builds a new system holding the atoms at `indices`, in that order.
    ///
    /// Bonds are kept only when both endpoints are included. Unknown indices
    /// are skipped.
    pub fn extract(&self, indices: &[usize]) -> MolecularSystem {
        let mut subset = MolecularSystem::new();
        let mut remap: HashMap<usize, usize> = HashMap::with_capacity(indices.len());

        for &old_idx in indices {
            if remap.contains_key(&old_idx) {
                continue;
            }
            if let Some(atom) = self.atoms.get(old_idx) {
                let new_idx = subset.add_atom(atom.clone());
                remap.insert(old_idx, new_idx);
            }
        }

        for bond in &self.bonds {
            if let (Some(&a), Some(&b)) = (remap.get(&bond.atom1_idx), remap.get(&bond.atom2_idx))
            {
                subset.add_bond(a, b, bond.order);
            }
        }

        subset
    }

    /// Returns a copy with atoms permuted into `order`, which must be a
    /// permutation of `0..atom_count()`. Bonds follow their atoms.
    pub fn reordered(&self, order: &[usize]) -> MolecularSystem {
        self.extract(order)
    }
}
