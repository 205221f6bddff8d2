use super::rules::ATOM_NAME_PRIORITY;
use crate::core::models::atom::Atom;
use crate::core::models::system::MolecularSystem;
use std::cmp::Ordering;

/// Returns the internal indices of `system`'s atoms in canonical order:
/// chain, then residue number, then atom-name priority. Ties keep file order.
pub fn canonical_atom_order(system: &MolecularSystem) -> Vec<usize> {
    let atoms = system.atoms();
    let mut order: Vec<usize> = (0..atoms.len()).collect();
    order.sort_by(|&a, &b| compare_atoms(&atoms[a], &atoms[b]));
    order
}

fn compare_atoms(a: &Atom, b: &Atom) -> Ordering {
    a.chain_id
        .cmp(&b.chain_id)
        .then_with(|| a.res_id.cmp(&b.res_id))
        .then_with(|| compare_atom_names(&a.name, &b.name))
}

fn compare_atom_names(name_a: &str, name_b: &str) -> Ordering {
    let trimmed_a = name_a.trim();
    let trimmed_b = name_b.trim();

    let weight_a = ATOM_NAME_PRIORITY
        .get(trimmed_a)
        .copied()
        .unwrap_or(i32::MAX);
    let weight_b = ATOM_NAME_PRIORITY
        .get(trimmed_b)
        .copied()
        .unwrap_or(i32::MAX);

    weight_a
        .cmp(&weight_b)
        .then_with(|| trimmed_a.cmp(trimmed_b))
}
