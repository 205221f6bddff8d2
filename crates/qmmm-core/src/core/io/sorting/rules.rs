use phf::{Map, phf_map};

/// Priority of well-known atom names within a residue. Lower sorts first;
/// names missing from the table sort after all listed names, alphabetically.
#[rustfmt::skip]
pub static ATOM_NAME_PRIORITY: Map<&'static str, i32> = phf_map! {
    // Backbone amide
    "N" => 0, "H" => 1, "HN" => 1, "H1" => 2, "H2" => 3, "H3" => 4,
    // Alpha carbon
    "CA" => 10, "HA" => 11, "HA2" => 12, "HA3" => 13,
    // Carbonyl and C-terminus
    "C" => 20, "O" => 21, "OXT" => 22,
    // Side-chain branch points
    "CB" => 30, "CG" => 40, "CG1" => 41, "CG2" => 42, "OG" => 43, "OG1" => 44, "SG" => 45,
    "CD" => 50, "CD1" => 51, "CD2" => 52, "ND1" => 53, "ND2" => 54, "OD1" => 55, "OD2" => 56, "SD" => 57,
    "CE" => 60, "CE1" => 61, "CE2" => 62, "CE3" => 63, "NE" => 64, "NE1" => 65, "NE2" => 66, "OE1" => 67, "OE2" => 68,
    "CZ" => 70, "CZ2" => 71, "CZ3" => 72, "NZ" => 73,
    "CH2" => 80, "NH1" => 81, "NH2" => 82, "OH" => 83,
    // Water
    "OW" => 0, "HW1" => 1, "HW2" => 2,
};
