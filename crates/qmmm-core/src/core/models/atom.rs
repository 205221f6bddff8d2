use nalgebra::Point3;
use phf::{Map, phf_map};
use std::borrow::Cow;
use std::fmt;

/// Chemical element of an atom.
///
/// Every element of the periodic table is represented, numbered by atomic
/// number. [`Element::Lp`] and [`Element::Du`] are the pseudo-atoms some force
/// fields use; anything else parses to [`Element::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Element {
    // --- Period 1 ---
    H = 1,
    He,

    // --- Period 2 ---
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,

    // --- Period 3 ---
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,

    // --- Period 4 ---
    K,
    Ca,
    Sc,
    Ti,
    V,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Ga,
    Ge,
    As,
    Se,
    Br,
    Kr,

    // --- Period 5 ---
    Rb,
    Sr,
    Y,
    Zr,
    Nb,
    Mo,
    Tc,
    Ru,
    Rh,
    Pd,
    Ag,
    Cd,
    In,
    Sn,
    Sb,
    Te,
    I,
    Xe,

    // --- Period 6 ---
    Cs,
    Ba,
    La,
    Ce,
    Pr,
    Nd,
    Pm,
    Sm,
    Eu,
    Gd,
    Tb,
    Dy,
    Ho,
    Er,
    Tm,
    Yb,
    Lu,
    Hf,
    Ta,
    W,
    Re,
    Os,
    Ir,
    Pt,
    Au,
    Hg,
    Tl,
    Pb,
    Bi,
    Po,
    At,
    Rn,

    // --- Period 7 ---
    Fr,
    Ra,
    Ac,
    Th,
    Pa,
    U,
    Np,
    Pu,
    Am,
    Cm,
    Bk,
    Cf,
    Es,
    Fm,
    Md,
    No,
    Lr,
    Rf,
    Db,
    Sg,
    Bh,
    Hs,
    Mt,
    Ds,
    Rg,
    Cn,
    Nh,
    Fl,
    Mc,
    Lv,
    Ts,
    Og,

    // --- Special ---
    Lp, // Lone pair
    Du, // Dummy atom
    #[default]
    Unknown,
}

static ELEMENT_SYMBOLS: Map<&'static str, Element> = phf_map! {
    "H" => Element::H, "HE" => Element::He, "LI" => Element::Li, "BE" => Element::Be, "B" => Element::B,
    "C" => Element::C, "N" => Element::N, "O" => Element::O, "F" => Element::F, "NE" => Element::Ne,
    "NA" => Element::Na, "MG" => Element::Mg, "AL" => Element::Al, "SI" => Element::Si, "P" => Element::P,
    "S" => Element::S, "CL" => Element::Cl, "AR" => Element::Ar, "K" => Element::K, "CA" => Element::Ca,
    "SC" => Element::Sc, "TI" => Element::Ti, "V" => Element::V, "CR" => Element::Cr, "MN" => Element::Mn,
    "FE" => Element::Fe, "CO" => Element::Co, "NI" => Element::Ni, "CU" => Element::Cu, "ZN" => Element::Zn,
    "GA" => Element::Ga, "GE" => Element::Ge, "AS" => Element::As, "SE" => Element::Se, "BR" => Element::Br,
    "KR" => Element::Kr, "RB" => Element::Rb, "SR" => Element::Sr, "Y" => Element::Y, "ZR" => Element::Zr,
    "NB" => Element::Nb, "MO" => Element::Mo, "TC" => Element::Tc, "RU" => Element::Ru, "RH" => Element::Rh,
    "PD" => Element::Pd, "AG" => Element::Ag, "CD" => Element::Cd, "IN" => Element::In, "SN" => Element::Sn,
    "SB" => Element::Sb, "TE" => Element::Te, "I" => Element::I, "XE" => Element::Xe, "CS" => Element::Cs,
    "BA" => Element::Ba, "LA" => Element::La, "CE" => Element::Ce, "PR" => Element::Pr, "ND" => Element::Nd,
    "PM" => Element::Pm, "SM" => Element::Sm, "EU" => Element::Eu, "GD" => Element::Gd, "TB" => Element::Tb,
    "DY" => Element::Dy, "HO" => Element::Ho, "ER" => Element::Er, "TM" => Element::Tm, "YB" => Element::Yb,
    "LU" => Element::Lu, "HF" => Element::Hf, "TA" => Element::Ta, "W" => Element::W, "RE" => Element::Re,
    "OS" => Element::Os, "IR" => Element::Ir, "PT" => Element::Pt, "AU" => Element::Au, "HG" => Element::Hg,
    "TL" => Element::Tl, "PB" => Element::Pb, "BI" => Element::Bi, "PO" => Element::Po, "AT" => Element::At,
    "RN" => Element::Rn, "FR" => Element::Fr, "RA" => Element::Ra, "AC" => Element::Ac, "TH" => Element::Th,
    "PA" => Element::Pa, "U" => Element::U, "NP" => Element::Np, "PU" => Element::Pu, "AM" => Element::Am,
    "CM" => Element::Cm, "BK" => Element::Bk, "CF" => Element::Cf, "ES" => Element::Es, "FM" => Element::Fm,
    "MD" => Element::Md, "NO" => Element::No, "LR" => Element::Lr, "RF" => Element::Rf, "DB" => Element::Db,
    "SG" => Element::Sg, "BH" => Element::Bh, "HS" => Element::Hs, "MT" => Element::Mt, "DS" => Element::Ds,
    "RG" => Element::Rg, "CN" => Element::Cn, "NH" => Element::Nh, "FL" => Element::Fl, "MC" => Element::Mc,
    "LV" => Element::Lv, "TS" => Element::Ts, "OG" => Element::Og,
    "D" => Element::H,
    "LP" => Element::Lp, "DU" => Element::Du,
};

const PERIODIC_SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

impl Element {
    /// Looks up an element by its chemical symbol, ignoring case and surrounding
    /// whitespace. `D` is read as hydrogen. Unrecognized symbols map to
    /// [`Element::Unknown`].
    pub fn from_symbol(symbol: &str) -> Self {
        ELEMENT_SYMBOLS
            .get(symbol.trim().to_ascii_uppercase().as_str())
            .copied()
            .unwrap_or(Element::Unknown)
    }

    /// Derives the element from a DREIDING-style force-field type such as
    /// `C_3`, `H___A`, `Cl`, `Ti` or `Zn2+`: the leading alphabetic characters
    /// name the element.
    pub fn from_force_field_type(ff_type: &str) -> Self {
        Self::from_symbol(force_field_prefix(ff_type))
    }

    /// Best-effort guess from a PDB-style atom name: the first alphabetic
    /// character. `CA` is therefore carbon, never calcium.
    pub fn from_atom_name(name: &str) -> Self {
        name.chars()
            .find(|c| c.is_ascii_alphabetic())
            .map(|c| Self::from_symbol(c.encode_utf8(&mut [0; 4])))
            .unwrap_or(Element::Unknown)
    }

    /// The atomic number, or `None` for pseudo-atoms and unknown elements.
    pub fn atomic_number(&self) -> Option<u8> {
        match self {
            Self::Lp | Self::Du | Self::Unknown => None,
            element => Some(*element as u8),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Lp => "Lp",
            Self::Du => "Du",
            Self::Unknown => "X",
            element => PERIODIC_SYMBOLS[*element as usize - 1],
        }
    }
}

/// The leading alphabetic characters of a force-field type (`Sn` for `Sn3`).
pub fn force_field_prefix(ff_type: &str) -> &str {
    let trimmed = ff_type.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single atom of a loaded structure.
///
/// `serial` is the atom id carried by the structure file; it is what the
/// `&QMMM` section refers to. The atom's position inside its
/// [`MolecularSystem`](super::system::MolecularSystem) is its internal index.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom id from the structure file.
    pub serial: usize,
    /// The atom name (e.g., "CA", "OW").
    pub name: String,
    pub element: Element,
    /// The residue name (e.g., "ALA", "HOH").
    pub res_name: String,
    /// The residue sequence number.
    pub res_id: isize,
    pub chain_id: char,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
    /// The force field atom type (e.g., "C_3", "H_").
    pub force_field_type: String,
    /// Partial charge in elementary charge units.
    pub partial_charge: f64,
    /// Whether the atom came from a HETATM record.
    pub hetero: bool,
}

impl Atom {
    /// Creates an atom with the given id, name, element and position. Residue
    /// fields default to an unnamed residue 1 on chain `A`.
    pub fn new(serial: usize, name: &str, element: Element, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.to_string(),
            element,
            res_name: String::new(),
            res_id: 1,
            chain_id: 'A',
            position,
            force_field_type: String::new(),
            partial_charge: 0.0,
            hetero: false,
        }
    }

    pub fn with_residue(mut self, res_name: &str, res_id: isize, chain_id: char) -> Self {
        self.res_name = res_name.to_string();
        self.res_id = res_id;
        self.chain_id = chain_id;
        self
    }

    /// The symbol this atom is grouped under in a `&QM_KIND` block.
    ///
    /// Known elements use their symbol. An atom of unknown element keeps the
    /// alphabetic prefix of its force-field type, or failing that of its name,
    /// normalized to symbol case (`Xx`); `X` is the last resort.
    pub fn kind_symbol(&self) -> Cow<'_, str> {
        if self.element != Element::Unknown {
            return Cow::Borrowed(self.element.symbol());
        }
        let name_prefix =
            force_field_prefix(self.name.trim_start_matches(|c: char| !c.is_ascii_alphabetic()));
        [force_field_prefix(&self.force_field_type), name_prefix]
            .into_iter()
            .find(|prefix| !prefix.is_empty())
            .map(|prefix| {
                let mut symbol = prefix.to_ascii_lowercase();
                symbol[..1].make_ascii_uppercase();
                Cow::Owned(symbol)
            })
            .unwrap_or(Cow::Borrowed(Element::Unknown.symbol()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol_is_case_insensitive() {
        assert_eq!(Element::from_symbol("c"), Element::C);
        assert_eq!(Element::from_symbol("CL"), Element::Cl);
        assert_eq!(Element::from_symbol(" zn "), Element::Zn);
        assert_eq!(Element::from_symbol("D"), Element::H);
    }

    #[test]
    fn from_symbol_falls_back_to_unknown() {
        assert_eq!(Element::from_symbol(""), Element::Unknown);
        assert_eq!(Element::from_symbol("Xx"), Element::Unknown);
        assert_eq!(Element::Unknown.symbol(), "X");
    }

    #[test]
    fn from_force_field_type_uses_alphabetic_prefix() {
        assert_eq!(Element::from_force_field_type("C_3"), Element::C);
        assert_eq!(Element::from_force_field_type("H___A"), Element::H);
        assert_eq!(Element::from_force_field_type("Cl"), Element::Cl);
        assert_eq!(Element::from_force_field_type("Zn2+"), Element::Zn);
        assert_eq!(Element::from_force_field_type("O_R"), Element::O);
        assert_eq!(Element::from_force_field_type("_"), Element::Unknown);
    }

    #[test]
    fn from_atom_name_uses_first_letter() {
        assert_eq!(Element::from_atom_name("CA"), Element::C);
        assert_eq!(Element::from_atom_name("1HB"), Element::H);
        assert_eq!(Element::from_atom_name("OW"), Element::O);
        assert_eq!(Element::from_atom_name("123"), Element::Unknown);
    }

    #[test]
    fn transition_metals_are_not_read_as_their_first_letter() {
        assert_eq!(Element::from_force_field_type("Ti"), Element::Ti);
        assert_eq!(Element::from_force_field_type("Cr3"), Element::Cr);
        assert_eq!(Element::from_force_field_type("Sn"), Element::Sn);
        assert_eq!(Element::from_symbol("T"), Element::Unknown);
        assert_ne!(Element::from_atom_name("TI1"), Element::H);
    }

    #[test]
    fn heavy_elements_have_symbols_and_atomic_numbers() {
        assert_eq!(Element::from_symbol("RN"), Element::Rn);
        assert_eq!(Element::Rn.symbol(), "Rn");
        assert_eq!(Element::Rn.atomic_number(), Some(86));
        assert_eq!(Element::H.atomic_number(), Some(1));
        assert_eq!(Element::Og.atomic_number(), Some(118));
        assert_eq!(Element::Og.symbol(), "Og");
        assert_eq!(Element::Du.atomic_number(), None);
    }

    #[test]
    fn symbol_round_trips_through_from_symbol() {
        for element in [
            Element::H,
            Element::Cl,
            Element::Fe,
            Element::Se,
            Element::Du,
            Element::Ti,
            Element::U,
        ] {
            assert_eq!(Element::from_symbol(element.symbol()), element);
        }
    }

    #[test]
    fn display_writes_symbol() {
        assert_eq!(Element::Br.to_string(), "Br");
        assert_eq!(format!("{}", Element::N), "N");
    }

    #[test]
    fn new_atom_has_expected_default_fields() {
        let atom = Atom::new(7, "CA", Element::C, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.serial, 7);
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.element, Element::C);
        assert_eq!(atom.res_id, 1);
        assert_eq!(atom.chain_id, 'A');
        assert_eq!(atom.partial_charge, 0.0);
        assert!(!atom.hetero);
    }

    #[test]
    fn kind_symbol_keeps_unrecognized_types() {
        let mut atom = Atom::new(3, "XX1", Element::Unknown, Point3::origin());
        atom.force_field_type = "XX_1".to_string();
        assert_eq!(atom.kind_symbol(), "Xx");

        atom.force_field_type.clear();
        assert_eq!(atom.kind_symbol(), "Xx");

        atom.name = "123".to_string();
        assert_eq!(atom.kind_symbol(), "X");

        let tin = Atom::new(4, "SN1", Element::Sn, Point3::origin());
        assert_eq!(tin.kind_symbol(), "Sn");
    }

    #[test]
    fn with_residue_overrides_residue_fields() {
        let atom = Atom::new(1, "N", Element::N, Point3::origin()).with_residue("GLY", 12, 'B');
        assert_eq!(atom.res_name, "GLY");
        assert_eq!(atom.res_id, 12);
        assert_eq!(atom.chain_id, 'B');
    }
}
