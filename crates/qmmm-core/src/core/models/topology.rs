use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single = 1,
    Double = 2,
    Triple = 3,
    Aromatic = 4,
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "4" | "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// A covalent bond between two atoms, addressed by internal index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1_idx: usize,
    pub atom2_idx: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(atom1_idx: usize, atom2_idx: usize, order: BondOrder) -> Self {
        Self {
            atom1_idx,
            atom2_idx,
            order,
        }
    }

    pub fn contains(&self, atom_idx: usize) -> bool {
        self.atom1_idx == atom_idx || self.atom2_idx == atom_idx
    }

    /// Returns the partner of `atom_idx`, or `None` if the bond does not touch it.
    pub fn partner(&self, atom_idx: usize) -> Option<usize> {
        if self.atom1_idx == atom_idx {
            Some(self.atom2_idx)
        } else if self.atom2_idx == atom_idx {
            Some(self.atom1_idx)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_order_from_str_parses_valid_strings() {
        assert_eq!("1".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("S".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("double".parse::<BondOrder>().unwrap(), BondOrder::Double);
        assert_eq!("3".parse::<BondOrder>().unwrap(), BondOrder::Triple);
        assert_eq!("ar".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
        assert_eq!("4".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
    }

    #[test]
    fn bond_order_from_str_rejects_invalid_strings() {
        assert!("".parse::<BondOrder>().is_err());
        assert!("quadruple".parse::<BondOrder>().is_err());
        assert!("0".parse::<BondOrder>().is_err());
    }

    #[test]
    fn bond_order_numeric_value_matches_bgf_convention() {
        assert_eq!(BondOrder::Single as u8, 1);
        assert_eq!(BondOrder::Aromatic as u8, 4);
        assert_eq!(BondOrder::default(), BondOrder::Single);
    }

    #[test]
    fn bond_contains_and_partner() {
        let bond = Bond::new(3, 8, BondOrder::Single);
        assert!(bond.contains(3));
        assert!(bond.contains(8));
        assert!(!bond.contains(5));
        assert_eq!(bond.partner(3), Some(8));
        assert_eq!(bond.partner(8), Some(3));
        assert_eq!(bond.partner(5), None);
    }
}
