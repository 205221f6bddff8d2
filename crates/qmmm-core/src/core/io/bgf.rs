use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::{Atom, Element, force_field_prefix};
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead, Write};
use thiserror::Error;

const ATOM_FORMAT_LINE: &str =
    "FORMAT ATOM   (a6,1x,i5,1x,a5,1x,a3,1x,a1,1x,a5,3f10.5,1x,a5,i3,i2,1x,f8.5)";
const CONECT_FORMAT_LINE: &str = "FORMAT CONECT (a6,12i6)";
const MIN_ATOM_LINE_LEN: usize = 80;

/// Header records of a BGF file that the molecular model does not represent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BgfMetadata {
    /// `BIOGRF`, `DESCRP`, `REMARK`, `FORCEFIELD` and any other unrecognized
    /// records, in file order.
    pub header_lines: Vec<String>,
    pub format_lines: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BgfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: BgfParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum BgfParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 80 chars)")]
    LineTooShort,
    #[error("{record} line requires an atom and at least one partner")]
    InvalidConnectionFormat { record: &'static str },
    #[error("Invalid {record} value '{value}'")]
    InvalidConnectionValue { record: &'static str, value: String },
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

/// Truncates `s` to at most `width` characters so fixed columns stay aligned.
fn fit(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}

fn parse_int<T: std::str::FromStr>(line: usize, columns: &str, value: &str) -> Result<T, BgfError> {
    value.parse().map_err(|_| BgfError::Parse {
        line,
        kind: BgfParseErrorKind::InvalidInt {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

fn parse_float(line: usize, columns: &str, value: &str) -> Result<f64, BgfError> {
    value.parse().map_err(|_| BgfError::Parse {
        line,
        kind: BgfParseErrorKind::InvalidFloat {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

fn parse_atom_line(line: &str, line_num: usize, hetero: bool) -> Result<Atom, BgfError> {
    if line.len() < MIN_ATOM_LINE_LEN {
        return Err(BgfError::Parse {
            line: line_num,
            kind: BgfParseErrorKind::LineTooShort,
        });
    }

    let serial_str = slice_and_trim(line, 7, 12);
    let name_str = slice_and_trim(line, 13, 18);
    let res_name_str = slice_and_trim(line, 19, 22);
    let chain_id_str = slice_and_trim(line, 23, 24);
    let res_id_str = slice_and_trim(line, 25, 30);
    let x_str = slice_and_trim(line, 30, 40);
    let y_str = slice_and_trim(line, 40, 50);
    let z_str = slice_and_trim(line, 50, 60);
    let ff_type_str = slice_and_trim(line, 61, 66);
    let charge_str = slice_and_trim(line, 72, 80);

    if name_str.is_empty() {
        return Err(BgfError::Parse {
            line: line_num,
            kind: BgfParseErrorKind::MissingRequiredField {
                columns: "14-18".into(),
            },
        });
    }
    if ff_type_str.is_empty() {
        return Err(BgfError::Parse {
            line: line_num,
            kind: BgfParseErrorKind::MissingRequiredField {
                columns: "62-66".into(),
            },
        });
    }

    let serial: usize = parse_int(line_num, "8-12", serial_str)?;
    let res_id: isize = parse_int(line_num, "26-30", res_id_str)?;
    let x = parse_float(line_num, "31-40", x_str)?;
    let y = parse_float(line_num, "41-50", y_str)?;
    let z = parse_float(line_num, "51-60", z_str)?;
    let charge = parse_float(line_num, "73-80", charge_str)?;
    let chain_id = chain_id_str.chars().next().unwrap_or('A');

    // The atom name is consulted only for types without an alphabetic prefix.
    let element = if force_field_prefix(ff_type_str).is_empty() {
        Element::from_atom_name(name_str)
    } else {
        Element::from_force_field_type(ff_type_str)
    };

    let mut atom = Atom::new(serial, name_str, element, Point3::new(x, y, z))
        .with_residue(res_name_str, res_id, chain_id);
    atom.force_field_type = ff_type_str.to_string();
    atom.partial_charge = charge;
    atom.hetero = hetero;
    Ok(atom)
}

/// Splits a `CONECT`/`ORDER` record into its leading atom serial and the
/// remaining integer fields.
fn parse_connection_line<T: std::str::FromStr>(
    line: &str,
    line_num: usize,
    record: &'static str,
) -> Result<(usize, Vec<T>), BgfError> {
    let mut fields = line.split_whitespace().skip(1);
    let invalid = |value: &str| BgfError::Parse {
        line: line_num,
        kind: BgfParseErrorKind::InvalidConnectionValue {
            record,
            value: value.to_string(),
        },
    };

    let atom_field = fields.next().ok_or(BgfError::Parse {
        line: line_num,
        kind: BgfParseErrorKind::InvalidConnectionFormat { record },
    })?;
    let atom: usize = atom_field.parse().map_err(|_| invalid(atom_field))?;
    let values = fields
        .map(|field| field.parse::<T>().map_err(|_| invalid(field)))
        .collect::<Result<Vec<_>, _>>()?;
    if values.is_empty() {
        return Err(BgfError::Parse {
            line: line_num,
            kind: BgfParseErrorKind::InvalidConnectionFormat { record },
        });
    }
    Ok((atom, values))
}

pub struct BgfFile;

impl MolecularFile for BgfFile {
    type Metadata = BgfMetadata;
    type Error = BgfError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut system = MolecularSystem::new();
        let mut metadata = BgfMetadata::default();
        let mut seen_serials = HashSet::new();

        let mut connections: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut orders: HashMap<usize, Vec<BondOrder>> = HashMap::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            if line.trim().is_empty() {
                continue;
            }

            let record_type = line.split_whitespace().next().unwrap_or("");
            match record_type {
                "ATOM" | "HETATM" => {
                    let atom = parse_atom_line(&line, line_num, record_type == "HETATM")?;
                    if !seen_serials.insert(atom.serial) {
                        return Err(BgfError::Inconsistency(format!(
                            "Duplicate atom serial: {}",
                            atom.serial
                        )));
                    }
                    system.add_atom(atom);
                }
                "CONECT" => connections.push(parse_connection_line(&line, line_num, "CONECT")?),
                "ORDER" => {
                    let (atom, values) = parse_connection_line(&line, line_num, "ORDER")?;
                    orders.insert(atom, values);
                }
                "FORMAT" => metadata.format_lines.push(line),
                "END" => break,
                _ => metadata.header_lines.push(line),
            }
        }

        if seen_serials.is_empty() {
            return Err(BgfError::MissingRecord("ATOM/HETATM records".into()));
        }

        for (atom_serial, partners) in connections {
            let atom_orders = orders.get(&atom_serial);
            for (position, &partner_serial) in partners.iter().enumerate() {
                let order = atom_orders
                    .and_then(|o| o.get(position))
                    .copied()
                    .unwrap_or_default();
                system
                    .add_bond_by_serial(atom_serial, partner_serial, order)
                    .ok_or_else(|| {
                        BgfError::Inconsistency(format!(
                            "CONECT record links unknown atoms {} and {}",
                            atom_serial, partner_serial
                        ))
                    })?;
            }
        }

        Ok((system, metadata))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for line in &metadata.header_lines {
            writeln!(writer, "{}", line)?;
        }
        for line in &metadata.format_lines {
            writeln!(writer, "{}", line)?;
        }

        let mut bond_orders: HashMap<(usize, usize), BondOrder> = HashMap::new();
        for bond in system.bonds() {
            let key = (
                bond.atom1_idx.min(bond.atom2_idx),
                bond.atom1_idx.max(bond.atom2_idx),
            );
            bond_orders.insert(key, bond.order);
        }
        let neighbors_of = |idx: usize| system.bonded_neighbors(idx).unwrap_or(&[]);

        for (idx, atom) in system.atoms().iter().enumerate() {
            let record_type = if atom.hetero { "HETATM" } else { "ATOM" };
            writeln!(
                writer,
                "{:<6} {:>5} {:<5} {:>3} {:1} {:>5}{:>10.5}{:>10.5}{:>10.5} {:<5}{:>3}{:>2} {:>8.5}",
                record_type,
                atom.serial,
                fit(&atom.name, 5),
                fit(&atom.res_name, 3),
                atom.chain_id,
                atom.res_id,
                atom.position.x,
                atom.position.y,
                atom.position.z,
                fit(&atom.force_field_type, 5),
                neighbors_of(idx).len(),
                0,
                atom.partial_charge
            )?;
        }

        for (idx, atom) in system.atoms().iter().enumerate() {
            let neighbors = neighbors_of(idx);
            if neighbors.is_empty() {
                continue;
            }

            let mut partner_serials = Vec::with_capacity(neighbors.len());
            let mut partner_orders = Vec::with_capacity(neighbors.len());
            for &partner in neighbors {
                let partner_atom = system.atom(partner).ok_or_else(|| {
                    BgfError::Inconsistency(format!("Bond atom index {} not found", partner))
                })?;
                partner_serials.push(partner_atom.serial);
                partner_orders.push(
                    bond_orders
                        .get(&(idx.min(partner), idx.max(partner)))
                        .copied()
                        .unwrap_or_default(),
                );
            }

            write!(writer, "CONECT{:>6}", atom.serial)?;
            for serial in &partner_serials {
                write!(writer, "{:>6}", serial)?;
            }
            writeln!(writer)?;

            if partner_orders.iter().any(|&o| o != BondOrder::Single) {
                write!(writer, "ORDER {:>6}", atom.serial)?;
                for order in &partner_orders {
                    write!(writer, "{:>6}", *order as u8)?;
                }
                writeln!(writer)?;
            }
        }

        writeln!(writer, "END")?;
        Ok(())
    }

    fn write_system_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let default_metadata = BgfMetadata {
            header_lines: vec![
                "BIOGRF  332".to_string(),
                "REMARK Generated by qmmm-partition".to_string(),
                "FORCEFIELD DREIDING".to_string(),
            ],
            format_lines: vec![ATOM_FORMAT_LINE.to_string(), CONECT_FORMAT_LINE.to_string()],
        };
        Self::write_to(system, &default_metadata, writer)
    }
}
