//! The `&QMMM` section of a CP2K input file.
//!
//! [`QmmmSection`] is the in-memory form of the block. Its [`Display`](fmt::Display)
//! output is the exact text CP2K expects; [`QmmmSection::read_from`] accepts that
//! text back permissively. [`scan_kind_indices`] is the narrower scanner used to
//! restore a QM selection: it only collects the `MM_INDEX` ids listed inside
//! `&QM_KIND` blocks.

use crate::core::utils::geometry::BoundingBox;
use std::fmt;
use std::io::{self, BufRead, Write};

/// Padding, in Angstroms, added to every axis of the QM bounding box.
pub const CELL_PADDING: f64 = 6.0;

/// Element of the capping atom placed on every QM/MM boundary bond.
pub const LINK_ATOM_KIND: &str = "H";

/// The QM cell (`&CELL` / `ABC`): edge lengths along x, y and z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub abc: [f64; 3],
}

impl Cell {
    /// The cell enclosing `bbox` with [`CELL_PADDING`] added to each axis
    /// independently. The result is generally not cubic.
    pub fn from_bounding_box(bbox: &BoundingBox) -> Self {
        Self {
            abc: bbox.padded_extent(CELL_PADDING),
        }
    }
}

/// All QM atoms of one element (`&QM_KIND`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QmKind {
    /// Element symbol as written after `&QM_KIND`.
    pub element: String,
    /// Atom ids, in the order they are listed.
    pub mm_indices: Vec<usize>,
}

/// A covalent bond crossing the QM/MM boundary (`&LINK`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub qm_index: usize,
    pub mm_index: usize,
    pub kind: String,
}

impl Link {
    /// A link capped with the default [`LINK_ATOM_KIND`].
    pub fn new(qm_index: usize, mm_index: usize) -> Self {
        Self {
            qm_index,
            mm_index,
            kind: LINK_ATOM_KIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QmmmSection {
    pub cell: Option<Cell>,
    pub kinds: Vec<QmKind>,
    pub links: Vec<Link>,
}

impl QmmmSection {
    /// All ids listed under the section's kinds, kind by kind.
    pub fn qm_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.kinds.iter().flat_map(|k| k.mm_indices.iter().copied())
    }

    /// Writes the section text to `writer`.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        write!(writer, "{}", self)
    }

    /// Parses a section permissively.
    ///
    /// Unrecognized lines are skipped, as are malformed `ABC`, `MM_INDEX` and
    /// `QM_INDEX` lines. Any line starting with `&END` closes the block it
    /// appears in. A `&LINK` block lacking either index is dropped; one lacking
    /// `QM_KIND` gets [`LINK_ATOM_KIND`].
    pub fn read_from(reader: &mut impl BufRead) -> io::Result<Self> {
        let mut section = QmmmSection::default();
        let mut block = Block::Outside;

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim_start();

            if trimmed.starts_with("&END") {
                if let Block::Link(partial) = std::mem::replace(&mut block, Block::Outside) {
                    if let Some(link) = partial.finish() {
                        section.links.push(link);
                    }
                }
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let Some(keyword) = fields.next() else {
                continue;
            };
            match keyword {
                "&CELL" => block = Block::Cell,
                "&QM_KIND" => {
                    section.kinds.push(QmKind {
                        element: fields.next().unwrap_or_default().to_string(),
                        mm_indices: Vec::new(),
                    });
                    block = Block::Kind;
                }
                "&LINK" => block = Block::Link(PartialLink::default()),
                _ => match &mut block {
                    Block::Cell if keyword == "ABC" => {
                        if let Some(abc) = parse_abc(fields) {
                            section.cell = Some(Cell { abc });
                        }
                    }
                    Block::Kind if keyword == "MM_INDEX" => {
                        if let (Some(kind), Some(ids)) =
                            (section.kinds.last_mut(), mm_index_ids(&line))
                        {
                            kind.mm_indices.extend(ids);
                        }
                    }
                    Block::Link(partial) => partial.accept(keyword, fields),
                    _ => {}
                },
            }
        }

        Ok(section)
    }
}

impl fmt::Display for QmmmSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "&QMMM")?;
        if let Some(cell) = &self.cell {
            let [a, b, c] = cell.abc;
            write!(f, "  &CELL\n    ABC {:.2} {:.2} {:.2}\n  &END CELL\n", a, b, c)?;
        }
        for kind in &self.kinds {
            writeln!(f, "  &QM_KIND {}", kind.element)?;
            f.write_str("    MM_INDEX")?;
            for id in &kind.mm_indices {
                write!(f, " {}", id)?;
            }
            f.write_str("\n  &END QM_KIND\n")?;
        }
        for link in &self.links {
            write!(
                f,
                "  &LINK\n    QM_INDEX {}\n    MM_INDEX {}\n    QM_KIND {}\n  &END LINK\n",
                link.qm_index, link.mm_index, link.kind
            )?;
        }
        writeln!(f, "&END QMMM")
    }
}

enum Block {
    Outside,
    Cell,
    Kind,
    Link(PartialLink),
}

#[derive(Default)]
struct PartialLink {
    qm_index: Option<usize>,
    mm_index: Option<usize>,
    kind: Option<String>,
}

impl PartialLink {
    fn accept<'a>(&mut self, keyword: &str, mut fields: impl Iterator<Item = &'a str>) {
        let value = fields.next();
        match keyword {
            "QM_INDEX" => self.qm_index = value.and_then(|v| v.parse().ok()).or(self.qm_index),
            "MM_INDEX" => self.mm_index = value.and_then(|v| v.parse().ok()).or(self.mm_index),
            "QM_KIND" => {
                if let Some(kind) = value {
                    self.kind = Some(kind.to_string());
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Option<Link> {
        Some(Link {
            qm_index: self.qm_index?,
            mm_index: self.mm_index?,
            kind: self.kind.unwrap_or_else(|| LINK_ATOM_KIND.to_string()),
        })
    }
}

fn parse_abc<'a>(mut fields: impl Iterator<Item = &'a str>) -> Option<[f64; 3]> {
    let mut abc = [0.0; 3];
    for value in &mut abc {
        *value = fields.next()?.parse().ok()?;
    }
    Some(abc)
}

/// Parses an `MM_INDEX` line: the keyword after optional indentation,
/// whitespace, then nothing but whitespace-separated decimal digits. Returns
/// `None` for any other line, including one with a single non-numeric token.
fn mm_index_ids(line: &str) -> Option<Vec<usize>> {
    let rest = line.trim_start().strip_prefix("MM_INDEX")?;
    if !rest.starts_with(char::is_whitespace)
        || !rest.chars().all(|c| c.is_whitespace() || c.is_ascii_digit())
    {
        return None;
    }
    rest.split_whitespace()
        .map(|token| token.parse().ok())
        .collect()
}

/// Collects the atom ids listed on `MM_INDEX` lines inside `&QM_KIND` blocks.
///
/// Every line is examined in three steps, in this order:
/// 1. inside a kind block, a line starting with `&END` (after indentation)
///    leaves the block;
/// 2. still inside, a well-formed `MM_INDEX` line contributes all its ids;
/// 3. a line starting with `&QM_KIND` enters a kind block.
///
/// `&END` is matched as a prefix, so any `&END...` line closes the block.
/// `MM_INDEX` lines in `&LINK` blocks or outside any block are ignored.
/// Ids are returned in file order, duplicates included.
pub fn scan_kind_indices(reader: impl BufRead) -> io::Result<Vec<usize>> {
    let mut indices = Vec::new();
    let mut in_kind = false;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim_start();

        if in_kind && trimmed.starts_with("&END") {
            in_kind = false;
        }
        if in_kind {
            if let Some(ids) = mm_index_ids(&line) {
                indices.extend(ids);
            }
        }
        if trimmed.starts_with("&QM_KIND") {
            in_kind = true;
        }
    }

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::io::Cursor;

    const WORKED_EXAMPLE: &str = "\
&QMMM
  &CELL
    ABC 7.00 7.00 7.00
  &END CELL
  &QM_KIND C
    MM_INDEX 1
  &END QM_KIND
  &QM_KIND H
    MM_INDEX 2
  &END QM_KIND
  &LINK
    QM_INDEX 2
    MM_INDEX 3
    QM_KIND H
  &END LINK
&END QMMM
";

    fn worked_example_section() -> QmmmSection {
        QmmmSection {
            cell: Some(Cell::from_bounding_box(&BoundingBox::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 1.0),
            ))),
            kinds: vec![
                QmKind {
                    element: "C".into(),
                    mm_indices: vec![1],
                },
                QmKind {
                    element: "H".into(),
                    mm_indices: vec![2],
                },
            ],
            links: vec![Link::new(2, 3)],
        }
    }

    #[test]
    fn display_produces_exact_section_text() {
        assert_eq!(worked_example_section().to_string(), WORKED_EXAMPLE);
    }

    #[test]
    fn write_to_matches_display() {
        let mut buffer = Vec::new();
        worked_example_section().write_to(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), WORKED_EXAMPLE);
    }

    #[test]
    fn cell_is_padded_per_axis_and_rounded_to_two_decimals() {
        let bbox = BoundingBox::new(Point3::new(-1.234, 0.0, 2.0), Point3::new(3.0, 9.999, 2.0));
        let section = QmmmSection {
            cell: Some(Cell::from_bounding_box(&bbox)),
            ..Default::default()
        };
        let text = section.to_string();
        assert!(text.contains("    ABC 10.23 16.00 6.00\n"), "{text}");
    }

    #[test]
    fn empty_section_has_only_header_and_footer() {
        assert_eq!(QmmmSection::default().to_string(), "&QMMM\n&END QMMM\n");
    }

    #[test]
    fn kind_lists_all_ids_on_one_line() {
        let section = QmmmSection {
            kinds: vec![QmKind {
                element: "O".into(),
                mm_indices: vec![12, 4, 4, 99],
            }],
            ..Default::default()
        };
        assert!(
            section
                .to_string()
                .contains("  &QM_KIND O\n    MM_INDEX 12 4 4 99\n  &END QM_KIND\n")
        );
    }

    #[test]
    fn read_from_parses_worked_example() {
        let section = QmmmSection::read_from(&mut Cursor::new(WORKED_EXAMPLE)).unwrap();
        assert_eq!(section, worked_example_section());
        assert_eq!(section.qm_indices().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn read_from_is_permissive() {
        let input = "\
! comment
&QMMM
  ECOUPL GAUSS
  &CELL
    ABC 1.0 x 3.0
  &END CELL
  &QM_KIND N
    MM_INDEX 5 6
    MM_INDEX 7 oops
    MM_INDEX 8
  &END
  &LINK
    QM_INDEX 5
  &END LINK
  &LINK
    MM_INDEX 11
    QM_INDEX 6
  &END LINK
&END QMMM
";
        let section = QmmmSection::read_from(&mut Cursor::new(input)).unwrap();
        assert_eq!(section.cell, None);
        assert_eq!(
            section.kinds,
            vec![QmKind {
                element: "N".into(),
                mm_indices: vec![5, 6, 8],
            }]
        );
        assert_eq!(section.links, vec![Link::new(6, 11)]);
    }

    #[test]
    fn scan_collects_kind_indices_in_file_order() {
        let ids = scan_kind_indices(Cursor::new(WORKED_EXAMPLE)).unwrap();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn scan_ignores_link_and_stray_mm_index_lines() {
        let input = "\
MM_INDEX 100
&QMMM
  &QM_KIND C
    MM_INDEX 1 2
  &END QM_KIND
    MM_INDEX 200
  &LINK
    MM_INDEX 300
  &END LINK
&END QMMM
";
        assert_eq!(scan_kind_indices(Cursor::new(input)).unwrap(), vec![1, 2]);
    }

    #[test]
    fn scan_keeps_duplicates_and_multiple_lines_per_kind() {
        let input = "&QM_KIND O\n MM_INDEX 3 3\nMM_INDEX   4\t5  \n&END QM_KIND\n";
        assert_eq!(scan_kind_indices(Cursor::new(input)).unwrap(), vec![3, 3, 4, 5]);
    }

    #[test]
    fn scan_drops_whole_line_with_non_numeric_token() {
        let input = "&QM_KIND O\n  MM_INDEX 1 2 x\n  MM_INDEX 3\n&END QM_KIND\n";
        assert_eq!(scan_kind_indices(Cursor::new(input)).unwrap(), vec![3]);
    }

    #[test]
    fn scan_rejects_lines_that_only_resemble_mm_index() {
        let input = "&QM_KIND O\n  MM_INDEX7\n  MM_INDEX\n  # MM_INDEX 8\n  MM_INDEX -9\n&END\n";
        assert!(scan_kind_indices(Cursor::new(input)).unwrap().is_empty());
    }

    #[test]
    fn scan_closes_kind_on_any_end_prefix() {
        let input = "&QM_KIND C\n  MM_INDEX 1\n  &ENDING\n  MM_INDEX 2\n";
        assert_eq!(scan_kind_indices(Cursor::new(input)).unwrap(), vec![1]);
    }

    #[test]
    fn scan_reenters_kind_without_closing_end() {
        let input = "&QM_KIND C\n  MM_INDEX 1\n&QM_KIND H\n  MM_INDEX 2\n";
        assert_eq!(scan_kind_indices(Cursor::new(input)).unwrap(), vec![1, 2]);
    }

    #[test]
    fn scan_of_empty_input_is_empty() {
        assert!(scan_kind_indices(Cursor::new("")).unwrap().is_empty());
    }

    #[test]
    fn scan_handles_crlf_line_endings() {
        let input = "&QM_KIND C\r\n  MM_INDEX 1 2\r\n&END QM_KIND\r\n";
        assert_eq!(scan_kind_indices(Cursor::new(input)).unwrap(), vec![1, 2]);
    }
}
