use crate::core::models::atom::{Atom, Element};
use std::fmt;
use std::ops::RangeInclusive;

/// A parsed selection expression.
///
/// Expressions are evaluated one atom at a time with [`SelectionExpr::matches`];
/// the host that owns the atoms supplies the meaning of [`SelectionExpr::Named`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionExpr {
    All,
    None,
    /// A named selection or a loaded object.
    Named(String),
    /// 1-based positions of atoms within their object.
    Index(Vec<RangeInclusive<usize>>),
    /// Atom serials.
    Id(Vec<RangeInclusive<usize>>),
    Element(Vec<Element>),
    Name(Vec<String>),
    ResName(Vec<String>),
    ResId(Vec<RangeInclusive<isize>>),
    Chain(Vec<char>),
    Not(Box<SelectionExpr>),
    And(Box<SelectionExpr>, Box<SelectionExpr>),
    Or(Box<SelectionExpr>, Box<SelectionExpr>),
}

impl SelectionExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Builds an `index` expression covering exactly `indices`, merging
    /// consecutive values into ranges.
    pub fn index_set(indices: impl IntoIterator<Item = usize>) -> Self {
        Self::Index(compress_ranges(indices))
    }

    /// Builds an `id` expression covering exactly `ids`.
    pub fn id_set(ids: impl IntoIterator<Item = usize>) -> Self {
        Self::Id(compress_ranges(ids))
    }

    pub fn and(self, other: SelectionExpr) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: SelectionExpr) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// All names referenced through [`SelectionExpr::Named`], in order of appearance.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Named(name) => names.push(name),
            Self::Not(inner) => inner.collect_names(names),
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) => {
                lhs.collect_names(names);
                rhs.collect_names(names);
            }
            _ => {}
        }
    }

    /// Tests a single atom.
    ///
    /// `position` is the atom's 1-based index within its object. `is_member`
    /// answers whether the atom belongs to a named selection or object.
    pub fn matches<F>(&self, position: usize, atom: &Atom, is_member: &F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Named(name) => is_member(name),
            Self::Index(ranges) => ranges.iter().any(|r| r.contains(&position)),
            Self::Id(ranges) => ranges.iter().any(|r| r.contains(&atom.serial)),
            Self::Element(elements) => elements.contains(&atom.element),
            Self::Name(names) => names.iter().any(|n| n.eq_ignore_ascii_case(&atom.name)),
            Self::ResName(names) => names.iter().any(|n| n.eq_ignore_ascii_case(&atom.res_name)),
            Self::ResId(ranges) => ranges.iter().any(|r| r.contains(&atom.res_id)),
            Self::Chain(chains) => chains.contains(&atom.chain_id),
            Self::Not(inner) => !inner.matches(position, atom, is_member),
            Self::And(lhs, rhs) => {
                lhs.matches(position, atom, is_member) && rhs.matches(position, atom, is_member)
            }
            Self::Or(lhs, rhs) => {
                lhs.matches(position, atom, is_member) || rhs.matches(position, atom, is_member)
            }
        }
    }
}

fn compress_ranges(values: impl IntoIterator<Item = usize>) -> Vec<RangeInclusive<usize>> {
    let mut sorted: Vec<usize> = values.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<RangeInclusive<usize>> = Vec::new();
    for value in sorted {
        match ranges.last_mut() {
            Some(last) if *last.end() + 1 == value => *last = *last.start()..=value,
            _ => ranges.push(value..=value),
        }
    }
    ranges
}

fn write_ranges<T: fmt::Display + PartialEq>(
    f: &mut fmt::Formatter<'_>,
    ranges: &[RangeInclusive<T>],
) -> fmt::Result {
    for (i, range) in ranges.iter().enumerate() {
        if i > 0 {
            f.write_str("+")?;
        }
        if range.start() == range.end() {
            write!(f, "{}", range.start())?;
        } else {
            write!(f, "{}-{}", range.start(), range.end())?;
        }
    }
    Ok(())
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str("+")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &SelectionExpr) -> fmt::Result {
    match expr {
        SelectionExpr::And(..) | SelectionExpr::Or(..) => write!(f, "({})", expr),
        _ => write!(f, "{}", expr),
    }
}

impl fmt::Display for SelectionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::None => f.write_str("none"),
            Self::Named(name) => f.write_str(name),
            Self::Index(ranges) => {
                f.write_str("index ")?;
                write_ranges(f, ranges)
            }
            Self::Id(ranges) => {
                f.write_str("id ")?;
                write_ranges(f, ranges)
            }
            Self::Element(elements) => {
                f.write_str("elem ")?;
                write_list(f, elements)
            }
            Self::Name(names) => {
                f.write_str("name ")?;
                write_list(f, names)
            }
            Self::ResName(names) => {
                f.write_str("resn ")?;
                write_list(f, names)
            }
            Self::ResId(ranges) => {
                f.write_str("resi ")?;
                write_ranges(f, ranges)
            }
            Self::Chain(chains) => {
                f.write_str("chain ")?;
                write_list(f, chains)
            }
            Self::Not(inner) => {
                f.write_str("not ")?;
                write_operand(f, inner)
            }
            Self::And(lhs, rhs) => {
                write_operand(f, lhs)?;
                f.write_str(" and ")?;
                write_operand(f, rhs)
            }
            Self::Or(lhs, rhs) => {
                write_operand(f, lhs)?;
                f.write_str(" or ")?;
                write_operand(f, rhs)
            }
        }
    }
}
