use super::expr::SelectionExpr;
use crate::core::models::atom::Element;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionParseError {
    #[error("Selection expression is empty")]
    Empty,

    #[error("Unexpected end of selection expression")]
    UnexpectedEnd,

    #[error("Unexpected token '{0}' in selection expression")]
    UnexpectedToken(String),

    #[error("Keyword '{keyword}' requires a value")]
    MissingValue { keyword: &'static str },

    #[error("Invalid value '{value}' for keyword '{keyword}'")]
    InvalidValue {
        keyword: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::And => f.write_str("and"),
            Token::Or => f.write_str("or"),
            Token::Not => f.write_str("not"),
            Token::Word(word) => f.write_str(word),
        }
    }
}

const OPERATOR_CHARS: &str = "()&|!";

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | '&' | '|' | '!' => {
                chars.next();
                tokens.push(match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '&' => Token::And,
                    '|' => Token::Or,
                    _ => Token::Not,
                });
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || OPERATOR_CHARS.contains(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Word(word),
                });
            }
        }
    }

    tokens
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.next();
            let rhs = self.parse_and()?;
            lhs = lhs.or(rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        let mut lhs = self.parse_not()?;
        while self.peek() == Some(&Token::And) {
            self.next();
            let rhs = self.parse_not()?;
            lhs = lhs.and(rhs);
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        if self.peek() == Some(&Token::Not) {
            self.next();
            return Ok(self.parse_not()?.not());
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(SelectionParseError::UnexpectedToken(other.to_string())),
                    None => Err(SelectionParseError::UnexpectedEnd),
                }
            }
            Some(Token::Word(word)) => self.parse_word(word),
            Some(other) => Err(SelectionParseError::UnexpectedToken(other.to_string())),
            None => Err(SelectionParseError::UnexpectedEnd),
        }
    }

    fn parse_word(&mut self, word: String) -> Result<SelectionExpr, SelectionParseError> {
        match word.to_ascii_lowercase().as_str() {
            "all" => Ok(SelectionExpr::All),
            "none" => Ok(SelectionExpr::None),
            "index" | "idx" => {
                let value = self.value_for("index")?;
                Ok(SelectionExpr::Index(parse_unsigned_ranges("index", &value)?))
            }
            "id" => {
                let value = self.value_for("id")?;
                Ok(SelectionExpr::Id(parse_unsigned_ranges("id", &value)?))
            }
            "elem" | "element" => {
                let value = self.value_for("elem")?;
                let elements = split_list(&value)
                    .map(|symbol| match Element::from_symbol(symbol) {
                        Element::Unknown if !symbol.eq_ignore_ascii_case("X") => {
                            Err(invalid("elem", symbol))
                        }
                        element => Ok(element),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SelectionExpr::Element(elements))
            }
            "name" => {
                let value = self.value_for("name")?;
                Ok(SelectionExpr::Name(split_list(&value).map(String::from).collect()))
            }
            "resn" => {
                let value = self.value_for("resn")?;
                Ok(SelectionExpr::ResName(split_list(&value).map(String::from).collect()))
            }
            "resi" => {
                let value = self.value_for("resi")?;
                Ok(SelectionExpr::ResId(parse_signed_ranges("resi", &value)?))
            }
            "chain" => {
                let value = self.value_for("chain")?;
                let chains = split_list(&value)
                    .map(|part| {
                        let mut chars = part.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) => Ok(c),
                            _ => Err(invalid("chain", part)),
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SelectionExpr::Chain(chains))
            }
            _ => Ok(SelectionExpr::Named(word)),
        }
    }

    fn value_for(&mut self, keyword: &'static str) -> Result<String, SelectionParseError> {
        match self.next() {
            Some(Token::Word(value)) => Ok(value),
            Some(other) => Err(SelectionParseError::UnexpectedToken(other.to_string())),
            None => Err(SelectionParseError::MissingValue { keyword }),
        }
    }
}

fn invalid(keyword: &'static str, value: &str) -> SelectionParseError {
    SelectionParseError::InvalidValue {
        keyword,
        value: value.to_string(),
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split('+').filter(|part| !part.is_empty())
}

fn parse_unsigned_ranges(
    keyword: &'static str,
    value: &str,
) -> Result<Vec<RangeInclusive<usize>>, SelectionParseError> {
    split_list(value)
        .map(|part| {
            let (start, end) = match part.split_once('-') {
                Some((a, b)) => (a.parse::<usize>(), b.parse::<usize>()),
                None => (part.parse::<usize>(), part.parse::<usize>()),
            };
            match (start, end) {
                (Ok(start), Ok(end)) if start <= end => Ok(start..=end),
                _ => Err(invalid(keyword, part)),
            }
        })
        .collect()
}

fn parse_signed_ranges(
    keyword: &'static str,
    value: &str,
) -> Result<Vec<RangeInclusive<isize>>, SelectionParseError> {
    split_list(value)
        .map(|part| {
            // A leading '-' is a sign, not a range separator.
            let separator = part.get(1..).and_then(|rest| rest.find('-')).map(|p| p + 1);
            let (start, end) = match separator {
                Some(p) => (part[..p].parse::<isize>(), part[p + 1..].parse::<isize>()),
                None => (part.parse::<isize>(), part.parse::<isize>()),
            };
            match (start, end) {
                (Ok(start), Ok(end)) if start <= end => Ok(start..=end),
                _ => Err(invalid(keyword, part)),
            }
        })
        .collect()
}

/// Parses a selection expression.
pub fn parse(input: &str) -> Result<SelectionExpr, SelectionParseError> {
    let tokens = tokenize(input);
    if tokens.is_empty() {
        return Err(SelectionParseError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    match parser.next() {
        Some(token) => Err(SelectionParseError::UnexpectedToken(token.to_string())),
        None => Ok(expr),
    }
}

/// Whether `name` can be used for a named selection or object: it must parse
/// back as a reference to itself, so keywords, operators and whitespace are
/// out.
pub fn is_valid_name(name: &str) -> bool {
    matches!(parse(name), Ok(SelectionExpr::Named(parsed)) if parsed == name)
}

impl FromStr for SelectionExpr {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
