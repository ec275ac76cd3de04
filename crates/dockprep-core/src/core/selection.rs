//! A small selection language for extracting sub-structures.
//!
//! Selection strings are predicates over atom metadata, in the style used by
//! common structural-biology toolkits:
//!
//! ```text
//! chain A and not water and not hetero
//! resname STI
//! (chain A or chain B) and backbone
//! ```
//!
//! Grammar (keywords are case-insensitive; `or` binds loosest, then `and`,
//! then `not`; parentheses group):
//!
//! ```text
//! expr     := and_expr ("or" and_expr)*
//! and_expr := unary ("and" unary)*
//! unary    := "not" unary | "(" expr ")" | term
//! term     := "all" | "protein" | "water" | "hetero" | "backbone" | "hydrogen"
//!           | "chain" ID+ | "resname" NAME+ | "resnum" INT+
//!           | "name" NAME+ | "element" SYM+
//! ```
//!
//! Keywords taking values accept one or more of them, matched disjunctively
//! (`chain A B` selects both chains).

use crate::core::models::atom::Atom;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("empty selection string")]
    Empty,
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("keyword '{0}' requires at least one value")]
    MissingValue(&'static str),
    #[error("invalid residue number '{0}'")]
    InvalidResidueNumber(String),
    #[error("chain identifier '{0}' must be a single character")]
    InvalidChainId(String),
    #[error("unexpected end of selection")]
    UnexpectedEnd,
    #[error("unbalanced parenthesis")]
    UnbalancedParenthesis,
}

/// A parsed selection predicate over atom metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionExpr {
    All,
    Protein,
    Water,
    Hetero,
    Backbone,
    Hydrogen,
    Chain(Vec<char>),
    ResName(Vec<String>),
    ResNum(Vec<isize>),
    Name(Vec<String>),
    Element(Vec<String>),
    Not(Box<SelectionExpr>),
    And(Box<SelectionExpr>, Box<SelectionExpr>),
    Or(Box<SelectionExpr>, Box<SelectionExpr>),
}

impl SelectionExpr {
    /// Evaluates the predicate against a single atom.
    pub fn matches(&self, atom: &Atom) -> bool {
        match self {
            SelectionExpr::All => true,
            SelectionExpr::Protein => atom.is_protein(),
            SelectionExpr::Water => atom.is_water(),
            SelectionExpr::Hetero => atom.hetero,
            SelectionExpr::Backbone => atom.is_backbone(),
            SelectionExpr::Hydrogen => atom.is_hydrogen(),
            SelectionExpr::Chain(ids) => ids.iter().any(|&id| id == atom.chain_id),
            SelectionExpr::ResName(names) => names
                .iter()
                .any(|n| n.eq_ignore_ascii_case(&atom.residue_name)),
            SelectionExpr::ResNum(numbers) => numbers.contains(&atom.residue_number),
            SelectionExpr::Name(names) => {
                names.iter().any(|n| n.eq_ignore_ascii_case(&atom.name))
            }
            SelectionExpr::Element(symbols) => symbols
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&atom.element)),
            SelectionExpr::Not(inner) => !inner.matches(atom),
            SelectionExpr::And(a, b) => a.matches(atom) && b.matches(atom),
            SelectionExpr::Or(a, b) => a.matches(atom) || b.matches(atom),
        }
    }
}

impl FromStr for SelectionExpr {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s);
        if tokens.is_empty() {
            return Err(SelectionError::Empty);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_or()?;
        match parser.peek() {
            None => Ok(expr),
            Some(")") => Err(SelectionError::UnbalancedParenthesis),
            Some(tok) => Err(SelectionError::UnexpectedToken(tok.to_string())),
        }
    }
}

fn tokenize(s: &str) -> Vec<String> {
    s.replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

fn is_reserved(token: &str) -> bool {
    matches!(
        token.to_ascii_lowercase().as_str(),
        "and"
            | "or"
            | "not"
            | "("
            | ")"
            | "all"
            | "protein"
            | "water"
            | "hetero"
            | "backbone"
            | "hydrogen"
            | "chain"
            | "resname"
            | "resnum"
            | "resid"
            | "name"
            | "element"
    )
}

struct Parser {
    tokens: Vec<String>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(|t| t.as_str())
    }

    fn next(&mut self) -> Option<&str> {
        let token = self.tokens.get(self.pos).map(|t| t.as_str());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<SelectionExpr, SelectionError> {
        let mut left = self.parse_and()?;
        while self
            .peek()
            .is_some_and(|t| t.eq_ignore_ascii_case("or"))
        {
            self.next();
            let right = self.parse_and()?;
            left = SelectionExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<SelectionExpr, SelectionError> {
        let mut left = self.parse_unary()?;
        while self
            .peek()
            .is_some_and(|t| t.eq_ignore_ascii_case("and"))
        {
            self.next();
            let right = self.parse_unary()?;
            left = SelectionExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<SelectionExpr, SelectionError> {
        match self.peek() {
            None => Err(SelectionError::UnexpectedEnd),
            Some(t) if t.eq_ignore_ascii_case("not") => {
                self.next();
                Ok(SelectionExpr::Not(Box::new(self.parse_unary()?)))
            }
            Some("(") => {
                self.next();
                let inner = self.parse_or()?;
                match self.next() {
                    Some(")") => Ok(inner),
                    _ => Err(SelectionError::UnbalancedParenthesis),
                }
            }
            Some(_) => self.parse_term(),
        }
    }

    fn parse_term(&mut self) -> Result<SelectionExpr, SelectionError> {
        let keyword = self
            .next()
            .ok_or(SelectionError::UnexpectedEnd)?
            .to_ascii_lowercase();
        match keyword.as_str() {
            "all" => Ok(SelectionExpr::All),
            "protein" => Ok(SelectionExpr::Protein),
            "water" => Ok(SelectionExpr::Water),
            "hetero" => Ok(SelectionExpr::Hetero),
            "backbone" => Ok(SelectionExpr::Backbone),
            "hydrogen" => Ok(SelectionExpr::Hydrogen),
            "chain" => {
                let values = self.collect_values("chain")?;
                let mut ids = Vec::with_capacity(values.len());
                for value in values {
                    let mut chars = value.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => ids.push(c),
                        _ => return Err(SelectionError::InvalidChainId(value)),
                    }
                }
                Ok(SelectionExpr::Chain(ids))
            }
            "resname" => Ok(SelectionExpr::ResName(self.collect_values("resname")?)),
            "resnum" | "resid" => {
                let values = self.collect_values("resnum")?;
                let mut numbers = Vec::with_capacity(values.len());
                for value in values {
                    numbers.push(
                        value
                            .parse()
                            .map_err(|_| SelectionError::InvalidResidueNumber(value.clone()))?,
                    );
                }
                Ok(SelectionExpr::ResNum(numbers))
            }
            "name" => Ok(SelectionExpr::Name(self.collect_values("name")?)),
            "element" => Ok(SelectionExpr::Element(self.collect_values("element")?)),
            other => Err(SelectionError::UnexpectedToken(other.to_string())),
        }
    }

    fn collect_values(&mut self, keyword: &'static str) -> Result<Vec<String>, SelectionError> {
        let mut values = Vec::new();
        while let Some(token) = self.peek() {
            if is_reserved(token) {
                break;
            }
            values.push(token.to_string());
            self.next();
        }
        if values.is_empty() {
            return Err(SelectionError::MissingValue(keyword));
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn protein_atom(chain: char, residue: &str, name: &str) -> Atom {
        Atom::new(1, name, residue, chain, 1, Point3::origin())
    }

    fn hetero_atom(chain: char, residue: &str, name: &str) -> Atom {
        let mut atom = protein_atom(chain, residue, name);
        atom.hetero = true;
        atom
    }

    #[test]
    fn default_receptor_selection_filters_water_and_hetero() {
        let expr = SelectionExpr::from_str("chain A and not water and not hetero").unwrap();

        assert!(expr.matches(&protein_atom('A', "ALA", "CA")));
        assert!(!expr.matches(&protein_atom('B', "ALA", "CA")));
        assert!(!expr.matches(&hetero_atom('A', "HOH", "O")));
        assert!(!expr.matches(&hetero_atom('A', "STI", "C1")));
    }

    #[test]
    fn resname_matches_case_insensitively() {
        let expr = SelectionExpr::from_str("resname sti").unwrap();
        assert!(expr.matches(&hetero_atom('A', "STI", "C1")));
        assert!(!expr.matches(&protein_atom('A', "ALA", "CA")));
    }

    #[test]
    fn multi_value_keywords_match_disjunctively() {
        let expr = SelectionExpr::from_str("chain A B").unwrap();
        assert!(expr.matches(&protein_atom('A', "ALA", "CA")));
        assert!(expr.matches(&protein_atom('B', "ALA", "CA")));
        assert!(!expr.matches(&protein_atom('C', "ALA", "CA")));
    }

    #[test]
    fn or_binds_looser_than_and() {
        // Parsed as (chain A and backbone) or water.
        let expr = SelectionExpr::from_str("chain A and backbone or water").unwrap();
        assert!(expr.matches(&protein_atom('A', "ALA", "CA")));
        assert!(!expr.matches(&protein_atom('A', "ALA", "CB")));
        assert!(expr.matches(&hetero_atom('B', "HOH", "O")));
    }

    #[test]
    fn parentheses_override_precedence() {
        let expr = SelectionExpr::from_str("chain A and (backbone or water)").unwrap();
        assert!(!expr.matches(&hetero_atom('B', "HOH", "O")));
        assert!(expr.matches(&hetero_atom('A', "HOH", "O")));
    }

    #[test]
    fn resnum_selects_by_residue_number() {
        let expr = SelectionExpr::from_str("resnum 5 7").unwrap();
        let mut atom = protein_atom('A', "ALA", "CA");
        atom.residue_number = 5;
        assert!(expr.matches(&atom));
        atom.residue_number = 6;
        assert!(!expr.matches(&atom));
    }

    #[test]
    fn parse_errors_are_reported() {
        assert_eq!(
            SelectionExpr::from_str("").unwrap_err(),
            SelectionError::Empty
        );
        assert_eq!(
            SelectionExpr::from_str("chain").unwrap_err(),
            SelectionError::MissingValue("chain")
        );
        assert_eq!(
            SelectionExpr::from_str("chain AB").unwrap_err(),
            SelectionError::InvalidChainId("AB".to_string())
        );
        assert_eq!(
            SelectionExpr::from_str("resnum five").unwrap_err(),
            SelectionError::InvalidResidueNumber("five".to_string())
        );
        assert_eq!(
            SelectionExpr::from_str("(chain A").unwrap_err(),
            SelectionError::UnbalancedParenthesis
        );
        assert_eq!(
            SelectionExpr::from_str("chain A)").unwrap_err(),
            SelectionError::UnbalancedParenthesis
        );
        assert!(matches!(
            SelectionExpr::from_str("frobnicate").unwrap_err(),
            SelectionError::UnexpectedToken(_)
        ));
        assert_eq!(
            SelectionExpr::from_str("not").unwrap_err(),
            SelectionError::UnexpectedEnd
        );
    }
}
