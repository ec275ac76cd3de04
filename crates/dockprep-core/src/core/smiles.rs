//! Syntactic validation of SMILES strings.
//!
//! Ligand preparation starts from a SMILES string supplied by the caller.
//! Conformer generation and charge assignment are delegated to external
//! tools, but a string that cannot denote a molecular graph at all is
//! rejected here, before any subprocess is spawned. The validator checks
//! atom syntax (organic subset and bracket atoms), bond symbols, branch
//! balancing, and ring-closure pairing. It does not attempt valence or
//! aromaticity perception.

use phf::phf_set;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    Empty,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unknown element symbol '{symbol}' at position {pos}")]
    UnknownElement { symbol: String, pos: usize },
    #[error("unterminated bracket atom starting at position {pos}")]
    UnterminatedBracket { pos: usize },
    #[error("invalid bracket atom '[{body}]' at position {pos}")]
    InvalidBracketAtom { body: String, pos: usize },
    #[error("unclosed branch: missing ')'")]
    UnclosedBranch,
    #[error("unmatched ')' at position {pos}")]
    UnmatchedClose { pos: usize },
    #[error("bond symbol at position {pos} is not followed by an atom")]
    DanglingBond { pos: usize },
    #[error("unpaired ring-closure label {label}")]
    UnpairedRingBond { label: u16 },
    #[error("ring-closure digit at position {pos} must follow an atom")]
    MisplacedRingBond { pos: usize },
}

/// Summary of a successfully validated SMILES string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmilesSummary {
    /// Number of atoms in the string.
    pub atoms: usize,
    /// Number of ring-closure bond pairs.
    pub rings: usize,
}

/// All IUPAC element symbols, for validating bracket-atom contents.
static ELEMENT_SYMBOLS: phf::Set<&'static str> = phf_set! {
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al",
    "Si", "P", "S", "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe",
    "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr",
    "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm",
    "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W",
    "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn",
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu",
};

const BOND_CHARS: &[char] = &['-', '=', '#', '$', ':', '/', '\\'];

/// Validates that `smiles` is a syntactically well-formed SMILES string.
///
/// # Errors
///
/// Returns a [`SmilesError`] describing the first defect found: an
/// unexpected character, an unknown element, an unbalanced branch, a
/// dangling bond, or an unpaired ring closure.
pub fn validate(smiles: &str) -> Result<SmilesSummary, SmilesError> {
    let trimmed = smiles.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::Empty);
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let mut pos = 0;
    let mut atoms = 0usize;
    let mut rings = 0usize;
    let mut branch_depth = 0usize;
    let mut open_rings: HashSet<u16> = HashSet::new();
    let mut last_was_atom = false;
    let mut pending_bond: Option<usize> = None;

    while pos < chars.len() {
        let ch = chars[pos];
        match ch {
            '[' => {
                let start = pos;
                let close = chars[pos..]
                    .iter()
                    .position(|&c| c == ']')
                    .ok_or(SmilesError::UnterminatedBracket { pos: start })?;
                let body: String = chars[pos + 1..pos + close].iter().collect();
                validate_bracket_body(&body, start)?;
                pos += close + 1;
                atoms += 1;
                last_was_atom = true;
                pending_bond = None;
            }
            'A'..='Z' => {
                // Organic subset: two-letter Cl/Br, else single letter.
                let symbol = if pos + 1 < chars.len()
                    && matches!((ch, chars[pos + 1]), ('C', 'l') | ('B', 'r'))
                {
                    pos += 2;
                    chars[pos - 2..pos].iter().collect::<String>()
                } else {
                    pos += 1;
                    ch.to_string()
                };
                if !matches!(symbol.as_str(), "B" | "C" | "N" | "O" | "P" | "S" | "F" | "Cl" | "Br" | "I")
                {
                    return Err(SmilesError::UnknownElement {
                        symbol,
                        pos: pos - 1,
                    });
                }
                atoms += 1;
                last_was_atom = true;
                pending_bond = None;
            }
            'b' | 'c' | 'n' | 'o' | 'p' | 's' => {
                pos += 1;
                atoms += 1;
                last_was_atom = true;
                pending_bond = None;
            }
            '*' => {
                pos += 1;
                atoms += 1;
                last_was_atom = true;
                pending_bond = None;
            }
            '0'..='9' => {
                if !last_was_atom && pending_bond.is_none() {
                    return Err(SmilesError::MisplacedRingBond { pos });
                }
                toggle_ring(&mut open_rings, &mut rings, (ch as u16) - ('0' as u16));
                pos += 1;
                pending_bond = None;
            }
            '%' => {
                if pos + 2 >= chars.len()
                    || !chars[pos + 1].is_ascii_digit()
                    || !chars[pos + 2].is_ascii_digit()
                {
                    return Err(SmilesError::UnexpectedChar { ch, pos });
                }
                if !last_was_atom && pending_bond.is_none() {
                    return Err(SmilesError::MisplacedRingBond { pos });
                }
                let label = (chars[pos + 1] as u16 - '0' as u16) * 10
                    + (chars[pos + 2] as u16 - '0' as u16);
                toggle_ring(&mut open_rings, &mut rings, label);
                pos += 3;
                pending_bond = None;
            }
            '(' => {
                if !last_was_atom {
                    return Err(SmilesError::UnexpectedChar { ch, pos });
                }
                branch_depth += 1;
                pos += 1;
            }
            ')' => {
                if branch_depth == 0 {
                    return Err(SmilesError::UnmatchedClose { pos });
                }
                if let Some(bond_pos) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                branch_depth -= 1;
                last_was_atom = true;
                pos += 1;
            }
            '.' => {
                if let Some(bond_pos) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                last_was_atom = false;
                pos += 1;
            }
            c if BOND_CHARS.contains(&c) => {
                pending_bond = Some(pos);
                last_was_atom = false;
                pos += 1;
            }
            _ => return Err(SmilesError::UnexpectedChar { ch, pos }),
        }
    }

    if let Some(bond_pos) = pending_bond {
        return Err(SmilesError::DanglingBond { pos: bond_pos });
    }
    if branch_depth > 0 {
        return Err(SmilesError::UnclosedBranch);
    }
    if let Some(&label) = open_rings.iter().next() {
        return Err(SmilesError::UnpairedRingBond { label });
    }
    if atoms == 0 {
        return Err(SmilesError::Empty);
    }

    Ok(SmilesSummary { atoms, rings })
}

fn toggle_ring(open: &mut HashSet<u16>, rings: &mut usize, label: u16) {
    if !open.remove(&label) {
        open.insert(label);
    } else {
        *rings += 1;
    }
}

/// Validates the interior of a bracket atom: `isotope? symbol chiral?
/// hcount? charge? class?`.
fn validate_bracket_body(body: &str, pos: usize) -> Result<(), SmilesError> {
    let invalid = || SmilesError::InvalidBracketAtom {
        body: body.to_string(),
        pos,
    };
    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;

    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1; // isotope
    }

    // Element symbol: one uppercase plus optional lowercase, or an aromatic
    // lowercase symbol, or the wildcard.
    let symbol_ok = if i < chars.len() && chars[i] == '*' {
        i += 1;
        true
    } else if i < chars.len() && chars[i].is_ascii_uppercase() {
        let mut symbol = chars[i].to_string();
        i += 1;
        if i < chars.len() && chars[i].is_ascii_lowercase() {
            let two: String = format!("{}{}", symbol, chars[i]);
            if ELEMENT_SYMBOLS.contains(two.as_str()) {
                symbol = two;
                i += 1;
            }
        }
        ELEMENT_SYMBOLS.contains(symbol.as_str())
    } else if i < chars.len() && chars[i].is_ascii_lowercase() {
        let aromatic = matches!(chars[i], 'b' | 'c' | 'n' | 'o' | 'p' | 's');
        // Two-letter aromatic "se" / "as".
        if i + 1 < chars.len()
            && matches!(
                (chars[i], chars[i + 1]),
                ('s', 'e') | ('a', 's')
            )
        {
            i += 2;
            true
        } else if aromatic {
            i += 1;
            true
        } else {
            false
        }
    } else {
        false
    };
    if !symbol_ok {
        return Err(invalid());
    }

    // Chirality markers.
    while i < chars.len() && chars[i] == '@' {
        i += 1;
    }
    // Explicit hydrogen count.
    if i < chars.len() && chars[i] == 'H' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    // Charge: one or more +/- optionally followed by digits.
    if i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
        let sign = chars[i];
        while i < chars.len() && chars[i] == sign {
            i += 1;
        }
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    // Atom-map class.
    if i < chars.len() && chars[i] == ':' {
        i += 1;
        if i >= chars.len() || !chars[i].is_ascii_digit() {
            return Err(invalid());
        }
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }

    if i == chars.len() { Ok(()) } else { Err(invalid()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_chains() {
        let summary = validate("CCO").unwrap();
        assert_eq!(summary.atoms, 3);
        assert_eq!(summary.rings, 0);
    }

    #[test]
    fn accepts_branches_and_double_bonds() {
        let summary = validate("CC(=O)O").unwrap();
        assert_eq!(summary.atoms, 4);
    }

    #[test]
    fn accepts_aromatic_rings() {
        let summary = validate("c1ccccc1").unwrap();
        assert_eq!(summary.atoms, 6);
        assert_eq!(summary.rings, 1);
    }

    #[test]
    fn accepts_bracket_atoms_and_charges() {
        assert!(validate("[NH4+]").is_ok());
        assert!(validate("[13CH4]").is_ok());
        assert!(validate("[O-]C(=O)C").is_ok());
        assert!(validate("[Fe+2]").is_ok());
        assert!(validate("C[C@H](N)C(=O)O").is_ok());
    }

    #[test]
    fn accepts_two_letter_organic_elements() {
        assert!(validate("ClCCBr").is_ok());
    }

    #[test]
    fn accepts_percent_ring_closures() {
        assert!(validate("C%10CCCCC%10").is_ok());
    }

    #[test]
    fn accepts_imatinib() {
        let smiles = "Cc1ccc(NC(=O)c2ccc(CN3CCN(C)CC3)cc2)cc1Nc1nccc(-c2cccnc2)n1";
        assert!(validate(smiles).is_ok());
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert_eq!(validate("").unwrap_err(), SmilesError::Empty);
        assert_eq!(validate("   ").unwrap_err(), SmilesError::Empty);
    }

    #[test]
    fn rejects_unbalanced_branches() {
        assert_eq!(validate("CC(C").unwrap_err(), SmilesError::UnclosedBranch);
        assert!(matches!(
            validate("CC)C").unwrap_err(),
            SmilesError::UnmatchedClose { .. }
        ));
    }

    #[test]
    fn rejects_unpaired_ring_closures() {
        assert!(matches!(
            validate("C1CCC").unwrap_err(),
            SmilesError::UnpairedRingBond { label: 1 }
        ));
    }

    #[test]
    fn rejects_dangling_bonds() {
        assert!(matches!(
            validate("CC=").unwrap_err(),
            SmilesError::DanglingBond { .. }
        ));
        assert!(matches!(
            validate("C(=)C").unwrap_err(),
            SmilesError::DanglingBond { .. }
        ));
    }

    #[test]
    fn rejects_unknown_symbols() {
        assert!(matches!(
            validate("CEC").unwrap_err(),
            SmilesError::UnknownElement { .. }
        ));
        assert!(matches!(
            validate("C!C").unwrap_err(),
            SmilesError::UnexpectedChar { ch: '!', .. }
        ));
        assert!(matches!(
            validate("[Xx]").unwrap_err(),
            SmilesError::InvalidBracketAtom { .. }
        ));
    }
}
