use super::atom::Atom;
use crate::core::selection::SelectionExpr;
use nalgebra::Point3;

/// A crystallographic unit-cell record (PDB `CRYST1`).
#[derive(Debug, Clone, PartialEq)]
pub struct CrystalCell {
    /// Cell edge lengths a, b, c in Angstroms.
    pub lengths: (f64, f64, f64),
    /// Cell angles alpha, beta, gamma in degrees.
    pub angles: (f64, f64, f64),
    /// The space group symbol (e.g., "P 21 21 21").
    pub space_group: String,
    /// The Z value (number of polymeric chains in the unit cell).
    pub z: i32,
}

impl CrystalCell {
    /// The permissive P 1 unit cell used when a tool demands a `CRYST1`
    /// record and the structure does not carry one.
    pub fn placeholder() -> Self {
        Self {
            lengths: (1.0, 1.0, 1.0),
            angles: (90.0, 90.0, 90.0),
            space_group: "P 1".to_string(),
            z: 1,
        }
    }

    /// Formats the cell as a fixed-column PDB `CRYST1` record (no newline).
    pub fn to_record(&self) -> String {
        format!(
            "CRYST1{:9.3}{:9.3}{:9.3}{:7.2}{:7.2}{:7.2} {:<11}{:4}",
            self.lengths.0,
            self.lengths.1,
            self.lengths.2,
            self.angles.0,
            self.angles.1,
            self.angles.2,
            self.space_group,
            self.z,
        )
    }
}

/// An immutable atomic model loaded from a structural file.
///
/// A `Structure` is an ordered sequence of atoms plus at most one
/// crystallographic cell. It is never mutated after parsing; applying a
/// selection produces a new, derived `Structure`, which does not inherit
/// the cell (derived records describe sub-structures, not crystals).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    atoms: Vec<Atom>,
    cell: Option<CrystalCell>,
}

impl Structure {
    /// Creates a structure from parsed atoms and an optional unit cell.
    pub fn new(atoms: Vec<Atom>, cell: Option<CrystalCell>) -> Self {
        Self { atoms, cell }
    }

    /// Returns the atoms in file order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Returns the number of atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Returns `true` if the structure contains no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Returns the crystallographic cell, if the source file carried one.
    pub fn cell(&self) -> Option<&CrystalCell> {
        self.cell.as_ref()
    }

    /// Applies a selection predicate, producing a derived structure holding
    /// copies of the matching atoms in their original order.
    ///
    /// The result may be empty; callers decide whether an empty selection is
    /// an error.
    pub fn select(&self, expr: &SelectionExpr) -> Structure {
        Structure {
            atoms: self
                .atoms
                .iter()
                .filter(|atom| expr.matches(atom))
                .cloned()
                .collect(),
            cell: None,
        }
    }

    /// Computes the geometric center of the atom coordinates.
    ///
    /// Returns `None` for an empty structure.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.atoms.is_empty() {
            return None;
        }
        let sum = self
            .atoms
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, atom| {
                acc + atom.position.coords
            });
        Some(Point3::from(sum / self.atoms.len() as f64))
    }
}
