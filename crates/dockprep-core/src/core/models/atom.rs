use super::residue;
use nalgebra::Point3;

/// Represents a single atom read from a structural file.
///
/// This struct carries the identity and placement metadata a preparation
/// pipeline needs: PDB-style naming, residue and chain membership, 3D
/// coordinates, and whether the atom originated from a heterogen record.
/// Atoms are immutable once parsed; derived structures share copies.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom serial number from the source file.
    pub serial: usize,
    /// The atom name (e.g., "CA", "N", "O").
    pub name: String,
    /// The name of the residue this atom belongs to (e.g., "ALA", "HOH").
    pub residue_name: String,
    /// The single-character chain identifier.
    pub chain_id: char,
    /// The residue sequence number within the chain.
    pub residue_number: isize,
    /// The insertion code, if any.
    pub insertion_code: Option<char>,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The crystallographic occupancy.
    pub occupancy: f64,
    /// The isotropic B-factor.
    pub b_factor: f64,
    /// The element symbol (e.g., "C", "N", "FE").
    pub element: String,
    /// Whether the atom came from a HETATM record.
    pub hetero: bool,
}

impl Atom {
    /// Creates a new `Atom` with default values for the optional fields.
    ///
    /// Occupancy defaults to 1.0, the B-factor to 0.0, the element symbol is
    /// derived from the atom name, and the atom is treated as a non-hetero
    /// record. Fields can be adjusted afterward as needed.
    ///
    /// # Arguments
    ///
    /// * `serial` - The atom serial number.
    /// * `name` - The atom name.
    /// * `residue_name` - The name of the parent residue.
    /// * `chain_id` - The chain identifier.
    /// * `residue_number` - The residue sequence number.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(
        serial: usize,
        name: &str,
        residue_name: &str,
        chain_id: char,
        residue_number: isize,
        position: Point3<f64>,
    ) -> Self {
        Self {
            serial,
            name: name.to_string(),
            residue_name: residue_name.to_string(),
            chain_id,
            residue_number,
            insertion_code: None,
            position,
            occupancy: 1.0,
            b_factor: 0.0,
            element: element_from_name(name),
            hetero: false,
        }
    }

    /// Returns `true` if the parent residue is a water molecule.
    pub fn is_water(&self) -> bool {
        residue::is_water(&self.residue_name)
    }

    /// Returns `true` if the parent residue is a standard amino acid.
    pub fn is_protein(&self) -> bool {
        residue::is_standard_amino_acid(&self.residue_name)
    }

    /// Returns `true` if the atom is a protein backbone atom.
    pub fn is_backbone(&self) -> bool {
        self.is_protein() && residue::is_backbone_atom(&self.name)
    }

    /// Returns `true` if the atom is a hydrogen (or deuterium).
    pub fn is_hydrogen(&self) -> bool {
        matches!(self.element.as_str(), "H" | "D")
    }
}

/// Derives an element symbol from a PDB atom name.
///
/// The first alphabetic character of the name is used, which is correct for
/// the common single-letter elements in protein structures. Files that carry
/// an explicit element column override this guess during parsing.
pub(crate) fn element_from_name(name: &str) -> String {
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}
