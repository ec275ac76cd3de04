//! Static residue and atom-name classification tables.
//!
//! The selection language resolves keywords such as `protein` and `water`
//! against these tables. Lookups are case-insensitive over the uppercased
//! residue name.

use phf::phf_set;

/// The 20 standard amino acids plus common protonation-variant and
/// modified-residue names encountered in deposited structures.
static STANDARD_AMINO_ACIDS: phf::Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    // Histidine protonation variants and disulfide-bonded cysteine.
    "HID", "HIE", "HIP", "CYX",
    // Selenomethionine, commonly deposited in place of MET.
    "MSE",
};

/// Residue names used for water/solvent molecules across common force fields.
static WATER_RESIDUES: phf::Set<&'static str> = phf_set! {
    "HOH", "WAT", "H2O", "DOD", "TIP", "TIP3", "TIP4", "SPC", "SOL",
};

/// Protein backbone atom names, including the C-terminal carboxylate oxygen.
static BACKBONE_ATOMS: phf::Set<&'static str> = phf_set! {
    "N", "CA", "C", "O", "OXT",
};

/// Returns `true` if `residue_name` is a standard amino acid.
pub fn is_standard_amino_acid(residue_name: &str) -> bool {
    STANDARD_AMINO_ACIDS.contains(residue_name.to_ascii_uppercase().as_str())
}

/// Returns `true` if `residue_name` denotes a water molecule.
pub fn is_water(residue_name: &str) -> bool {
    WATER_RESIDUES.contains(residue_name.to_ascii_uppercase().as_str())
}

/// Returns `true` if `atom_name` is a protein backbone atom name.
pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOMS.contains(atom_name.to_ascii_uppercase().as_str())
}
