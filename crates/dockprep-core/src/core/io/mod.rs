//! Reading and writing of structural file formats.
//!
//! Provides a unified trait-based interface for structure I/O plus the
//! fixed-column PDB implementation the preparation pipeline works with.

pub mod pdb;
pub mod traits;
