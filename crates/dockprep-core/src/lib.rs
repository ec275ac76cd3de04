//! # Dockprep Core Library
//!
//! A library for preparing small-molecule ligands and protein receptors as
//! inputs for molecular-docking engines. It converts a chemical identifier
//! (a SMILES string or a 4-character PDB accession) into charge-annotated
//! structure files plus the search-box geometry a docking run needs, by
//! orchestrating optional external tools and degrading gracefully when they
//! are not installed.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   ([`core::models::structure::Structure`]), the atom selection language,
//!   SMILES validation, and structural file I/O.
//!
//! - **[`pipeline`]: The Stage Logic.** The individual preparation stages:
//!   cached structure retrieval, external-tool discovery and bounded
//!   invocation, the degradable protonation and format-conversion stages,
//!   and search-box geometry.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level,
//!   user-facing layer. It sequences the pipeline stages into the two
//!   complete preparation procedures, [`workflows::receptor::prepare_receptor`]
//!   and [`workflows::ligand::prepare_ligand`].

pub mod core;
pub mod pipeline;
pub mod workflows;
