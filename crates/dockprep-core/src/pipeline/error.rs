use crate::core::io::pdb::PdbError;
use crate::core::selection::SelectionError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("Invalid PDB identifier '{0}': must be exactly 4 characters")]
    InvalidIdentifier(String),

    #[error("Failed to download structure '{id}': {source}")]
    DownloadFailed {
        id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse structure: {source}")]
    Parse {
        #[from]
        source: PdbError,
    },

    #[error("Invalid selection expression: {source}")]
    Selection {
        #[from]
        source: SelectionError,
    },

    #[error("Selection '{0}' matched no atoms")]
    EmptySelection(String),

    #[error("Box reference selection '{0}' matched no atoms")]
    EmptyReferenceSelection(String),

    #[error("Invalid box center: expected exactly 3 components, got {0}")]
    InvalidBoxCenter(usize),

    #[error("Invalid box size: {0}")]
    InvalidBoxSize(String),

    #[error("Invalid SMILES string '{smiles}': {reason}")]
    InvalidSmiles { smiles: String, reason: String },

    #[error("Conformer generation failed: {0}")]
    ConformerGeneration(String),

    #[error("Ligand conversion failed: {0}")]
    LigandConversion(String),

    #[error("Preparation failed: {source}")]
    Preparation {
        #[from]
        source: io::Error,
    },
}
