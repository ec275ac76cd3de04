pub mod fetch;
pub mod ligand;
pub mod receptor;
