//! The publishing collaborator contract.
//!
//! A workflow caller may supply a sink (a chat artifact store, an upload
//! endpoint, a test recorder); the workflow pushes each persisted artifact
//! to it exactly once. When no sink is supplied, artifacts only live on
//! disk.

/// MIME types used for published artifacts.
pub mod mime {
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const CHEMICAL_PDB: &str = "chemical/x-pdb";
}

/// Receives persisted preparation artifacts.
pub trait ArtifactSink {
    /// Accepts one artifact: its name, raw byte content, and MIME type.
    fn publish(&mut self, name: &str, content: &[u8], mime: &str);
}
