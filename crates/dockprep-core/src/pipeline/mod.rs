//! The individual preparation stages and their shared plumbing.
//!
//! Stages that depend on optional third-party tools ([`protonate`],
//! [`convert`]) report degradation through outcome values instead of errors;
//! everything else surfaces typed failures through [`error::PrepError`].

pub mod convert;
pub mod error;
pub mod gridbox;
pub mod protonate;
pub mod source;
pub mod tools;
