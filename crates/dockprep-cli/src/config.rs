//! Optional TOML configuration for receptor preparation.
//!
//! Every key is optional; command-line flags override file values.

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ReceptorFileConfig {
    /// Selection expression for the receptor atoms.
    pub selection: Option<String>,

    /// Selection expression whose centroid anchors the box.
    #[serde(rename = "box-reference")]
    pub box_reference: Option<String>,

    /// Explicit box center [x, y, z].
    #[serde(rename = "box-center")]
    pub box_center: Option<Vec<f64>>,

    /// Box dimensions [x, y, z] in Angstroms.
    #[serde(rename = "box-size")]
    pub box_size: Option<Vec<f64>>,
}

impl ReceptorFileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), ?config, "loaded receptor config file");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_kebab_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prep.toml");
        std::fs::write(
            &path,
            "selection = \"chain B and not water\"\n\
             box-reference = \"resname STI\"\n\
             box-size = [22.0, 24.0, 26.0]\n",
        )
        .unwrap();

        let config = ReceptorFileConfig::load(&path).unwrap();
        assert_eq!(config.selection.as_deref(), Some("chain B and not water"));
        assert_eq!(config.box_reference.as_deref(), Some("resname STI"));
        assert_eq!(config.box_size, Some(vec![22.0, 24.0, 26.0]));
        assert_eq!(config.box_center, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prep.toml");
        std::fs::write(&path, "not-a-real-key = 1\n").unwrap();

        assert!(matches!(
            ReceptorFileConfig::load(&path),
            Err(CliError::Config { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        assert!(matches!(
            ReceptorFileConfig::load(Path::new("/nonexistent/prep.toml")),
            Err(CliError::Config { .. })
        ));
    }
}
