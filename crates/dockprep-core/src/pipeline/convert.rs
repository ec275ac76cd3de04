//! Conversion to the charge-annotated docking format.
//!
//! Drives the external `mk_prepare_receptor` converter when it is on the
//! search path. When it is absent or fails, the stage falls back to a
//! verbatim copy of its input: the resulting file is a valid (if
//! charge-less) docking input, and the orchestrator reports that partial
//! charges were not assigned.

use crate::pipeline::gridbox::BoxSpec;
use crate::pipeline::tools::{self, RunOutcome, ToolSpec};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const MK_PREPARE_RECEPTOR: ToolSpec = ToolSpec {
    primary: "mk_prepare_receptor",
    alternate: Some("mk_prepare_receptor.py"),
    python_module: None,
};

const CONVERT_TIMEOUT: Duration = Duration::from_secs(120);

/// How the conversion stage produced its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The external converter ran; partial charges are authoritative.
    Converted,
    /// The output is a verbatim copy of the input; no partial charges.
    Fallback { reason: String },
}

/// Produces `<output_name>.pdbqt` from `input`, preferring the external
/// converter and falling back to a direct copy.
///
/// # Errors
///
/// Only the fallback copy itself can fail (its input is guaranteed to exist
/// by the orchestrator); converter absence or failure is reported through
/// [`ConversionOutcome::Fallback`], not as an error.
pub fn convert_receptor(
    input: &Path,
    output_name: &str,
    bx: &BoxSpec,
) -> io::Result<(PathBuf, ConversionOutcome)> {
    let output = PathBuf::from(format!("{output_name}.pdbqt"));

    let outcome = match try_converter(input, output_name, &output, bx) {
        Ok(()) => ConversionOutcome::Converted,
        Err(reason) => {
            warn!(%reason, "falling back to direct copy for docking format");
            fs::copy(input, &output)?;
            ConversionOutcome::Fallback { reason }
        }
    };
    Ok((output, outcome))
}

fn try_converter(
    input: &Path,
    output_name: &str,
    expected_output: &Path,
    bx: &BoxSpec,
) -> Result<(), String> {
    let invocation =
        tools::locate(&MK_PREPARE_RECEPTOR).ok_or("mk_prepare_receptor not available")?;

    info!(input = %input.display(), "running mk_prepare_receptor");
    let mut cmd = invocation.command();
    cmd.arg("-i")
        .arg(input)
        .arg("-o")
        .arg(output_name)
        .arg("-p")
        .arg("-v")
        .arg("--box_center")
        .arg(bx.center.x.to_string())
        .arg(bx.center.y.to_string())
        .arg(bx.center.z.to_string())
        .arg("--box_size")
        .arg(bx.size.x.to_string())
        .arg(bx.size.y.to_string())
        .arg(bx.size.z.to_string());

    match tools::run_with_timeout(&mut cmd, CONVERT_TIMEOUT) {
        Err(e) => Err(format!("failed to launch mk_prepare_receptor: {e}")),
        Ok(RunOutcome::TimedOut) => Err("mk_prepare_receptor timed out".to_string()),
        Ok(RunOutcome::Completed(run)) if !run.status.success() => {
            Err(format!("mk_prepare_receptor failed: {}", run.stderr_summary()))
        }
        // A zero exit status alone is not success: the expected output file
        // must also exist.
        Ok(RunOutcome::Completed(_)) if !expected_output.exists() => {
            Err("mk_prepare_receptor exited cleanly but produced no output".to_string())
        }
        Ok(RunOutcome::Completed(_)) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn missing_converter_falls_back_to_verbatim_copy() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rec_clean.pdb");
        fs::write(&input, "ATOM payload\n").unwrap();

        let output_name = dir.path().join("rec").to_string_lossy().into_owned();
        let bx = BoxSpec::new(Point3::origin(), Vector3::new(20.0, 20.0, 20.0));

        // mk_prepare_receptor is not installed in the test environment.
        let (output, outcome) = convert_receptor(&input, &output_name, &bx).unwrap();

        assert!(matches!(outcome, ConversionOutcome::Fallback { .. }));
        assert_eq!(output, dir.path().join("rec.pdbqt"));
        assert_eq!(
            fs::read(&output).unwrap(),
            fs::read(&input).unwrap(),
            "fallback output must be byte-identical to its input"
        );
    }
}
