//! Ligand preparation: from a SMILES string to a docking input.
//!
//! Two fixed external stages with no fallback: conformer/protonation-state
//! enumeration via `scrub.py` (molscrub) and docking-format conversion via
//! `mk_prepare_ligand` (meeko). Unlike the receptor pipeline, a missing
//! tool here is fatal: there is nothing to degrade to without a 3D
//! conformer.

use crate::core::smiles;
use crate::pipeline::error::PrepError;
use crate::pipeline::tools::{self, RunOutcome, ToolSpec};
use crate::workflows::publish::{ArtifactSink, mime};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

const SCRUB: ToolSpec = ToolSpec {
    primary: "scrub.py",
    alternate: Some("molscrub"),
    python_module: Some("molscrub"),
};

const MK_PREPARE_LIGAND: ToolSpec = ToolSpec {
    primary: "mk_prepare_ligand",
    alternate: Some("mk_prepare_ligand.py"),
    python_module: None,
};

const SCRUB_TIMEOUT: Duration = Duration::from_secs(60);
const CONVERT_TIMEOUT: Duration = Duration::from_secs(120);

/// Parameters for one ligand preparation run.
#[derive(Debug, Clone)]
pub struct LigandRequest {
    /// The SMILES string of the ligand molecule.
    pub smiles: String,
    /// Base name for the output file (`<output_name>.pdbqt`).
    pub output_name: String,
    /// Protonation pH.
    pub ph: f64,
    /// Skip tautomer enumeration.
    pub skip_tautomers: bool,
    /// Skip acid-base (protonation state) enumeration.
    pub skip_acidbase: bool,
}

impl LigandRequest {
    pub fn new(smiles: impl Into<String>) -> Self {
        Self {
            smiles: smiles.into(),
            output_name: "ligand".to_string(),
            ph: 6.0,
            skip_tautomers: true,
            skip_acidbase: false,
        }
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    pub fn with_ph(mut self, ph: f64) -> Self {
        self.ph = ph;
        self
    }

    pub fn with_skip_tautomers(mut self, skip: bool) -> Self {
        self.skip_tautomers = skip;
        self
    }

    pub fn with_skip_acidbase(mut self, skip: bool) -> Self {
        self.skip_acidbase = skip;
        self
    }
}

/// Prepares a ligand docking input from a SMILES string.
///
/// Sequence: validate the SMILES, enumerate protonated 3D conformers at the
/// requested pH, deterministically take the first isomer produced, and
/// convert it to the docking format.
///
/// Taking the first isomer mirrors the behavior this pipeline replaces; a
/// scoring step ranking the enumerated isomers would slot in where the
/// first SDF record is split off.
///
/// # Errors
///
/// [`PrepError::InvalidSmiles`] for strings that do not denote a molecular
/// graph, [`PrepError::ConformerGeneration`] when enumeration fails or
/// yields nothing, [`PrepError::LigandConversion`] when conversion fails or
/// produces no output.
#[instrument(skip_all, name = "ligand_workflow")]
pub fn prepare_ligand(
    request: &LigandRequest,
    sink: Option<&mut dyn ArtifactSink>,
) -> Result<String, PrepError> {
    smiles::validate(&request.smiles).map_err(|e| PrepError::InvalidSmiles {
        smiles: request.smiles.clone(),
        reason: e.to_string(),
    })?;

    // Intermediates live in a scoped directory removed on every exit path.
    let workdir = tempfile::tempdir()?;

    let scrubbed = workdir.path().join("scrubbed.sdf");
    run_scrub(request, &scrubbed)?;
    let isomer = first_isomer(&scrubbed, workdir.path())?;

    let output = PathBuf::from(format!("{}.pdbqt", request.output_name));
    run_mk_prepare_ligand(&isomer, &request.output_name, &output)?;

    if let Some(sink) = sink {
        let content = fs::read(&output)?;
        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| output.display().to_string());
        sink.publish(&name, &content, mime::TEXT_PLAIN);
    }

    let abs = std::path::absolute(&output)?;
    info!(output = %abs.display(), "ligand preparation complete");
    Ok(format!(
        "Ligand successfully prepared and saved to: {}",
        abs.display()
    ))
}

fn run_scrub(request: &LigandRequest, output_sdf: &Path) -> Result<(), PrepError> {
    let invocation = tools::locate(&SCRUB).ok_or_else(|| {
        PrepError::ConformerGeneration("scrub not available (install molscrub)".to_string())
    })?;

    info!(smiles = %request.smiles, ph = request.ph, "running scrub");
    let mut cmd = invocation.command();
    cmd.arg(&request.smiles)
        .arg("-o")
        .arg(output_sdf)
        .arg("--ph_low")
        .arg(request.ph.to_string())
        .arg("--ph_high")
        .arg(request.ph.to_string());
    if request.skip_tautomers {
        cmd.arg("--skip_tautomers");
    }
    if request.skip_acidbase {
        cmd.arg("--skip_acidbase");
    }

    match tools::run_with_timeout(&mut cmd, SCRUB_TIMEOUT) {
        Err(e) => Err(PrepError::ConformerGeneration(format!(
            "failed to launch scrub: {e}"
        ))),
        Ok(RunOutcome::TimedOut) => {
            Err(PrepError::ConformerGeneration("scrub timed out".to_string()))
        }
        Ok(RunOutcome::Completed(run)) if !run.status.success() => Err(
            PrepError::ConformerGeneration(format!("scrub failed: {}", run.stderr_summary())),
        ),
        Ok(RunOutcome::Completed(_)) => Ok(()),
    }
}

/// Splits the first record out of a multi-record SDF.
///
/// The enumeration tool may emit several isomers; the first one is selected
/// deterministically.
fn first_isomer(scrubbed_sdf: &Path, workdir: &Path) -> Result<PathBuf, PrepError> {
    let content = fs::read_to_string(scrubbed_sdf).map_err(|e| {
        PrepError::ConformerGeneration(format!("scrub produced no readable output: {e}"))
    })?;

    let first = content
        .split("$$$$")
        .map(str::trim)
        .find(|record| !record.is_empty())
        .ok_or_else(|| {
            PrepError::ConformerGeneration("scrub generated zero isomers".to_string())
        })?;

    let isomer_path = workdir.join("isomer0.sdf");
    fs::write(&isomer_path, format!("{first}\n$$$$\n"))?;
    Ok(isomer_path)
}

fn run_mk_prepare_ligand(
    isomer_sdf: &Path,
    output_name: &str,
    expected_output: &Path,
) -> Result<(), PrepError> {
    let invocation = tools::locate(&MK_PREPARE_LIGAND).ok_or_else(|| {
        PrepError::LigandConversion("mk_prepare_ligand not available (install meeko)".to_string())
    })?;

    info!(input = %isomer_sdf.display(), "running mk_prepare_ligand");
    let mut cmd = invocation.command();
    cmd.arg("-i").arg(isomer_sdf).arg("-o").arg(output_name);

    match tools::run_with_timeout(&mut cmd, CONVERT_TIMEOUT) {
        Err(e) => Err(PrepError::LigandConversion(format!(
            "failed to launch mk_prepare_ligand: {e}"
        ))),
        Ok(RunOutcome::TimedOut) => Err(PrepError::LigandConversion(
            "mk_prepare_ligand timed out".to_string(),
        )),
        Ok(RunOutcome::Completed(run)) if !run.status.success() => Err(
            PrepError::LigandConversion(format!(
                "mk_prepare_ligand failed: {}",
                run.stderr_summary()
            )),
        ),
        Ok(RunOutcome::Completed(_)) if !expected_output.exists() => {
            Err(PrepError::LigandConversion(
                "mk_prepare_ligand exited cleanly but produced no output".to_string(),
            ))
        }
        Ok(RunOutcome::Completed(_)) => Ok(()),
    }
}
