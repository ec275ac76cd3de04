//! Hydrogen addition via the external `reduce2` tool.
//!
//! Deposited structures usually omit hydrogens, and the downstream docking
//! format wants them present. This stage drives `mmtbx.reduce2` (part of the
//! cctbx/mmtbx suite) when it can be found, and degrades to a no-op when it
//! cannot: a missing or failing protonation tool is a reported limitation of
//! the run, never an error.

use crate::core::models::structure::CrystalCell;
use crate::pipeline::tools::{self, RunOutcome, ToolSpec};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const REDUCE2: ToolSpec = ToolSpec {
    primary: "mmtbx.reduce2",
    alternate: Some("reduce2"),
    python_module: Some("mmtbx.command_line.reduce2"),
};

const REDUCE_TIMEOUT: Duration = Duration::from_secs(120);

/// How the protonation stage ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtonationOutcome {
    /// Hydrogens were added; the protonated file is at the given path.
    Protonated(PathBuf),
    /// The stage was skipped; the pipeline continues with the unprotonated
    /// structure.
    Skipped { reason: String },
}

/// Adds hydrogens to `clean_pdb`, writing the result to `output_pdb`.
///
/// `original_cell` is the unit cell of the un-cleaned source structure, if
/// it had one; `reduce2` refuses inputs without a `CRYST1` record, so when
/// the cleaned file lacks one a synthesized copy is prepared carrying either
/// that cell or a permissive placeholder. The cleaned file itself is never
/// modified.
///
/// This function does not fail: every error path degrades to
/// [`ProtonationOutcome::Skipped`] with the reason logged.
pub fn add_hydrogens(
    clean_pdb: &Path,
    output_pdb: &Path,
    original_cell: Option<&CrystalCell>,
) -> ProtonationOutcome {
    let Some(invocation) = tools::locate(&REDUCE2) else {
        warn!("reduce2 not found; skipping hydrogen addition");
        return ProtonationOutcome::Skipped {
            reason: "reduce2 not available".to_string(),
        };
    };

    match run_reduce2(&invocation, clean_pdb, output_pdb, original_cell) {
        Ok(()) => {
            info!(output = %output_pdb.display(), "hydrogens added");
            ProtonationOutcome::Protonated(output_pdb.to_path_buf())
        }
        Err(reason) => {
            warn!(%reason, "hydrogen addition skipped");
            ProtonationOutcome::Skipped { reason }
        }
    }
}

fn run_reduce2(
    invocation: &tools::ToolInvocation,
    clean_pdb: &Path,
    output_pdb: &Path,
    original_cell: Option<&CrystalCell>,
) -> Result<(), String> {
    let input = prepare_input(clean_pdb, original_cell)
        .map_err(|e| format!("could not stage input: {e}"))?;

    let result = invoke(invocation, input.path(), clean_pdb, output_pdb);
    input.cleanup();
    result
}

fn invoke(
    invocation: &tools::ToolInvocation,
    input: &Path,
    clean_pdb: &Path,
    output_pdb: &Path,
) -> Result<(), String> {
    info!(input = %input.display(), "running reduce2");
    let mut cmd = invocation.command();
    cmd.arg(input).arg("approach=add").arg("add_flip_movers=True");

    match tools::run_with_timeout(&mut cmd, REDUCE_TIMEOUT) {
        Err(e) => return Err(format!("failed to launch reduce2: {e}")),
        Ok(RunOutcome::TimedOut) => return Err("reduce2 timed out".to_string()),
        Ok(RunOutcome::Completed(run)) if !run.status.success() => {
            return Err(format!("reduce2 failed: {}", run.stderr_summary()));
        }
        Ok(RunOutcome::Completed(_)) => {}
    }

    // reduce2 writes `<input stem>FH.pdb` into one of several directories
    // depending on version and invocation; probe them in a fixed order.
    let found = candidate_outputs(input, clean_pdb)
        .into_iter()
        .find(|candidate| candidate.exists())
        .ok_or_else(|| "reduce2 reported success but produced no output file".to_string())?;

    move_file(&found, output_pdb).map_err(|e| format!("could not move reduce2 output: {e}"))
}

/// Candidate locations for the tool's output, probed in order: the current
/// working directory, the staged input's directory, the cleaned file's
/// directory.
fn candidate_outputs(input: &Path, clean_pdb: &Path) -> Vec<PathBuf> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}FH.pdb");

    let mut candidates = vec![PathBuf::from(&name)];
    if let Some(parent) = input.parent() {
        candidates.push(parent.join(&name));
    }
    if let Some(parent) = clean_pdb.parent() {
        candidates.push(parent.join(&name));
    }
    candidates
}

/// The staged input handed to the tool: either the cleaned file itself, or
/// a synthesized sibling copy carrying a `CRYST1` record.
enum StagedInput {
    Original(PathBuf),
    Synthesized(PathBuf),
}

impl StagedInput {
    fn path(&self) -> &Path {
        match self {
            StagedInput::Original(p) | StagedInput::Synthesized(p) => p,
        }
    }

    fn cleanup(self) {
        if let StagedInput::Synthesized(path) = self {
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "could not remove staged input");
            }
        }
    }
}

fn prepare_input(
    clean_pdb: &Path,
    original_cell: Option<&CrystalCell>,
) -> io::Result<StagedInput> {
    let content = fs::read_to_string(clean_pdb)?;
    if content.lines().any(|line| line.starts_with("CRYST1")) {
        return Ok(StagedInput::Original(clean_pdb.to_path_buf()));
    }

    let cell_record = original_cell
        .cloned()
        .unwrap_or_else(CrystalCell::placeholder)
        .to_record();

    let mut staged = clean_pdb.as_os_str().to_os_string();
    staged.push(".reduce_input.pdb");
    let staged = PathBuf::from(staged);
    fs::write(&staged, format!("{cell_record}\n{content}"))?;
    Ok(StagedInput::Synthesized(staged))
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        // Rename fails across filesystems; fall back to copy + remove.
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM_LINE: &str =
        "ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00 20.00           N\n";

    #[test]
    fn input_with_cryst1_is_used_directly() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("rec_clean.pdb");
        fs::write(
            &clean,
            format!("{}\n{ATOM_LINE}", CrystalCell::placeholder().to_record()),
        )
        .unwrap();

        match prepare_input(&clean, None).unwrap() {
            StagedInput::Original(path) => assert_eq!(path, clean),
            StagedInput::Synthesized(_) => panic!("should not synthesize"),
        }
    }

    #[test]
    fn missing_cryst1_gets_placeholder_header() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("rec_clean.pdb");
        fs::write(&clean, ATOM_LINE).unwrap();

        let staged = prepare_input(&clean, None).unwrap();
        let staged_path = staged.path().to_path_buf();
        assert_ne!(staged_path, clean);

        let content = fs::read_to_string(&staged_path).unwrap();
        assert!(content.starts_with("CRYST1    1.000"));
        assert!(content.contains("ATOM      1  N"));
        // The cleaned file is untouched.
        assert_eq!(fs::read_to_string(&clean).unwrap(), ATOM_LINE);

        staged.cleanup();
        assert!(!staged_path.exists());
    }

    #[test]
    fn missing_cryst1_prefers_original_cell() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("rec_clean.pdb");
        fs::write(&clean, ATOM_LINE).unwrap();

        let cell = CrystalCell {
            lengths: (51.5, 51.5, 113.8),
            angles: (90.0, 90.0, 90.0),
            space_group: "P 43 21 2".to_string(),
            z: 8,
        };
        let staged = prepare_input(&clean, Some(&cell)).unwrap();
        let content = fs::read_to_string(staged.path()).unwrap();
        assert!(content.starts_with("CRYST1   51.500   51.500  113.800"));
        staged.cleanup();
    }

    #[test]
    fn candidate_outputs_are_probed_in_fixed_order() {
        let input = PathBuf::from("/work/staging/rec_clean.pdb.reduce_input.pdb");
        let clean = PathBuf::from("/work/out/rec_clean.pdb");

        let candidates = candidate_outputs(&input, &clean);
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("rec_clean.pdb.reduce_inputFH.pdb"),
                PathBuf::from("/work/staging/rec_clean.pdb.reduce_inputFH.pdb"),
                PathBuf::from("/work/out/rec_clean.pdb.reduce_inputFH.pdb"),
            ]
        );
    }

    #[test]
    fn unavailable_tool_degrades_to_skip() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("rec_clean.pdb");
        fs::write(&clean, ATOM_LINE).unwrap();
        let output = dir.path().join("rec_protonated.pdb");

        // reduce2 is not installed in the test environment.
        match add_hydrogens(&clean, &output, None) {
            ProtonationOutcome::Skipped { .. } => {}
            ProtonationOutcome::Protonated(_) => {
                // If a real reduce2 is present the stage may legitimately
                // succeed; accept both outcomes but require the output file.
                assert!(output.exists());
            }
        }
    }
}
