//! Receptor preparation: from a structure file (or raw text) to a docking
//! input plus search-box geometry.

use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::StructureFile;
use crate::core::selection::SelectionExpr;
use crate::pipeline::convert::{self, ConversionOutcome};
use crate::pipeline::error::PrepError;
use crate::pipeline::gridbox::{self, BoxSpec};
use crate::pipeline::protonate::{self, ProtonationOutcome};
use crate::workflows::publish::{ArtifactSink, mime};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, instrument};

/// The receptor selection applied when the caller does not supply one:
/// the first chain, without solvent or heterogens.
pub const DEFAULT_SELECTION: &str = "chain A and not water and not hetero";

/// Where the receptor structure comes from.
#[derive(Debug, Clone)]
pub enum ReceptorInput {
    /// A structure file on disk.
    Path(PathBuf),
    /// Raw structure text, spooled through a transient file for parsing.
    RawContent(String),
}

/// Parameters for one receptor preparation run.
#[derive(Debug, Clone)]
pub struct ReceptorRequest {
    /// Base name for all output artifacts (may carry a directory prefix).
    pub output_name: String,
    /// The input structure.
    pub input: ReceptorInput,
    /// Selection predicate extracting the receptor.
    pub selection: String,
    /// Selection predicate whose centroid anchors the box, evaluated over
    /// the original (unselected) structure.
    pub box_reference: Option<String>,
    /// Explicit box center; overrides `box_reference`.
    pub box_center: Option<Vec<f64>>,
    /// Box dimensions in Angstroms; defaults to 20x20x20.
    pub box_size: Option<Vec<f64>>,
}

impl ReceptorRequest {
    pub fn new(output_name: impl Into<String>, input: ReceptorInput) -> Self {
        Self {
            output_name: output_name.into(),
            input,
            selection: DEFAULT_SELECTION.to_string(),
            box_reference: None,
            box_center: None,
            box_size: None,
        }
    }

    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.selection = selection.into();
        self
    }

    pub fn with_box_reference(mut self, reference: impl Into<String>) -> Self {
        self.box_reference = Some(reference.into());
        self
    }

    pub fn with_box_center(mut self, center: Vec<f64>) -> Self {
        self.box_center = Some(center);
        self
    }

    pub fn with_box_size(mut self, size: Vec<f64>) -> Self {
        self.box_size = Some(size);
        self
    }
}

/// Prepares a receptor for docking.
///
/// Sequence: parse and select the receptor, resolve the search box, write
/// the cleaned structure, attempt protonation and docking-format conversion
/// (both degrade gracefully when their external tools are unavailable),
/// write the box config and visualization, publish artifacts, and return a
/// multi-line status report.
///
/// # Errors
///
/// Parse and selection failures are fatal, as are invalid box parameters;
/// protonation and conversion failures are not (they are reflected in the
/// report instead). Unexpected I/O failures surface as
/// [`PrepError::Preparation`].
#[instrument(skip_all, name = "receptor_workflow")]
pub fn prepare_receptor(
    request: &ReceptorRequest,
    mut sink: Option<&mut dyn ArtifactSink>,
) -> Result<String, PrepError> {
    // === Phase 1: Resolve input ===
    // The temp file guard (for raw content) lives until the end of the
    // function, so the transient file is deleted on every exit path.
    let (parse_path, _temp_guard) = resolve_input(&request.input)?;

    // === Phase 2: Parse and select ===
    let structure = PdbFile::read_from_path(&parse_path)?;
    info!(atoms = structure.len(), "structure parsed");

    let expr = SelectionExpr::from_str(&request.selection)?;
    let receptor = structure.select(&expr);
    if receptor.is_empty() {
        return Err(PrepError::EmptySelection(request.selection.clone()));
    }
    info!(atoms = receptor.len(), selection = %request.selection, "receptor selected");

    // === Phase 3: Resolve the search box ===
    let center = gridbox::resolve_center(
        request.box_center.as_deref(),
        request.box_reference.as_deref(),
        &structure,
        &receptor,
    )?;
    let size = gridbox::resolve_size(request.box_size.as_deref())?;
    let bx = BoxSpec::new(center, size);

    // === Phase 4: Write the cleaned receptor ===
    let clean_pdb = PathBuf::from(format!("{}_clean.pdb", request.output_name));
    PdbFile::write_to_path(&receptor, &clean_pdb)?;

    // === Phase 5: Protonation (degradable) ===
    let protonated_pdb = PathBuf::from(format!("{}_protonated.pdb", request.output_name));
    let protonation = protonate::add_hydrogens(&clean_pdb, &protonated_pdb, structure.cell());
    let docking_input = match &protonation {
        ProtonationOutcome::Protonated(path) => path.as_path(),
        ProtonationOutcome::Skipped { .. } => clean_pdb.as_path(),
    };

    // === Phase 6: Docking-format conversion (degradable) ===
    let (pdbqt, conversion) = convert::convert_receptor(docking_input, &request.output_name, &bx)?;

    // === Phase 7: Box artifacts ===
    let config_file = PathBuf::from(format!("{}_config.txt", request.output_name));
    fs::write(&config_file, bx.config_text())?;
    let box_file = PathBuf::from(format!("{}.box.pdb", request.output_name));
    fs::write(&box_file, bx.corner_pdb())?;

    // === Phase 8: Report and publish ===
    let report = build_report(
        &clean_pdb,
        &protonation,
        &pdbqt,
        &conversion,
        &config_file,
        &box_file,
        &bx,
    )?;

    if let Some(sink) = sink.take() {
        publish_artifact(sink, &pdbqt, mime::TEXT_PLAIN)?;
        publish_artifact(sink, &config_file, mime::TEXT_PLAIN)?;
        publish_artifact(sink, &box_file, mime::CHEMICAL_PDB)?;
    }

    info!("receptor preparation complete");
    Ok(report)
}

fn resolve_input(
    input: &ReceptorInput,
) -> Result<(PathBuf, Option<tempfile::NamedTempFile>), PrepError> {
    match input {
        ReceptorInput::Path(path) => Ok((path.clone(), None)),
        ReceptorInput::RawContent(content) => {
            let mut temp = tempfile::Builder::new()
                .prefix("dockprep_receptor_")
                .suffix(".pdb")
                .tempfile()?;
            temp.write_all(content.as_bytes())?;
            temp.flush()?;
            Ok((temp.path().to_path_buf(), Some(temp)))
        }
    }
}

fn build_report(
    clean_pdb: &Path,
    protonation: &ProtonationOutcome,
    pdbqt: &Path,
    conversion: &ConversionOutcome,
    config_file: &Path,
    box_file: &Path,
    bx: &BoxSpec,
) -> Result<String, PrepError> {
    let mut lines = vec![
        "Receptor prepared.".to_string(),
        format!("Clean PDB: {}", std::path::absolute(clean_pdb)?.display()),
    ];
    match protonation {
        ProtonationOutcome::Protonated(path) => lines.push(format!(
            "Protonated PDB: {} (hydrogens added with reduce2)",
            std::path::absolute(path)?.display()
        )),
        ProtonationOutcome::Skipped { reason } => {
            lines.push(format!("Protonation: skipped ({reason})"));
        }
    }
    lines.push(format!("PDBQT: {}", std::path::absolute(pdbqt)?.display()));
    match conversion {
        ConversionOutcome::Converted => {
            lines.push("Partial charges: assigned by mk_prepare_receptor".to_string());
        }
        ConversionOutcome::Fallback { reason } => lines.push(format!(
            "Partial charges: not assigned ({reason}); PDBQT is a direct copy"
        )),
    }
    lines.push(format!(
        "Box Config: {}",
        std::path::absolute(config_file)?.display()
    ));
    lines.push(format!(
        "Box Visualization: {}",
        std::path::absolute(box_file)?.display()
    ));
    lines.push(format!(
        "Box Center: [{:.3}, {:.3}, {:.3}]",
        bx.center.x, bx.center.y, bx.center.z
    ));
    lines.push(format!(
        "Box Size: [{:.3}, {:.3}, {:.3}]",
        bx.size.x, bx.size.y, bx.size.z
    ));
    Ok(lines.join("\n"))
}

fn publish_artifact(
    sink: &mut dyn ArtifactSink,
    path: &Path,
    mime: &str,
) -> Result<(), PrepError> {
    let content = fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    sink.publish(&name, &content, mime);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::publish::testing::RecordingSink;

    const RAW_PDB: &str = "\
CRYST1   51.500   51.500  113.800  90.00  90.00  90.00 P 43 21 2     8
ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00 20.00           N
ATOM      2  CA  ALA A   1      11.639   6.071  -5.147  1.00 20.00           C
ATOM      3  C   ALA A   1      12.759   7.085  -4.932  1.00 20.00           C
HETATM    4  O   HOH A 101       5.000   5.000   5.000  1.00 30.00           O
HETATM    5  C1  STI A 201      30.000  31.000  32.000  1.00 30.00           C
END
";

    fn request_in(dir: &Path, name: &str) -> ReceptorRequest {
        ReceptorRequest::new(
            dir.join(name).to_string_lossy().into_owned(),
            ReceptorInput::RawContent(RAW_PDB.to_string()),
        )
    }

    #[test]
    fn degraded_run_still_produces_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path(), "rec").with_box_center(vec![1.0, 2.0, 3.0]);

        // Neither reduce2 nor mk_prepare_receptor is installed in the test
        // environment, so both optional stages degrade.
        let report = prepare_receptor(&request, None).unwrap();

        assert!(report.contains("Receptor prepared."));
        assert!(report.to_lowercase().contains("skipped") || report.contains("hydrogens added"));

        let clean = dir.path().join("rec_clean.pdb");
        let pdbqt = dir.path().join("rec.pdbqt");
        assert!(clean.exists());
        assert!(pdbqt.exists());
        assert!(dir.path().join("rec_config.txt").exists());
        assert!(dir.path().join("rec.box.pdb").exists());
    }

    #[test]
    fn fallback_pdbqt_is_copy_of_clean_structure() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path(), "rec").with_box_center(vec![0.0, 0.0, 0.0]);

        let report = prepare_receptor(&request, None).unwrap();

        if report.contains("direct copy") {
            let clean = fs::read(dir.path().join("rec_clean.pdb")).unwrap();
            let pdbqt = fs::read(dir.path().join("rec.pdbqt")).unwrap();
            assert_eq!(clean, pdbqt);
            assert!(report.contains("Partial charges: not assigned"));
        }
    }

    #[test]
    fn explicit_center_wins_over_reference() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path(), "rec")
            .with_box_center(vec![1.0, 2.0, 3.0])
            .with_box_reference("resname STI");

        prepare_receptor(&request, None).unwrap();

        let config = fs::read_to_string(dir.path().join("rec_config.txt")).unwrap();
        assert!(config.starts_with(
            "center_x = 1.000\ncenter_y = 2.000\ncenter_z = 3.000\n"
        ));
    }

    #[test]
    fn reference_selection_centers_box_on_ligand() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path(), "rec").with_box_reference("resname STI");

        prepare_receptor(&request, None).unwrap();

        let config = fs::read_to_string(dir.path().join("rec_config.txt")).unwrap();
        assert!(config.starts_with(
            "center_x = 30.000\ncenter_y = 31.000\ncenter_z = 32.000\n"
        ));
    }

    #[test]
    fn clean_structure_excludes_water_and_heterogens() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path(), "rec");

        prepare_receptor(&request, None).unwrap();

        let clean = fs::read_to_string(dir.path().join("rec_clean.pdb")).unwrap();
        assert!(clean.contains(" ALA "));
        assert!(!clean.contains("HOH"));
        assert!(!clean.contains("STI"));
    }

    #[test]
    fn empty_selection_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path(), "rec").with_selection("chain Z");

        assert!(matches!(
            prepare_receptor(&request, None),
            Err(PrepError::EmptySelection(sel)) if sel == "chain Z"
        ));
    }

    #[test]
    fn unparsable_content_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let request = ReceptorRequest::new(
            dir.path().join("rec").to_string_lossy().into_owned(),
            ReceptorInput::RawContent("not a structure\n".to_string()),
        );

        assert!(matches!(
            prepare_receptor(&request, None),
            Err(PrepError::Parse { .. })
        ));
    }

    #[test]
    fn wrong_arity_box_center_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path(), "rec").with_box_center(vec![1.0, 2.0]);

        assert!(matches!(
            prepare_receptor(&request, None),
            Err(PrepError::InvalidBoxCenter(2))
        ));
    }

    #[test]
    fn artifacts_are_published_to_the_sink() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path(), "rec").with_box_center(vec![0.0, 0.0, 0.0]);

        let mut sink = RecordingSink::default();
        prepare_receptor(&request, Some(&mut sink)).unwrap();

        assert_eq!(sink.published.len(), 3);
        assert_eq!(sink.published[0].0, "rec.pdbqt");
        assert_eq!(sink.published[1].0, "rec_config.txt");
        assert_eq!(sink.published[2].0, "rec.box.pdb");
        assert_eq!(sink.published[2].2, mime::CHEMICAL_PDB);
        assert!(sink.published.iter().all(|(_, size, _)| *size > 0));
    }

    #[test]
    fn box_corners_surround_the_explicit_center() {
        let dir = tempfile::tempdir().unwrap();
        let request = request_in(dir.path(), "rec")
            .with_box_center(vec![0.0, 0.0, 0.0])
            .with_box_size(vec![2.0, 2.0, 2.0]);

        prepare_receptor(&request, None).unwrap();

        let box_pdb = fs::read_to_string(dir.path().join("rec.box.pdb")).unwrap();
        assert_eq!(box_pdb.lines().count(), 8);
        assert!(box_pdb.contains("  -1.000  -1.000  -1.000"));
        assert!(box_pdb.contains("   1.000   1.000   1.000"));
    }
}
