//! Search-box geometry: center resolution, the config record, and the
//! corner-marker visualization.

use crate::core::models::structure::Structure;
use crate::core::selection::SelectionExpr;
use crate::pipeline::error::PrepError;
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use std::str::FromStr;

/// Default edge length of the search box, in Angstroms.
pub const DEFAULT_BOX_EDGE: f64 = 20.0;

/// An axis-aligned search box constraining the docking search space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSpec {
    pub center: Point3<f64>,
    pub size: Vector3<f64>,
}

/// The flat key-value form of a box, as written to the config record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxRecord {
    pub center_x: f64,
    pub center_y: f64,
    pub center_z: f64,
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
}

impl BoxSpec {
    pub fn new(center: Point3<f64>, size: Vector3<f64>) -> Self {
        Self { center, size }
    }

    pub fn record(&self) -> BoxRecord {
        BoxRecord {
            center_x: self.center.x,
            center_y: self.center.y,
            center_z: self.center.z,
            size_x: self.size.x,
            size_y: self.size.y,
            size_z: self.size.z,
        }
    }

    /// The textual config record: six `key = value` lines with 3-decimal
    /// fixed precision, in center-then-size order.
    pub fn config_text(&self) -> String {
        let r = self.record();
        format!(
            "center_x = {:.3}\ncenter_y = {:.3}\ncenter_z = {:.3}\n\
             size_x = {:.3}\nsize_y = {:.3}\nsize_z = {:.3}\n",
            r.center_x, r.center_y, r.center_z, r.size_x, r.size_y, r.size_z,
        )
    }

    /// The eight corner points, ordered by the binary enumeration of sign
    /// combinations with x outermost and z innermost: `(-,-,-)` first,
    /// `(+,+,+)` last.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let half = self.size / 2.0;
        let mut corners = [Point3::origin(); 8];
        let mut index = 0;
        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sz in [-1.0, 1.0] {
                    corners[index] = Point3::new(
                        self.center.x + sx * half.x,
                        self.center.y + sy * half.y,
                        self.center.z + sz * half.z,
                    );
                    index += 1;
                }
            }
        }
        corners
    }

    /// A minimal PDB fragment marking the corners, one HETATM per corner,
    /// for visual inspection of the box in a structure viewer.
    pub fn corner_pdb(&self) -> String {
        let mut out = String::new();
        for (i, corner) in self.corners().iter().enumerate() {
            out.push_str(&format!(
                "HETATM{:5}  C   BOX A   1    {:8.3}{:8.3}{:8.3}  1.00  0.00           C\n",
                i + 1,
                corner.x,
                corner.y,
                corner.z,
            ));
        }
        out
    }
}

/// Resolves the box center with strict source priority: an explicit center
/// wins over a reference selection, which wins over the receptor centroid.
/// Exactly one source is used, never a blend.
///
/// The reference selection is evaluated over the *original* structure so a
/// bound ligand excluded from the receptor selection can still anchor the
/// box.
///
/// # Errors
///
/// [`PrepError::InvalidBoxCenter`] if an explicit center does not have
/// exactly 3 components; [`PrepError::EmptyReferenceSelection`] if the
/// reference selection matches nothing; [`PrepError::Selection`] if it does
/// not parse.
pub fn resolve_center(
    explicit: Option<&[f64]>,
    reference: Option<&str>,
    original: &Structure,
    receptor: &Structure,
) -> Result<Point3<f64>, PrepError> {
    if let Some(values) = explicit {
        if values.len() != 3 {
            return Err(PrepError::InvalidBoxCenter(values.len()));
        }
        return Ok(Point3::new(values[0], values[1], values[2]));
    }

    if let Some(selection) = reference {
        let expr = SelectionExpr::from_str(selection)?;
        return original
            .select(&expr)
            .centroid()
            .ok_or_else(|| PrepError::EmptyReferenceSelection(selection.to_string()));
    }

    receptor
        .centroid()
        .ok_or_else(|| PrepError::EmptySelection("receptor".to_string()))
}

/// Resolves the box size, defaulting to 20x20x20.
///
/// # Errors
///
/// [`PrepError::InvalidBoxSize`] unless the size has exactly 3 strictly
/// positive components.
pub fn resolve_size(size: Option<&[f64]>) -> Result<Vector3<f64>, PrepError> {
    match size {
        None => Ok(Vector3::new(
            DEFAULT_BOX_EDGE,
            DEFAULT_BOX_EDGE,
            DEFAULT_BOX_EDGE,
        )),
        Some(values) if values.len() != 3 => Err(PrepError::InvalidBoxSize(format!(
            "expected exactly 3 components, got {}",
            values.len()
        ))),
        Some(values) if values.iter().any(|&v| v <= 0.0) => Err(PrepError::InvalidBoxSize(
            "all components must be positive".to_string(),
        )),
        Some(values) => Ok(Vector3::new(values[0], values[1], values[2])),
    }
}
