use crate::core::io::traits::StructureFile;
use crate::core::models::atom::{Atom, element_from_name};
use crate::core::models::structure::{CrystalCell, Structure};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

pub struct PdbFile;

impl StructureFile for PdbFile {
    type ReadError = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::ReadError> {
        let mut atoms: Vec<Atom> = Vec::new();
        let mut cell: Option<CrystalCell> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let record_type = slice_and_trim(&line, 0, 6);

            match record_type {
                "ATOM" | "HETATM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let serial_str = slice_and_trim(&line, 6, 11);
                    let serial: usize = serial_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "7-11".into(),
                            value: serial_str.into(),
                        },
                    })?;

                    let name = slice_and_trim(&line, 12, 16).to_string();
                    let residue_name = slice_and_trim(&line, 17, 20).to_string();
                    let chain_id = line.chars().nth(21).filter(|c| !c.is_whitespace());
                    let res_num_str = slice_and_trim(&line, 22, 26);
                    let residue_number: isize =
                        res_num_str.parse().map_err(|_| PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::InvalidInt {
                                columns: "23-26".into(),
                                value: res_num_str.into(),
                            },
                        })?;
                    let insertion_code = line.chars().nth(26).filter(|c| !c.is_whitespace());

                    let x = parse_float(&line, line_num, 30, 38)?;
                    let y = parse_float(&line, line_num, 38, 46)?;
                    let z = parse_float(&line, line_num, 46, 54)?;

                    // Occupancy, B-factor, and element are optional trailing
                    // columns in files produced by lightweight writers.
                    let occupancy = slice_and_trim(&line, 54, 60).parse().unwrap_or(1.0);
                    let b_factor = slice_and_trim(&line, 60, 66).parse().unwrap_or(0.0);
                    let element_str = slice_and_trim(&line, 76, 78);
                    let element = if element_str.is_empty() {
                        element_from_name(&name)
                    } else {
                        element_str.to_ascii_uppercase()
                    };

                    atoms.push(Atom {
                        serial,
                        name,
                        residue_name,
                        chain_id: chain_id.unwrap_or('A'),
                        residue_number,
                        insertion_code,
                        position: Point3::new(x, y, z),
                        occupancy,
                        b_factor,
                        element,
                        hetero: record_type == "HETATM",
                    });
                }
                "CRYST1" => {
                    let a = parse_float(&line, line_num, 6, 15)?;
                    let b = parse_float(&line, line_num, 15, 24)?;
                    let c = parse_float(&line, line_num, 24, 33)?;
                    let alpha = parse_float(&line, line_num, 33, 40)?;
                    let beta = parse_float(&line, line_num, 40, 47)?;
                    let gamma = parse_float(&line, line_num, 47, 54)?;
                    let space_group = slice_and_trim(&line, 55, 66).to_string();
                    let z = slice_and_trim(&line, 66, 70).parse().unwrap_or(1);
                    cell = Some(CrystalCell {
                        lengths: (a, b, c),
                        angles: (alpha, beta, gamma),
                        space_group,
                        z,
                    });
                }
                "END" => break,
                // Headers, remarks, TER, MODEL and the rest carry nothing
                // the pipeline consumes.
                _ => {}
            }
        }

        if atoms.is_empty() {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok(Structure::new(atoms, cell))
    }

    fn write_to(structure: &Structure, writer: &mut impl Write) -> io::Result<()> {
        if let Some(cell) = structure.cell() {
            writeln!(writer, "{}", cell.to_record())?;
        }
        for atom in structure.atoms() {
            let record = if atom.hetero { "HETATM" } else { "ATOM" };
            writeln!(
                writer,
                "{:<6}{:5} {} {:>3} {}{:4}{}   {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}          {:>2}",
                record,
                atom.serial % 100_000,
                format_atom_name(&atom.name),
                atom.residue_name,
                atom.chain_id,
                atom.residue_number % 10_000,
                atom.insertion_code.unwrap_or(' '),
                atom.position.x,
                atom.position.y,
                atom.position.z,
                atom.occupancy,
                atom.b_factor,
                atom.element,
            )?;
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}

/// Places an atom name in its 4-column field: names of one to three
/// characters start in the second column, four-character names fill the
/// field.
fn format_atom_name(name: &str) -> String {
    if name.len() >= 4 {
        name[..4].to_string()
    } else {
        format!(" {:<3}", name)
    }
}
