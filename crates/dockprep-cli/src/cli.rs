use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Docking Prep Contributors",
    version,
    about = "dockprep - Prepare small-molecule ligands and protein receptors as inputs for molecular-docking engines.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a structure from the public repository into the local cache.
    Fetch(FetchArgs),
    /// Prepare a receptor PDBQT file and docking search box from a structure.
    Receptor(ReceptorArgs),
    /// Prepare a ligand PDBQT file from a SMILES string.
    Ligand(LigandArgs),
}

/// Arguments for the `fetch` subcommand.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// The 4-character structure identifier (e.g., '1iep').
    #[arg(required = true, value_name = "ID")]
    pub id: String,

    /// Directory for the structure cache.
    #[arg(long, value_name = "DIR", default_value = "./pdb")]
    pub cache_dir: PathBuf,
}

/// Arguments for the `receptor` subcommand.
#[derive(Args, Debug)]
pub struct ReceptorArgs {
    /// Base name for the output files (e.g., '1iep_receptor').
    #[arg(short, long, required = true, value_name = "NAME")]
    pub output: String,

    /// Path to the input structure file. Use this or --pdb-id.
    #[arg(short, long, value_name = "PATH", conflicts_with = "pdb_id")]
    pub input: Option<PathBuf>,

    /// Fetch the input structure by identifier (cache-first) instead of
    /// reading a local file.
    #[arg(long, value_name = "ID")]
    pub pdb_id: Option<String>,

    /// Selection expression for the receptor atoms.
    #[arg(short, long, value_name = "EXPR")]
    pub selection: Option<String>,

    /// Selection expression whose centroid anchors the box (e.g., 'resname STI').
    #[arg(long, value_name = "EXPR")]
    pub box_ref: Option<String>,

    /// Explicit box center as x,y,z. Overrides --box-ref.
    #[arg(long, value_name = "X,Y,Z", value_delimiter = ',', num_args = 1..)]
    pub box_center: Option<Vec<f64>>,

    /// Box dimensions in Angstroms as x,y,z.
    #[arg(long, value_name = "X,Y,Z", value_delimiter = ',', num_args = 1..)]
    pub box_size: Option<Vec<f64>>,

    /// Path to a TOML configuration file; command-line flags override it.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for the structure cache used with --pdb-id.
    #[arg(long, value_name = "DIR", default_value = "./pdb")]
    pub cache_dir: PathBuf,
}

/// Arguments for the `ligand` subcommand.
#[derive(Args, Debug)]
pub struct LigandArgs {
    /// The SMILES string of the ligand molecule.
    #[arg(required = true, value_name = "SMILES")]
    pub smiles: String,

    /// Base name for the output file.
    #[arg(short, long, value_name = "NAME", default_value = "ligand")]
    pub output: String,

    /// The pH value for protonation.
    #[arg(long, value_name = "FLOAT", default_value_t = 6.0)]
    pub ph: f64,

    /// Enumerate tautomers instead of skipping them.
    #[arg(long)]
    pub with_tautomers: bool,

    /// Skip acid-base (protonation state) enumeration.
    #[arg(long)]
    pub skip_acidbase: bool,
}
