use crate::cli::LigandArgs;
use crate::error::Result;
use dockprep::workflows::ligand::{LigandRequest, prepare_ligand};

pub fn run(args: LigandArgs) -> Result<String> {
    let request = LigandRequest::new(args.smiles)
        .with_output_name(args.output)
        .with_ph(args.ph)
        .with_skip_tautomers(!args.with_tautomers)
        .with_skip_acidbase(args.skip_acidbase);

    Ok(prepare_ligand(&request, None)?)
}
