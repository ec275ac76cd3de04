use crate::cli::ReceptorArgs;
use crate::config::ReceptorFileConfig;
use crate::error::{CliError, Result};
use dockprep::pipeline::source::StructureSource;
use dockprep::workflows::receptor::{ReceptorInput, ReceptorRequest, prepare_receptor};
use tracing::info;

pub fn run(args: ReceptorArgs) -> Result<String> {
    let file_config = match &args.config {
        Some(path) => ReceptorFileConfig::load(path)?,
        None => ReceptorFileConfig::default(),
    };

    let input_path = match (&args.input, &args.pdb_id) {
        (Some(path), None) => path.clone(),
        (None, Some(id)) => {
            let source = StructureSource::new().with_cache_dir(&args.cache_dir);
            let downloaded = source.download(id)?;
            info!("{}", downloaded.message);
            downloaded.path
        }
        _ => {
            return Err(CliError::Argument(
                "provide exactly one of --input or --pdb-id".to_string(),
            ));
        }
    };

    // Command-line flags override the config file.
    let mut request = ReceptorRequest::new(args.output, ReceptorInput::Path(input_path));
    if let Some(selection) = args.selection.or(file_config.selection) {
        request = request.with_selection(selection);
    }
    if let Some(reference) = args.box_ref.or(file_config.box_reference) {
        request = request.with_box_reference(reference);
    }
    if let Some(center) = args.box_center.or(file_config.box_center) {
        request = request.with_box_center(center);
    }
    if let Some(size) = args.box_size.or(file_config.box_size) {
        request = request.with_box_size(size);
    }

    Ok(prepare_receptor(&request, None)?)
}
