use crate::cli::FetchArgs;
use crate::error::Result;
use dockprep::pipeline::source::StructureSource;
use tracing::info;

pub fn run(args: FetchArgs) -> Result<String> {
    info!(id = %args.id, "fetching structure");
    let source = StructureSource::new().with_cache_dir(&args.cache_dir);
    let downloaded = source.download(&args.id)?;
    Ok(format!(
        "{}\n{} bytes at {}",
        downloaded.message,
        downloaded.size,
        downloaded.path.display()
    ))
}
