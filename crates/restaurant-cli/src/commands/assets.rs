use std::io::{self, Write};
use std::path::Path;

use restaurant_core::AssetManifest;

use crate::commands::common::{source_label, write_output, Session};
use crate::error::CliError;

pub fn load_manifest(path: Option<&Path>) -> Result<AssetManifest, CliError> {
    match path {
        Some(path) => Ok(AssetManifest::from_json(&std::fs::read_to_string(path)?)?),
        None => Ok(AssetManifest::default()),
    }
}

pub async fn run_assets_install(
    session: &Session,
    manifest_path: Option<&Path>,
) -> Result<(), CliError> {
    let mut worker = session.worker(load_manifest(manifest_path)?);

    let installed = worker.install().await?;
    let activated = worker.activate().await?;

    println!(
        "Cached {} of {} assets in {}",
        installed.cached.len(),
        installed.cached.len() + installed.skipped.len(),
        installed.bucket
    );
    for url in &installed.skipped {
        println!("  skipped {url}");
    }
    for bucket in &activated.deleted {
        println!("Removed old cache {bucket}");
    }
    Ok(())
}

pub async fn run_assets_fetch(
    session: &Session,
    url: &str,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let served = session.worker(AssetManifest::default()).fetch(url).await?;
    tracing::info!(
        "{} answered with HTTP {} from {}",
        url,
        served.response.status,
        source_label(served.source)
    );

    if let Some(path) = output_path {
        write_output(path, &served.response.body)?;
        println!("{}", path.display());
    } else {
        io::stdout().write_all(&served.response.body)?;
    }
    Ok(())
}

pub async fn run_assets_buckets(session: &Session) -> Result<(), CliError> {
    let summaries = session.store.bucket_summaries().await?;
    if summaries.is_empty() {
        println!("No asset caches.");
        return Ok(());
    }

    for (bucket, entries) in summaries {
        println!("{bucket:<32}  {entries} entries");
    }
    Ok(())
}
