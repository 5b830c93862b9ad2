use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::stitch::{decode_data_url, stitch_archive, StitchLimits};

#[derive(Args)]
pub struct StitchArgs {
    #[arg(help = "Zip archive of page images")]
    pub archive: PathBuf,

    #[arg(short, long, help = "Output JPEG path (defaults to the archive name with .jpg)")]
    pub output: Option<PathBuf>,
}

/// Run the upload pipeline offline, using the upload limits from the environment.
pub async fn handle(args: StitchArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.archive)
        .with_context(|| format!("failed to read {}", args.archive.display()))?;
    let limits = StitchLimits::from(&AppConfig::from_env().upload);

    let stitched = tokio::task::spawn_blocking(move || stitch_archive(&bytes, &limits))
        .await
        .context("stitching worker failed")??;

    let jpeg = decode_data_url(&stitched.data_url).context("stitched payload is not a JPEG data URL")?;
    let output = args.output.unwrap_or_else(|| default_output(&args.archive));
    std::fs::write(&output, &jpeg).with_context(|| format!("failed to write {}", output.display()))?;

    output_success(
        output_format,
        &format!(
            "Stitched {} images into {}x{} -> {}",
            stitched.images_processed,
            stitched.width,
            stitched.height,
            output.display()
        ),
        Some(json!({
            "images_processed": stitched.images_processed,
            "width": stitched.width,
            "height": stitched.height,
            "bytes": jpeg.len(),
            "output": output.display().to_string(),
        })),
    )
}

fn default_output(archive: &Path) -> PathBuf {
    archive.with_extension("jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_defaults_next_to_archive() {
        assert_eq!(default_output(Path::new("uploads/ch-05.zip")), PathBuf::from("uploads/ch-05.jpg"));
        assert_eq!(default_output(Path::new("chapter")), PathBuf::from("chapter.jpg"));
    }
}
