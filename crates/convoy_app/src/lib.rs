//! Convoy CLI: drives the upload queue against a conversion service.
pub mod cli;
pub mod driver;

use anyhow::Context;
use convoy_core::Tool;
use convoy_engine::{ensure_output_dir, EngineConfig, UploadSettings};
use convoy_logging::convoy_info;

use crate::cli::Cli;
use crate::driver::Driver;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let api_base = url::Url::parse(&cli.api_base).context("invalid --api-base")?;
    let config = EngineConfig {
        upload: UploadSettings {
            api_base,
            ..UploadSettings::default()
        },
        ..EngineConfig::default()
    };
    let mut driver = Driver::new(cli.command.tool(), config);

    if cli.command.tool() == Tool::QrGenerate {
        return run_qr(&mut driver, &cli);
    }

    driver.add_files(cli.command.files())?;
    let view = driver.run_batch(cli.command.options());
    driver.download_completed(&cli.output_dir)?;

    let failed = view
        .rows
        .iter()
        .filter(|row| row.error.is_some())
        .count();
    let completed = view.rows.len() - failed;
    convoy_info!("{completed} completed, {failed} failed");
    if failed > 0 {
        anyhow::bail!("{failed} file(s) failed");
    }
    Ok(())
}

fn run_qr(driver: &mut Driver, cli: &Cli) -> anyhow::Result<()> {
    let view = driver.run_preview(cli.command.options());
    let artifact = match driver.preview_artifact() {
        Some(artifact) => artifact,
        None => {
            let reason = view
                .preview
                .and_then(|preview| preview.error)
                .unwrap_or_else(|| "invalid input".to_string());
            anyhow::bail!("QR generation failed: {reason}");
        }
    };

    ensure_output_dir(&cli.output_dir)?;
    let extension = match artifact.media_type.as_str() {
        "image/svg+xml" => "svg",
        "image/jpeg" => "jpg",
        _ => "png",
    };
    let target = cli.output_dir.join(format!("qr.{extension}"));
    std::fs::write(&target, &artifact.bytes)
        .with_context(|| format!("writing {}", target.display()))?;
    convoy_info!("saved {}", target.display());
    Ok(())
}
