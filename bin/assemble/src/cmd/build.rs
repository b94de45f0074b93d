//! Compile command - compiles every target and writes the output directory

use std::{path::Path, time::Instant};

use assemble_generator::{Assembly, AssemblyOptions, WriteStats};
use color_eyre::eyre::{Result, WrapErr};

use super::{
    check::{print_warnings, quick_validate},
    load_manifest,
};

/// Run the compile command.
///
/// Compiles every target listed in the manifest, writes each one to the
/// output directory and mirrors the assets directory into `static/`.
pub fn run(manifest_path: &Path, with_env: bool, options: AssemblyOptions) -> Result<WriteStats> {
    let start = Instant::now();
    tracing::info!(?manifest_path, ?options, "Starting compile");

    let manifest = load_manifest(manifest_path, with_env)?;

    let mut assembly = Assembly::from_manifest(&manifest, options)
        .wrap_err("Failed to set up assembly")?;
    print_warnings(&quick_validate(&manifest, assembly.dirs().root()));

    if options.debug {
        for line in assembly.describe() {
            tracing::debug!("{line}");
        }
    }

    assembly.compile().wrap_err("Failed to compile targets")?;
    let stats = assembly
        .write_targets()
        .wrap_err("Failed to write targets")?;

    let duration = start.elapsed();

    println!();
    println!("  Compile completed successfully!");
    println!();
    println!("  Targets:    {}", stats.targets);
    println!("  Assets:     {}", stats.assets);
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", assembly.dirs().output_path().display());
    println!();

    tracing::info!(?stats, ?duration, "Compile completed successfully");

    Ok(stats)
}
