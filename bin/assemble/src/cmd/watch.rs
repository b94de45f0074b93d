//! Watch command - development server that recompiles on template changes

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use assemble_generator::{Assembly, AssemblyOptions, WriteStats};
use color_eyre::eyre::{Result, WrapErr, eyre};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher, event::ModifyKind};
use tokio::{
    net::TcpListener,
    sync::{RwLock, mpsc},
};

use super::{
    check::{print_warnings, quick_validate},
    load_manifest,
};
use crate::server::{SharedSite, create_router};

/// Quiet period that ends a burst of file events.
const DEBOUNCE_MS: u64 = 200;

/// Server settings for watch mode.
#[derive(Debug, Clone, Copy)]
pub struct ServeOptions {
    pub port: u16,
    pub open_browser: bool,
    pub http_log: bool,
}

/// Run the watch command.
///
/// Compiles and writes every target, serves the output directory and
/// recompiles whenever a file under the template directory changes.
pub async fn run(
    manifest_path: &Path,
    with_env: bool,
    options: AssemblyOptions,
    serve: ServeOptions,
) -> Result<()> {
    tracing::info!(?manifest_path, port = serve.port, "Starting watch mode");

    let manifest = load_manifest(manifest_path, with_env)?;
    let mut assembly =
        Assembly::from_manifest(&manifest, options).wrap_err("Failed to set up assembly")?;
    print_warnings(&quick_validate(&manifest, assembly.dirs().root()));

    // Initial build
    tracing::info!("Running initial build...");
    let stats = rebuild(&mut assembly).wrap_err("Initial build failed")?;
    print_build_stats(&stats);

    let routes = assembly.routes();
    let output_dir = assembly.dirs().output_path();
    let template_dir = assembly.dirs().template_path();
    let site: SharedSite = Arc::new(RwLock::new(assembly));

    // Setup file watcher
    let (tx, rx) = mpsc::channel::<PathBuf>(64);
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(event) if is_relevant(&event.kind) => {
                for path in event.paths {
                    tracing::debug!(path = %path.display(), "template changed");
                    // A full channel already has a rebuild pending.
                    let _ = tx.try_send(path);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "watch error"),
        },
        notify::Config::default(),
    )
    .wrap_err("Failed to watch for changes")?;

    watcher
        .watch(&template_dir, RecursiveMode::Recursive)
        .wrap_err_with(|| format!("Failed to watch {}", template_dir.display()))?;
    tracing::debug!(dir = %template_dir.display(), "Watching template directory");

    // Start rebuild task
    tokio::spawn(rebuild_loop(site.clone(), rx));

    // Start server
    let app = create_router(&routes, &output_dir, site, serve.http_log);
    let addr = format!("127.0.0.1:{}", serve.port);

    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  HTTP Server running on http://{addr}");
    println!("  Press Ctrl+C to stop");
    println!();

    if serve.open_browser {
        let _ = open::that(format!("http://{addr}"));
    }

    // Keep watcher alive
    let _watcher = watcher;

    axum::serve(listener, app).await.wrap_err("Server error")?;

    Ok(())
}

/// Consume change events, rebuilding once per burst.
///
/// This task is the only writer of the shared assembly.
async fn rebuild_loop(site: SharedSite, mut rx: mpsc::Receiver<PathBuf>) {
    let window = Duration::from_millis(DEBOUNCE_MS);

    while let Some(changed) = next_batch(&mut rx, window).await {
        println!();
        println!("  {changed} template change(s) detected, recompiling...");

        let site = site.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut assembly = site.blocking_write();
            rebuild(&mut assembly)
        })
        .await
        .map_err(|e| eyre!("rebuild task failed: {e}"))
        .and_then(|r| r);

        match result {
            Ok(stats) => {
                println!(
                    "  ✓ Recompiled {} target(s) in {}ms",
                    stats.targets, stats.duration_ms
                );
            }
            Err(e) => {
                tracing::error!("Rebuild failed: {e:#}");
                eprintln!("  ✗ Rebuild failed: {e:#}");
            }
        }
    }
}

/// Wait for the next burst of events and return how many it contained.
///
/// A burst ends once no event arrives within `window`. Returns `None` when
/// the channel is closed and drained.
async fn next_batch(rx: &mut mpsc::Receiver<PathBuf>, window: Duration) -> Option<usize> {
    rx.recv().await?;
    let mut count = 1;

    loop {
        match tokio::time::timeout(window, rx.recv()).await {
            Ok(Some(_)) => count += 1,
            Ok(None) | Err(_) => return Some(count),
        }
    }
}

/// Recompile every target and rewrite the output directory.
fn rebuild(assembly: &mut Assembly) -> Result<WriteStats> {
    assembly.compile().wrap_err("Failed to compile targets")?;
    let stats = assembly
        .write_targets()
        .wrap_err("Failed to write targets")?;
    tracing::debug!(?stats, "Build completed");
    Ok(stats)
}

/// Whether a file event should trigger a rebuild.
fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
            | EventKind::Create(_)
            | EventKind::Remove(_)
    )
}

/// Print build statistics in a user-friendly format.
fn print_build_stats(stats: &WriteStats) {
    println!();
    println!("  Build Statistics:");
    println!("  ─────────────────────────────────");
    println!("  Targets:      {:>6}", stats.targets);
    println!("  Assets:       {:>6}", stats.assets);
    println!("  ─────────────────────────────────");
    println!("  Duration:     {:>6}ms", stats.duration_ms);
    println!();
}
