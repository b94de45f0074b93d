//! Manifest checks run before compiling.

use std::path::Path;

use assemble_core::Manifest;

/// Collect non-fatal problems with a manifest.
///
/// Reports template fragments missing under `root` and public paths claimed
/// by more than one target. Neither stops a build: missing fragments fail
/// their targets at compile time, and colliding routes keep the last target.
pub fn quick_validate(manifest: &Manifest, root: &Path) -> Vec<String> {
    let mut warnings = Vec::new();

    for path in manifest.missing_templates(root) {
        warnings.push(format!("Template not found: {}", path.display()));
    }

    for (path, names) in manifest.route_collisions() {
        let winner = names.last().map_or("", String::as_str);
        warnings.push(format!(
            "Route {path} is claimed by {}; serving {winner}",
            names.join(", ")
        ));
    }

    warnings
}

/// Print warnings in the CLI's house style.
pub fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }

    println!();
    println!("  Warnings:");
    for warn in warnings {
        println!("  ⚠ {warn}");
    }
    println!();
}
