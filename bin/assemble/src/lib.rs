//! Assemble CLI Library
//!
//! Command implementations and the development server behind the `assemble`
//! binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (compile, watch, manifest checks)
//! - [`server`] - HTTP server for compiled targets and static assets
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use assemble::cmd;
//! use assemble_generator::AssemblyOptions;
//!
//! // Compile every target listed in assemble.json
//! cmd::build::run(Path::new("assemble.json"), false, AssemblyOptions::default()).unwrap();
//! ```

pub mod cmd;
pub mod server;

pub use assemble_core::Manifest;
pub use assemble_generator::{Assembly, AssemblyOptions, FailurePolicy, WriteStats};

/// Initialize tracing.
///
/// The level is WARN by default, INFO with `verbose` and DEBUG with `debug`.
/// `http_log` additionally enables request logs from the HTTP layer.
/// `RUST_LOG` directives are applied on top.
pub fn init_tracing(verbose: bool, debug: bool, http_log: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if debug {
        tracing::Level::DEBUG
    } else if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    let mut filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());
    if http_log
        && let Ok(directive) = "tower_http=info".parse::<tracing_subscriber::filter::Directive>()
    {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}
