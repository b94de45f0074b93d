//! Assemble CLI
//!
//! Compiles the targets named in a manifest into a static site, or serves them
//! while recompiling on template changes.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use assemble::{AssemblyOptions, FailurePolicy, cmd};
use assemble_core::DEFAULT_MANIFEST;
use clap::{CommandFactory, Parser};
use color_eyre::eyre::{Result, bail};

/// Command-line interface for Assemble.
#[derive(Parser, Debug)]
#[command(
    name = "assemble",
    version,
    about = "Assemble is the main command used to build your Assemble site."
)]
struct Cli {
    /// Compile pages and write to outputDir
    #[arg(short = 'c', long)]
    compile: bool,

    /// Watch templateDir for changes and recompile
    #[arg(short = 'w', long)]
    watch: bool,

    /// Path to the manifest file
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Apply ASSEMBLE__* environment overrides to the manifest
    #[arg(long)]
    env: bool,

    /// Enable verbose mode
    #[arg(long)]
    verbose: bool,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Enable HTTP request logging
    #[arg(long)]
    httplog: bool,

    /// Port for the built-in HTTP server
    #[arg(long, default_value_t = 9000)]
    port: u16,

    /// Open the site in a browser once the server is up
    #[arg(long)]
    open: bool,

    /// Stop compiling at the first broken target
    #[arg(long)]
    fail_fast: bool,
}

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Help,
    Compile,
    Watch,
}

impl Cli {
    fn mode(&self) -> Result<Mode> {
        match (self.compile, self.watch) {
            (false, false) => Ok(Mode::Help),
            (true, false) => Ok(Mode::Compile),
            (false, true) => Ok(Mode::Watch),
            (true, true) => {
                bail!("Choose either -c (compile pages) or -w (watch and recompile) only")
            }
        }
    }

    fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            verbose: self.verbose,
            debug: self.debug,
            failure_policy: if self.fail_fast {
                FailurePolicy::Abort
            } else {
                FailurePolicy::Collect
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let mode = cli.mode()?;
    if mode == Mode::Help {
        Cli::command().print_help()?;
        return Ok(());
    }

    assemble::init_tracing(cli.verbose, cli.debug, cli.httplog);
    let options = cli.assembly_options();

    match mode {
        Mode::Compile => {
            cmd::build::run(&cli.manifest, cli.env, options)?;
        }
        Mode::Watch => {
            let serve = cmd::watch::ServeOptions {
                port: cli.port,
                open_browser: cli.open,
                http_log: cli.httplog,
            };
            cmd::watch::run(&cli.manifest, cli.env, options, serve).await?;
        }
        Mode::Help => {}
    }

    Ok(())
}
