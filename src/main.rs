//! ve-gen - vector-engine dispatch generator
//!
//! Main CLI entry point for validating catalogs and generating dispatch
//! routines and handler stubs.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, warn, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};
use vedispatch::catalog::Catalog;
use vedispatch::config::CatalogFile;
use vedispatch::emit::emit_dispatch;
use vedispatch::generator::Generator;
use vedispatch::render::{Emit, KeyStyle, RenderOptions, Target};

#[derive(Parser)]
#[command(name = "ve-gen")]
#[command(version)]
#[command(about = "Generate vector-engine instruction dispatch from a type/opcode catalog", long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the built-in catalog as TOML
    Catalog {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a catalog and print a summary
    Check {
        #[command(flatten)]
        source: CatalogArgs,
    },

    /// Generate the dispatch routine
    Dispatch(GenArgs),

    /// List every dispatch key with its opcode, type and handler
    Keys {
        #[command(flatten)]
        source: CatalogArgs,

        /// JSON manifest instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate handler stubs
    Stubs(GenArgs),

    /// Generate stubs and routine into one file
    All(GenArgs),
}

#[derive(Args)]
struct CatalogArgs {
    /// Catalog file (default: nearest vedispatch.toml, else built-in)
    #[arg(short, long)]
    catalog: Option<PathBuf>,
}

#[derive(Args)]
struct GenArgs {
    #[command(flatten)]
    source: CatalogArgs,

    /// Output language: cpp or rust
    #[arg(short, long)]
    target: Option<Target>,

    /// Case label form: literal or symbolic
    #[arg(long)]
    key_style: Option<KeyStyle>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Catalog { output } => cmd_catalog(output.as_deref()),
        Commands::Check { source } => cmd_check(&source),
        Commands::Dispatch(args) => cmd_generate(&args, Emit::Dispatch),
        Commands::Keys { source, json } => cmd_keys(&source, json),
        Commands::Stubs(args) => cmd_generate(&args, Emit::Stubs),
        Commands::All(args) => cmd_generate(&args, Emit::All),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Resolve the catalog file named on the command line, or search for one
fn load_catalog_file(args: &CatalogArgs) -> Result<CatalogFile> {
    match &args.catalog {
        Some(path) => CatalogFile::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Ok(CatalogFile::find_and_load(&cwd)?)
        }
    }
}

fn load(args: &CatalogArgs, target: Option<Target>) -> Result<(Catalog, RenderOptions)> {
    let file = load_catalog_file(args)?;
    let options = file
        .render_options(target)
        .context("Invalid [render] section")?;
    let catalog = file.into_catalog().context("Invalid catalog")?;
    Ok((catalog, options))
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!("wrote {} bytes to {}", text.len(), path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn cmd_generate(args: &GenArgs, emit: Emit) -> Result<()> {
    let (catalog, mut options) = load(&args.source, args.target)?;
    if let Some(style) = args.key_style {
        options.key_style = style;
    }
    if options.target == Target::Rust && options.key_style == KeyStyle::Symbolic {
        warn!("symbolic keys are not valid Rust patterns; using literal keys");
        options.key_style = KeyStyle::Literal;
    }

    let artifact = Generator::new(&catalog)
        .with_options(options)
        .generate(emit)?;
    write_output(args.output.as_deref(), &artifact.source())
}

fn cmd_check(args: &CatalogArgs) -> Result<()> {
    let file = load_catalog_file(args)?;
    let catalog = file.into_catalog().context("Invalid catalog")?;
    let table = emit_dispatch(&catalog)?;

    let types = catalog.types();
    let opcodes = catalog.opcodes();
    println!("Catalog '{}' is valid", catalog.name());
    println!(
        "  types:    {} ({} dispatchable, {} excluded)",
        types.len(),
        types.dispatchable().count(),
        types.excluded().count()
    );
    for ty in types.excluded() {
        println!("            excluded: {}", ty.name);
    }
    println!(
        "  opcodes:  {} numeric, {} control",
        opcodes.numeric().count(),
        opcodes.controls().len()
    );
    for group in opcodes.groups() {
        println!(
            "            arity {}: {} opcodes",
            group.arity,
            group.opcodes.len()
        );
    }
    println!("  base:     {}", catalog.scheme().base());
    println!("  arms:     {}", table.len());
    Ok(())
}

fn cmd_keys(args: &CatalogArgs, json: bool) -> Result<()> {
    let (catalog, options) = load(args, None)?;
    let artifact = Generator::new(&catalog)
        .with_options(options)
        .generate(Emit::Dispatch)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&artifact.manifest())?);
        return Ok(());
    }

    for control in &artifact.table.controls {
        println!("{:>8}  {:<24} (control)", control.ordinal, control.name);
    }
    for arm in artifact.table.arms() {
        println!(
            "{:>8}  {:<24} {:<16} {}<{}>",
            arm.key, arm.opcode, arm.element, arm.handler, arm.token
        );
    }
    Ok(())
}

fn cmd_catalog(output: Option<&Path>) -> Result<()> {
    let text = CatalogFile::builtin().to_toml()?;
    write_output(output, &text)
}
