use anyhow::{Context, Result};
use clap::Parser;
use rcst::check::verify_roundtrip;
use rcst::cli::Args;
use rcst::output::{DumpRenderer, render_json};
use requirements_cst_core::RequirementFile;
use std::fs;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    // Errors carry their own message; the path goes to stdout first
    run(&args).inspect_err(|_| println!("{}", args.path.display()))
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let data = fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    let doc = RequirementFile::parse(&data)?;
    tracing::debug!(path = %args.path.display(), nodes = doc.len(), "parsed");

    if args.build {
        print!("{doc}");
    } else if args.json {
        println!("{}", render_json(&doc)?);
    } else if args.check {
        verify_roundtrip(&data, &doc)?;
        println!("{}: {} lines round-trip", args.path.display(), doc.len());
    } else {
        let show_colors = !args.no_color && std::io::stdout().is_terminal();
        DumpRenderer::new(show_colors).render(&doc, &args.indent)?;
    }

    Ok(())
}
