use std::env;
use std::path::PathBuf;

use clap::Parser;
use haul::{LddLister, Options, PatchelfPatcher};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Relocate an ELF binary to a custom prefix, bringing its dynamic
/// libraries along for the ride.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Binary to relocate (a path, or a name looked up on $PATH).
    binary: String,

    /// Installation prefix.
    #[arg(short, long, default_value = "/opt/haul")]
    prefix: String,

    /// Output directory.
    #[arg(short, long, default_value = "./out")]
    out: PathBuf,

    /// Clean output directory before building.
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    clean: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HAUL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "debug"
        } else {
            "info"
        })
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let options = Options {
        binary: cli.binary,
        out_dir: cli.out,
        prefix: cli.prefix,
        clean: cli.clean,
    };

    let report = haul::run(&LddLister, &PatchelfPatcher, &options)?;

    println!(
        "{} has {} dynamic dependencies ({} vertices, {} edges)",
        report.binary.display(),
        report.closure.len(),
        report.vertex_count,
        report.edge_count,
    );
    for dep in &report.closure {
        println!("  {}", dep.display());
    }
    println!("bundle written to {}", report.bundle.bin_dir.display());
    Ok(())
}
