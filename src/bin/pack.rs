//! `pack` — compress a file into a phyzip archive.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "pack", version, about = "Compress a file into a phyzip archive")]
struct Args {
    /// File to compress.
    input_file: PathBuf,

    /// Archive to create.
    output_file: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match phyzip::pack::run(&args.input_file, &args.output_file) {
        Ok(()) => {
            log::info!("wrote {}", args.output_file.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("pack: {e}");
            ExitCode::FAILURE
        }
    }
}
