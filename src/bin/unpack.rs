//! `unpack` — extract a phyzip archive in the current directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser)]
#[command(name = "unpack", version, about = "Extract a phyzip archive")]
struct Args {
    /// Archive to extract.
    archive_file: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match phyzip::unpack::run(&args.archive_file) {
        Ok(path) => {
            log::info!("wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("unpack: {e}");
            ExitCode::FAILURE
        }
    }
}
